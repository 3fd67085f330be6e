use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::modules::level::{LevelDoc, LevelError};
use crate::modules::state::{Heading, SwitchState};

/// Model identifiers that are safe to stand on.
pub const WALKABLE_GROUNDS: &[&str] = &[
    "ground.checker",
    "ground.earth",
    "ground.earthChecker",
    "ground.normal",
    "ground.snow",
    "ground.mud",
    "water",
    "ice",
];

/// Model identifiers that block movement into their cell.
pub const SOLID_WALLS: &[&str] = &[
    "stone01",
    "stone02",
    "stone03",
    "stone04",
    "stone05",
    "stone06",
    "stone07",
    "wall.brick01",
    "wall.brick02",
    "wall.brick03",
    "wall.brick04",
    "wall.brick05",
    "wall.brick06",
    "wall.stone",
];

/// Model identifiers that are fatal footing.
pub const HAZARDS: &[&str] = &["lava"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub const fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            z: self.z + dz,
        }
    }

    pub fn manhattan(self, other: Position) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs() + (self.z - other.z).abs()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockClass {
    Walkable,
    Solid,
    Hazard,
}

impl BlockClass {
    /// Classify a placed model identifier. Identifiers outside the three
    /// semantic classes are decorative and behave as empty space.
    pub fn classify(model_key: &str) -> Option<BlockClass> {
        if WALKABLE_GROUNDS.contains(&model_key) {
            Some(BlockClass::Walkable)
        } else if SOLID_WALLS.contains(&model_key) {
            Some(BlockClass::Solid)
        } else if HAZARDS.contains(&model_key) {
            Some(BlockClass::Hazard)
        } else {
            None
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Collectible {
    pub id: String,
    pub position: Position,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Switch {
    pub id: String,
    pub position: Position,
    pub initial: SwitchState,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Portal {
    pub id: String,
    pub position: Position,
    pub target: Position,
}

/// Spatial index over a level document. Built once, read-only afterwards;
/// every lookup is O(1) by position.
#[derive(Clone, Debug)]
pub struct World {
    start: Position,
    start_heading: Heading,
    finish: Position,
    blocks: HashMap<Position, BlockClass>,
    collectibles: HashMap<Position, Collectible>,
    switches: HashMap<Position, Switch>,
    portals: HashMap<Position, Portal>,
}

impl World {
    pub fn from_level(doc: &LevelDoc) -> Result<World, LevelError> {
        let config = &doc.game_config;
        let start_entry = config.players.first().ok_or(LevelError::NoPlayer)?;
        let start_heading = Heading::from_index(start_entry.start.direction).ok_or(
            LevelError::InvalidDirection {
                value: start_entry.start.direction,
            },
        )?;
        let start = Position::new(start_entry.start.x, start_entry.start.y, start_entry.start.z);

        let mut blocks = HashMap::new();
        for block in &config.blocks {
            if let Some(class) = BlockClass::classify(&block.model_key) {
                blocks.insert(block.position, class);
            }
        }

        let mut collectible_ids = HashSet::new();
        let mut collectibles = HashMap::new();
        for entry in &config.collectibles {
            if !collectible_ids.insert(entry.id.clone()) {
                return Err(LevelError::DuplicateCollectibleId {
                    id: entry.id.clone(),
                });
            }
            collectibles.insert(
                entry.position,
                Collectible {
                    id: entry.id.clone(),
                    position: entry.position,
                },
            );
        }

        let mut interactable_ids = HashSet::new();
        for entry in &config.interactables {
            if !interactable_ids.insert(entry.id.clone()) {
                return Err(LevelError::DuplicateInteractableId {
                    id: entry.id.clone(),
                });
            }
        }

        let mut switches = HashMap::new();
        let mut portals = HashMap::new();
        for entry in &config.interactables {
            match entry.kind.as_str() {
                "switch" => {
                    let initial =
                        entry
                            .initial_state
                            .ok_or_else(|| LevelError::SwitchMissingInitialState {
                                id: entry.id.clone(),
                            })?;
                    switches.insert(
                        entry.position,
                        Switch {
                            id: entry.id.clone(),
                            position: entry.position,
                            initial,
                        },
                    );
                }
                "portal" => {
                    let target_id =
                        entry
                            .target_id
                            .as_ref()
                            .ok_or_else(|| LevelError::PortalMissingTarget {
                                id: entry.id.clone(),
                            })?;
                    if *target_id == entry.id {
                        return Err(LevelError::PortalTargetsSelf {
                            id: entry.id.clone(),
                        });
                    }
                    let target = config
                        .interactables
                        .iter()
                        .find(|other| other.id == *target_id)
                        .map(|other| other.position)
                        .ok_or_else(|| LevelError::UnresolvedPortalTarget {
                            id: entry.id.clone(),
                            target: target_id.clone(),
                        })?;
                    portals.insert(
                        entry.position,
                        Portal {
                            id: entry.id.clone(),
                            position: entry.position,
                            target,
                        },
                    );
                }
                other => {
                    return Err(LevelError::UnknownInteractableType {
                        id: entry.id.clone(),
                        kind: other.to_string(),
                    });
                }
            }
        }

        Ok(World {
            start,
            start_heading,
            finish: config.finish,
            blocks,
            collectibles,
            switches,
            portals,
        })
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn start_heading(&self) -> Heading {
        self.start_heading
    }

    pub fn finish(&self) -> Position {
        self.finish
    }

    pub fn block_class(&self, position: Position) -> Option<BlockClass> {
        self.blocks.get(&position).copied()
    }

    pub fn is_solid(&self, position: Position) -> bool {
        matches!(self.blocks.get(&position), Some(BlockClass::Solid))
    }

    /// Whether a cell can serve as footing: walkable ground, never hazard.
    pub fn is_safe_footing(&self, position: Position) -> bool {
        matches!(self.blocks.get(&position), Some(BlockClass::Walkable))
    }

    pub fn collectible_at(&self, position: Position) -> Option<&Collectible> {
        self.collectibles.get(&position)
    }

    pub fn switch_at(&self, position: Position) -> Option<&Switch> {
        self.switches.get(&position)
    }

    pub fn portal_at(&self, position: Position) -> Option<&Portal> {
        self.portals.get(&position)
    }

    pub fn collectible_count(&self) -> usize {
        self.collectibles.len()
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn switch_count(&self) -> usize {
        self.switches.len()
    }

    pub fn portal_count(&self) -> usize {
        self.portals.len()
    }

    pub fn switches(&self) -> impl Iterator<Item = &Switch> {
        self.switches.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::level::test_support::{
        collectible, interactable, level_doc, placed_block, portal_entry, switch_entry,
    };

    #[test]
    fn classifies_model_keys() {
        assert_eq!(
            BlockClass::classify("ground.normal"),
            Some(BlockClass::Walkable)
        );
        assert_eq!(BlockClass::classify("ice"), Some(BlockClass::Walkable));
        assert_eq!(
            BlockClass::classify("wall.brick03"),
            Some(BlockClass::Solid)
        );
        assert_eq!(BlockClass::classify("stone07"), Some(BlockClass::Solid));
        assert_eq!(BlockClass::classify("lava"), Some(BlockClass::Hazard));
        assert_eq!(BlockClass::classify("flower.red"), None);
    }

    #[test]
    fn decorative_blocks_are_not_indexed() {
        let doc = level_doc(
            (0, 0, 0, 1),
            (1, 0, 0),
            vec![
                placed_block("ground.normal", 0, -1, 0),
                placed_block("flower.red", 1, 0, 0),
            ],
            vec![],
            vec![],
        );
        let world = World::from_level(&doc).unwrap();
        assert_eq!(world.block_count(), 1);
        assert_eq!(world.block_class(Position::new(1, 0, 0)), None);
        assert!(!world.is_solid(Position::new(1, 0, 0)));
        assert!(!world.is_safe_footing(Position::new(1, 0, 0)));
    }

    #[test]
    fn resolves_portal_targets_by_id() {
        let doc = level_doc(
            (0, 0, 0, 1),
            (5, 0, 0),
            vec![placed_block("ground.normal", 0, -1, 0)],
            vec![],
            vec![
                portal_entry("p1", 1, 0, 0, "p2"),
                portal_entry("p2", 5, 0, 0, "p1"),
            ],
        );
        let world = World::from_level(&doc).unwrap();
        let portal = world.portal_at(Position::new(1, 0, 0)).unwrap();
        assert_eq!(portal.target, Position::new(5, 0, 0));
        assert_eq!(world.portal_count(), 2);
    }

    #[test]
    fn rejects_unresolved_portal_target() {
        let doc = level_doc(
            (0, 0, 0, 0),
            (1, 0, 0),
            vec![],
            vec![],
            vec![portal_entry("p1", 1, 0, 0, "nowhere")],
        );
        let err = World::from_level(&doc).unwrap_err();
        assert_eq!(
            err,
            LevelError::UnresolvedPortalTarget {
                id: "p1".into(),
                target: "nowhere".into(),
            }
        );
    }

    #[test]
    fn rejects_portal_targeting_itself() {
        let doc = level_doc(
            (0, 0, 0, 0),
            (1, 0, 0),
            vec![],
            vec![],
            vec![portal_entry("p1", 1, 0, 0, "p1")],
        );
        let err = World::from_level(&doc).unwrap_err();
        assert_eq!(err, LevelError::PortalTargetsSelf { id: "p1".into() });
    }

    #[test]
    fn rejects_duplicate_collectible_ids() {
        let doc = level_doc(
            (0, 0, 0, 0),
            (1, 0, 0),
            vec![],
            vec![collectible("gem", 0, 0, 0), collectible("gem", 1, 0, 0)],
            vec![],
        );
        let err = World::from_level(&doc).unwrap_err();
        assert_eq!(err, LevelError::DuplicateCollectibleId { id: "gem".into() });
    }

    #[test]
    fn rejects_duplicate_interactable_ids() {
        let doc = level_doc(
            (0, 0, 0, 0),
            (1, 0, 0),
            vec![],
            vec![],
            vec![
                switch_entry("sw", 0, 0, 0, "off"),
                switch_entry("sw", 1, 0, 0, "on"),
            ],
        );
        let err = World::from_level(&doc).unwrap_err();
        assert_eq!(err, LevelError::DuplicateInteractableId { id: "sw".into() });
    }

    #[test]
    fn rejects_switch_without_initial_state() {
        let doc = level_doc(
            (0, 0, 0, 0),
            (1, 0, 0),
            vec![],
            vec![],
            vec![interactable("sw", 0, 0, 0, "switch", None, None)],
        );
        let err = World::from_level(&doc).unwrap_err();
        assert_eq!(err, LevelError::SwitchMissingInitialState { id: "sw".into() });
    }

    #[test]
    fn rejects_unknown_interactable_type() {
        let doc = level_doc(
            (0, 0, 0, 0),
            (1, 0, 0),
            vec![],
            vec![],
            vec![interactable("x", 0, 0, 0, "lever", None, None)],
        );
        let err = World::from_level(&doc).unwrap_err();
        assert_eq!(
            err,
            LevelError::UnknownInteractableType {
                id: "x".into(),
                kind: "lever".into(),
            }
        );
    }

    #[test]
    fn rejects_invalid_start_direction() {
        let doc = level_doc((0, 0, 0, 7), (1, 0, 0), vec![], vec![], vec![]);
        let err = World::from_level(&doc).unwrap_err();
        assert_eq!(err, LevelError::InvalidDirection { value: 7 });
    }

    #[test]
    fn rejects_level_without_players() {
        let mut doc = level_doc((0, 0, 0, 0), (1, 0, 0), vec![], vec![], vec![]);
        doc.game_config.players.clear();
        let err = World::from_level(&doc).unwrap_err();
        assert_eq!(err, LevelError::NoPlayer);
    }
}
