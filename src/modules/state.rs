use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::modules::world::{Position, World};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwitchState {
    On,
    Off,
}

impl SwitchState {
    pub const fn toggled(self) -> Self {
        match self {
            SwitchState::On => SwitchState::Off,
            SwitchState::Off => SwitchState::On,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            SwitchState::On => "on",
            SwitchState::Off => "off",
        }
    }
}

impl fmt::Display for SwitchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Discrete agent orientation. Index order matches the level document's
/// numeric direction field: 0 north, 1 east, 2 south, 3 west.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Heading {
    North,
    East,
    South,
    West,
}

impl Heading {
    pub const fn from_index(index: u8) -> Option<Heading> {
        match index {
            0 => Some(Heading::North),
            1 => Some(Heading::East),
            2 => Some(Heading::South),
            3 => Some(Heading::West),
            _ => None,
        }
    }

    pub const fn index(self) -> u8 {
        match self {
            Heading::North => 0,
            Heading::East => 1,
            Heading::South => 2,
            Heading::West => 3,
        }
    }

    /// Unit step on the horizontal plane as (dx, dz). North is -z.
    pub const fn step(self) -> (i32, i32) {
        match self {
            Heading::North => (0, -1),
            Heading::East => (1, 0),
            Heading::South => (0, 1),
            Heading::West => (-1, 0),
        }
    }

    pub const fn left(self) -> Heading {
        match self {
            Heading::North => Heading::West,
            Heading::East => Heading::North,
            Heading::South => Heading::East,
            Heading::West => Heading::South,
        }
    }

    pub const fn right(self) -> Heading {
        match self {
            Heading::North => Heading::East,
            Heading::East => Heading::South,
            Heading::South => Heading::West,
            Heading::West => Heading::North,
        }
    }
}

/// Snapshot of the agent between actions. Derived states are produced by
/// the clone-with-mutation constructors; an existing snapshot is never
/// mutated once it has been handed to the search engine.
///
/// The collected set only grows along a path, and the switch map's key
/// set is fixed when the start state is built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AgentState {
    pub position: Position,
    pub heading: Heading,
    pub collected: BTreeSet<String>,
    pub switches: BTreeMap<String, SwitchState>,
}

impl AgentState {
    pub fn initial(world: &World) -> AgentState {
        AgentState {
            position: world.start(),
            heading: world.start_heading(),
            collected: BTreeSet::new(),
            switches: world
                .switches()
                .map(|switch| (switch.id.clone(), switch.initial))
                .collect(),
        }
    }

    pub fn at(&self, position: Position) -> AgentState {
        let mut next = self.clone();
        next.position = position;
        next
    }

    pub fn facing(&self, heading: Heading) -> AgentState {
        let mut next = self.clone();
        next.heading = heading;
        next
    }

    pub fn with_collected(&self, id: &str) -> AgentState {
        let mut next = self.clone();
        next.collected.insert(id.to_string());
        next
    }

    pub fn with_toggled(&self, id: &str) -> AgentState {
        let mut next = self.clone();
        if let Some(state) = next.switches.get_mut(id) {
            *state = state.toggled();
        }
        next
    }

    /// Canonical rendering of the logical state: position, heading, sorted
    /// collected ids and sorted switch states. Two states reached by
    /// different action sequences compare equal iff their keys match.
    pub fn canonical_key(&self) -> String {
        let mut key = format!(
            "{},{},{},{}",
            self.position.x,
            self.position.y,
            self.position.z,
            self.heading.index()
        );
        key.push_str("|i:");
        for (n, id) in self.collected.iter().enumerate() {
            if n > 0 {
                key.push(',');
            }
            key.push_str(id);
        }
        key.push_str("|s:");
        for (n, (id, state)) in self.switches.iter().enumerate() {
            if n > 0 {
                key.push(',');
            }
            key.push_str(id);
            key.push(':');
            key.push_str(state.label());
        }
        key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::level::test_support::{level_doc, switch_entry};

    #[test]
    fn heading_steps_match_compass() {
        assert_eq!(Heading::North.step(), (0, -1));
        assert_eq!(Heading::East.step(), (1, 0));
        assert_eq!(Heading::South.step(), (0, 1));
        assert_eq!(Heading::West.step(), (-1, 0));
    }

    #[test]
    fn four_left_turns_return_home() {
        let mut heading = Heading::North;
        for _ in 0..4 {
            heading = heading.left();
        }
        assert_eq!(heading, Heading::North);
        assert_eq!(Heading::North.left(), Heading::West);
        assert_eq!(Heading::North.right(), Heading::East);
        assert_eq!(Heading::West.right(), Heading::North);
    }

    #[test]
    fn from_index_rejects_out_of_range() {
        assert_eq!(Heading::from_index(2), Some(Heading::South));
        assert_eq!(Heading::from_index(4), None);
    }

    fn switch_world() -> crate::modules::world::World {
        let doc = level_doc(
            (0, 0, 0, 1),
            (3, 0, 0),
            vec![],
            vec![],
            vec![
                switch_entry("sw-b", 1, 0, 0, "off"),
                switch_entry("sw-a", 2, 0, 0, "on"),
            ],
        );
        World::from_level(&doc).unwrap()
    }

    #[test]
    fn initial_state_copies_switch_states_from_world() {
        let world = switch_world();
        let state = AgentState::initial(&world);
        assert_eq!(state.switches.len(), 2);
        assert_eq!(state.switches["sw-a"], SwitchState::On);
        assert_eq!(state.switches["sw-b"], SwitchState::Off);
        assert!(state.collected.is_empty());
    }

    #[test]
    fn derived_states_leave_the_original_untouched() {
        let world = switch_world();
        let state = AgentState::initial(&world);
        let moved = state.at(Position::new(1, 0, 0));
        let toggled = moved.with_toggled("sw-b");
        let collected = toggled.with_collected("gem-1");

        assert_eq!(state.position, Position::new(0, 0, 0));
        assert_eq!(state.switches["sw-b"], SwitchState::Off);
        assert!(state.collected.is_empty());

        assert_eq!(toggled.switches["sw-b"], SwitchState::On);
        assert!(collected.collected.contains("gem-1"));
        assert_eq!(collected.switches.len(), state.switches.len());
    }

    #[test]
    fn canonical_key_is_sorted_and_order_independent() {
        let world = switch_world();
        let state = AgentState::initial(&world);

        let via_a = state.with_collected("gem-2").with_collected("gem-1");
        let via_b = state.with_collected("gem-1").with_collected("gem-2");
        assert_eq!(via_a.canonical_key(), via_b.canonical_key());

        assert_eq!(
            state.canonical_key(),
            "0,0,0,1|i:|s:sw-a:on,sw-b:off"
        );
    }

    #[test]
    fn canonical_key_changes_with_every_dimension() {
        let world = switch_world();
        let state = AgentState::initial(&world);
        let keys = [
            state.canonical_key(),
            state.at(Position::new(1, 0, 0)).canonical_key(),
            state.facing(Heading::South).canonical_key(),
            state.with_collected("gem-1").canonical_key(),
            state.with_toggled("sw-a").canonical_key(),
        ];
        for (i, a) in keys.iter().enumerate() {
            for b in keys.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }
}
