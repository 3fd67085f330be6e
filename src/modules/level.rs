use std::fmt;

use serde::{Deserialize, Serialize};

use crate::modules::state::SwitchState;
use crate::modules::world::Position;

/// Level document as produced by the external authoring tool. The core
/// only relies on the fields modelled here; anything else in the file is
/// ignored by serde.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelDoc {
    #[serde(rename = "gameConfig")]
    pub game_config: GameConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    pub players: Vec<PlayerEntry>,
    pub finish: Position,
    #[serde(default)]
    pub blocks: Vec<BlockEntry>,
    #[serde(default)]
    pub collectibles: Vec<CollectibleEntry>,
    #[serde(default, rename = "interactibles")]
    pub interactables: Vec<InteractableEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerEntry {
    pub start: StartPose,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StartPose {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub direction: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockEntry {
    pub position: Position,
    #[serde(rename = "modelKey")]
    pub model_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectibleEntry {
    pub position: Position,
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractableEntry {
    pub position: Position,
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, rename = "initialState")]
    pub initial_state: Option<SwitchState>,
    #[serde(default, rename = "targetId")]
    pub target_id: Option<String>,
}

pub fn parse_level(json: &str) -> Result<LevelDoc, serde_json::Error> {
    serde_json::from_str(json)
}

/// Structural problems in a level document. Ambiguous data is rejected,
/// never coerced; each variant names the offending entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LevelError {
    NoPlayer,
    InvalidDirection { value: u8 },
    DuplicateCollectibleId { id: String },
    DuplicateInteractableId { id: String },
    SwitchMissingInitialState { id: String },
    PortalMissingTarget { id: String },
    UnresolvedPortalTarget { id: String, target: String },
    PortalTargetsSelf { id: String },
    UnknownInteractableType { id: String, kind: String },
}

impl fmt::Display for LevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelError::NoPlayer => write!(f, "level defines no player start"),
            LevelError::InvalidDirection { value } => {
                write!(f, "start direction {} is not in 0..=3", value)
            }
            LevelError::DuplicateCollectibleId { id } => {
                write!(f, "collectible id {} appears more than once", id)
            }
            LevelError::DuplicateInteractableId { id } => {
                write!(f, "interactable id {} appears more than once", id)
            }
            LevelError::SwitchMissingInitialState { id } => {
                write!(f, "switch {} has no initialState", id)
            }
            LevelError::PortalMissingTarget { id } => {
                write!(f, "portal {} has no targetId", id)
            }
            LevelError::UnresolvedPortalTarget { id, target } => {
                write!(f, "portal {} targets unknown interactable {}", id, target)
            }
            LevelError::PortalTargetsSelf { id } => {
                write!(f, "portal {} targets itself", id)
            }
            LevelError::UnknownInteractableType { id, kind } => {
                write!(f, "interactable {} has unknown type {}", id, kind)
            }
        }
    }
}

impl std::error::Error for LevelError {}
