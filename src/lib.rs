pub mod modules;

pub use modules::compress::{compress, expand};
pub use modules::level::{
    BlockEntry, CollectibleEntry, GameConfig, InteractableEntry, LevelDoc, LevelError, PlayerEntry,
    StartPose, parse_level,
};
pub use modules::program::{Block, Procedure, Program, Step};
pub use modules::report::{block_count, flatten, render};
pub use modules::search::{
    ACTION_ORDER, Action, DEFAULT_EXPANSION_BUDGET, OBJECTIVE_PENALTY, ReplayError, SearchOutcome,
    SearchReport, SearchStats, apply, is_goal, replay, solve,
};
pub use modules::state::{AgentState, Heading, SwitchState};
pub use modules::synth::{MAX_PROCEDURES, MAX_UNIT_LEN, MIN_UNIT_LEN, synthesize};
pub use modules::world::{
    BlockClass, Collectible, HAZARDS, Portal, Position, SOLID_WALLS, Switch, WALKABLE_GROUNDS,
    World,
};
