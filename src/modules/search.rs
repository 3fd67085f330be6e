use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::modules::state::AgentState;
use crate::modules::world::World;

/// Heuristic penalty for each outstanding objective (uncollected
/// collectible or switch still in its initial state). Deliberately large
/// enough to pull the search toward objectives before the finish, and
/// deliberately inadmissible in multi-objective levels: the engine is
/// greedy best-first there, not textbook A*.
pub const OBJECTIVE_PENALTY: u32 = 10;

/// Default cap on node expansions for callers that do not pick their own.
pub const DEFAULT_EXPANSION_BUDGET: u64 = 1_000_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    TurnLeft,
    TurnRight,
    MoveForward,
    Jump,
    Collect,
    ToggleSwitch,
}

impl Action {
    pub const fn label(self) -> &'static str {
        match self {
            Action::TurnLeft => "turnLeft",
            Action::TurnRight => "turnRight",
            Action::MoveForward => "moveForward",
            Action::Jump => "jump",
            Action::Collect => "collect",
            Action::ToggleSwitch => "toggleSwitch",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Fixed successor enumeration order. Any order is correct; keeping one
/// makes tie-breaks among equal-cost paths reproducible.
pub const ACTION_ORDER: [Action; 6] = [
    Action::MoveForward,
    Action::Jump,
    Action::TurnLeft,
    Action::TurnRight,
    Action::Collect,
    Action::ToggleSwitch,
];

/// Apply one action to a state, returning the successor state or `None`
/// when the action's precondition does not hold. Shared by the engine,
/// `replay` and the tests so there is exactly one rule set.
pub fn apply(world: &World, state: &AgentState, action: Action) -> Option<AgentState> {
    match action {
        Action::TurnLeft => Some(state.facing(state.heading.left())),
        Action::TurnRight => Some(state.facing(state.heading.right())),
        Action::MoveForward => step_to(world, state, 0),
        Action::Jump => step_to(world, state, 1),
        Action::Collect => {
            let item = world.collectible_at(state.position)?;
            if state.collected.contains(&item.id) {
                return None;
            }
            Some(state.with_collected(&item.id))
        }
        Action::ToggleSwitch => {
            let switch = world.switch_at(state.position)?;
            Some(state.with_toggled(&switch.id))
        }
    }
}

fn step_to(world: &World, state: &AgentState, rise: i32) -> Option<AgentState> {
    let (dx, dz) = state.heading.step();
    let mut dest = state.position.offset(dx, rise, dz);
    // A portal entry rewrites the destination before any validity check.
    if let Some(portal) = world.portal_at(dest) {
        dest = portal.target;
    }
    if world.is_solid(dest) {
        return None;
    }
    if !world.is_safe_footing(dest.offset(0, -1, 0)) {
        return None;
    }
    Some(state.at(dest))
}

/// Solved means: at the finish, every collectible collected, and every
/// switch toggled away from its recorded initial state. The all-toggled
/// comparator is a design decision of this engine, not a universal rule
/// for switch puzzles.
pub fn is_goal(world: &World, state: &AgentState) -> bool {
    state.position == world.finish()
        && state.collected.len() == world.collectible_count()
        && world
            .switches()
            .all(|switch| state.switches.get(&switch.id) != Some(&switch.initial))
}

fn heuristic(world: &World, state: &AgentState) -> u32 {
    let uncollected = world.collectible_count() - state.collected.len();
    let untoggled = world
        .switches()
        .filter(|switch| state.switches.get(&switch.id) == Some(&switch.initial))
        .count();
    let outstanding = (uncollected + untoggled) as u32;
    outstanding * OBJECTIVE_PENALTY + state.position.manhattan(world.finish()) as u32
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchOutcome {
    /// Optimal-by-search-order action sequence from start to goal.
    Solved(Vec<Action>),
    /// The reachable state space was exhausted without a goal. A normal
    /// result, not an error.
    Unsolvable,
    /// The expansion budget ran out first. Does not prove unsolvability.
    BudgetExhausted,
}

impl SearchOutcome {
    pub fn is_solved(&self) -> bool {
        matches!(self, SearchOutcome::Solved(_))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStats {
    /// Nodes popped and expanded (goal tests included).
    pub expanded: u64,
    /// Open-set entries dropped because their canonical key was already
    /// expanded via a cheaper-or-equal path.
    pub duplicates_skipped: u64,
    /// Successor states pushed onto the open set.
    pub enqueued: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchReport {
    pub outcome: SearchOutcome,
    pub stats: SearchStats,
}

struct Node {
    state: AgentState,
    parent: Option<usize>,
    action: Option<Action>,
    g: u32,
}

/// Open-set entry: min-ordered by estimated total cost, then by insertion
/// sequence so equal estimates pop in FIFO order.
#[derive(PartialEq, Eq)]
struct OpenEntry {
    f: u32,
    seq: u64,
    index: usize,
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .cmp(&self.f)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Best-first search from the level's start state. `budget` bounds node
/// expansions; pass `None` to search until the open set empties.
pub fn solve(world: &World, budget: Option<u64>) -> SearchReport {
    let start = AgentState::initial(world);
    let start_h = heuristic(world, &start);
    let mut nodes = vec![Node {
        state: start,
        parent: None,
        action: None,
        g: 0,
    }];
    let mut open = BinaryHeap::new();
    let mut visited: HashSet<String> = HashSet::new();
    let mut stats = SearchStats::default();
    let mut seq = 0u64;
    open.push(OpenEntry {
        f: start_h,
        seq,
        index: 0,
    });

    while let Some(entry) = open.pop() {
        let key = nodes[entry.index].state.canonical_key();
        if visited.contains(&key) {
            stats.duplicates_skipped += 1;
            continue;
        }
        if let Some(max) = budget {
            if stats.expanded >= max {
                return SearchReport {
                    outcome: SearchOutcome::BudgetExhausted,
                    stats,
                };
            }
        }
        visited.insert(key);
        stats.expanded += 1;

        if is_goal(world, &nodes[entry.index].state) {
            return SearchReport {
                outcome: SearchOutcome::Solved(recover_path(&nodes, entry.index)),
                stats,
            };
        }

        for action in ACTION_ORDER {
            let Some(next) = apply(world, &nodes[entry.index].state, action) else {
                continue;
            };
            if visited.contains(&next.canonical_key()) {
                continue;
            }
            let g = nodes[entry.index].g + 1;
            let f = g + heuristic(world, &next);
            nodes.push(Node {
                state: next,
                parent: Some(entry.index),
                action: Some(action),
                g,
            });
            seq += 1;
            stats.enqueued += 1;
            open.push(OpenEntry {
                f,
                seq,
                index: nodes.len() - 1,
            });
        }
    }

    SearchReport {
        outcome: SearchOutcome::Unsolvable,
        stats,
    }
}

fn recover_path(nodes: &[Node], goal: usize) -> Vec<Action> {
    let mut path = Vec::new();
    let mut cursor = goal;
    while let (Some(parent), Some(action)) = (nodes[cursor].parent, nodes[cursor].action) {
        path.push(action);
        cursor = parent;
    }
    path.reverse();
    path
}

/// The step at which a replayed sequence broke a precondition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayError {
    pub index: usize,
    pub action: Action,
}

impl fmt::Display for ReplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "action {} at step {} violates its precondition",
            self.action, self.index
        )
    }
}

impl std::error::Error for ReplayError {}

/// Re-apply a sequence from the start state under the world rules,
/// failing on the first invalid action. Proves a plan rather than
/// trusting the engine that produced it.
pub fn replay(world: &World, actions: &[Action]) -> Result<AgentState, ReplayError> {
    let mut state = AgentState::initial(world);
    for (index, &action) in actions.iter().enumerate() {
        state = apply(world, &state, action).ok_or(ReplayError { index, action })?;
    }
    Ok(state)
}
