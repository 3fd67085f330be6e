use serde::{Deserialize, Serialize};

use crate::modules::search::Action;

/// Compressor alphabet: a primitive action or a call to an extracted
/// procedure. Calls are atomic; the compressor never looks inside one.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Step {
    Action(Action),
    Call(String),
}

impl Step {
    pub fn from_actions(actions: &[Action]) -> Vec<Step> {
        actions.iter().map(|&action| Step::Action(action)).collect()
    }
}

/// One node of a synthesized program tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Block {
    Action { action: Action },
    Repeat { times: u32, body: Vec<Block> },
    Call { name: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Procedure {
    pub name: String,
    pub body: Vec<Block>,
}

/// A synthesized structured program: main body plus extracted procedures
/// in definition order. Built once by the synthesizer, immutable after.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub main: Vec<Block>,
    pub procedures: Vec<Procedure>,
}

impl Program {
    pub fn procedure(&self, name: &str) -> Option<&Procedure> {
        self.procedures.iter().find(|p| p.name == name)
    }
}
