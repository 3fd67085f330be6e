use std::collections::HashSet;

use crate::modules::compress::compress;
use crate::modules::program::{Procedure, Program, Step};
use crate::modules::search::Action;

/// A block environment offers a limited number of user-defined
/// procedures; three matches the target toolbox.
pub const MAX_PROCEDURES: usize = 3;

/// Candidate subsequence lengths considered for extraction.
pub const MIN_UNIT_LEN: usize = 3;
pub const MAX_UNIT_LEN: usize = 10;

/// Net block savings of extracting `unit` with `occurrences` call sites:
/// each occurrence past the first stops paying the unit's length, while
/// the definition costs one body copy and every call site costs one
/// block.
fn savings(unit_len: usize, occurrences: usize) -> i64 {
    (occurrences as i64 - 1) * unit_len as i64 - (unit_len as i64 + occurrences as i64)
}

/// Rewrite a flat action sequence into a structured program: extract up
/// to three globally frequent subsequences as named procedures, then
/// fold repeats in every body and in the residual main program.
pub fn synthesize(actions: &[Action]) -> Program {
    let mut steps = Step::from_actions(actions);
    let mut procedures = Vec::new();

    for n in 1..=MAX_PROCEDURES {
        let Some(unit) = best_candidate(&steps) else {
            break;
        };
        let name = format!("PROCEDURE_{}", n);
        procedures.push(Procedure {
            name: name.clone(),
            body: compress(&unit),
        });
        steps = substitute(&steps, &unit, &name);
    }

    Program {
        main: compress(&steps),
        procedures,
    }
}

/// The contiguous subsequence (length 3..=10) with the best positive
/// savings score, or `None` when extraction cannot pay for itself.
/// Candidates are scanned shortest-first and earliest-first; a later
/// candidate replaces the best only on a strictly greater score, so the
/// tie-break is fixed.
fn best_candidate(steps: &[Step]) -> Option<Vec<Step>> {
    let mut seen: HashSet<&[Step]> = HashSet::new();
    let mut best: Option<(i64, Vec<Step>)> = None;

    for len in MIN_UNIT_LEN..=MAX_UNIT_LEN.min(steps.len() / 2) {
        for start in 0..=steps.len() - len {
            let unit = &steps[start..start + len];
            if !seen.insert(unit) {
                continue;
            }
            let occurrences = count_occurrences(steps, unit);
            if occurrences < 2 {
                continue;
            }
            let score = savings(len, occurrences);
            if score > 0 && best.as_ref().is_none_or(|(top, _)| score > *top) {
                best = Some((score, unit.to_vec()));
            }
        }
    }

    best.map(|(_, unit)| unit)
}

/// Count left-to-right non-overlapping occurrences of `unit`.
fn count_occurrences(steps: &[Step], unit: &[Step]) -> usize {
    let mut count = 0;
    let mut i = 0;
    while i + unit.len() <= steps.len() {
        if steps[i..i + unit.len()] == *unit {
            count += 1;
            i += unit.len();
        } else {
            i += 1;
        }
    }
    count
}

/// Replace every non-overlapping occurrence of `unit` with a call step,
/// scanning left to right and never rematching inside a substitution.
fn substitute(steps: &[Step], unit: &[Step], name: &str) -> Vec<Step> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < steps.len() {
        if i + unit.len() <= steps.len() && steps[i..i + unit.len()] == *unit {
            out.push(Step::Call(name.to_string()));
            i += unit.len();
        } else {
            out.push(steps[i].clone());
            i += 1;
        }
    }
    out
}
