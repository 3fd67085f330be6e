use crate::modules::program::{Block, Step};

/// Fold immediate repetitions in a flat step list into repeat blocks.
///
/// Single left-to-right pass. At each position every candidate unit
/// length up to half the remaining steps is tried; a candidate qualifies
/// when it repeats at least twice and the unrolled cost beats one repeat
/// header plus one body copy (`repeats * len > 1 + len`). Among
/// qualifying units the greatest net savings wins, ties keeping the
/// shortest unit, so a run of five identical steps folds as one
/// five-times repeat rather than a pair-of-pairs plus remainder. The
/// chosen unit is compressed recursively; recursion depth is bounded by
/// log2 of the input length since each level halves the window.
pub fn compress(steps: &[Step]) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut i = 0;
    while i < steps.len() {
        let remaining = steps.len() - i;
        let mut best_len = 0;
        let mut best_repeats = 0;
        let mut best_savings = 0i64;
        for len in 1..=remaining / 2 {
            let mut repeats = 1;
            while i + (repeats + 1) * len <= steps.len()
                && steps[i..i + len] == steps[i + repeats * len..i + (repeats + 1) * len]
            {
                repeats += 1;
            }
            if repeats < 2 {
                continue;
            }
            let saved = (repeats * len) as i64 - (1 + len) as i64;
            if saved > best_savings {
                best_savings = saved;
                best_len = len;
                best_repeats = repeats;
            }
        }

        if best_repeats >= 2 {
            blocks.push(Block::Repeat {
                times: best_repeats as u32,
                body: compress(&steps[i..i + best_len]),
            });
            i += best_repeats * best_len;
        } else {
            blocks.push(match &steps[i] {
                Step::Action(action) => Block::Action { action: *action },
                Step::Call(name) => Block::Call { name: name.clone() },
            });
            i += 1;
        }
    }
    blocks
}

/// Inverse of `compress` for a single body: unroll every repeat by its
/// count, keeping calls as atomic steps.
pub fn expand(body: &[Block]) -> Vec<Step> {
    let mut steps = Vec::new();
    expand_into(body, &mut steps);
    steps
}

fn expand_into(body: &[Block], steps: &mut Vec<Step>) {
    for block in body {
        match block {
            Block::Action { action } => steps.push(Step::Action(*action)),
            Block::Call { name } => steps.push(Step::Call(name.clone())),
            Block::Repeat { times, body } => {
                for _ in 0..*times {
                    expand_into(body, steps);
                }
            }
        }
    }
}
