use std::fmt::Write;

use crate::modules::program::{Block, Program};
use crate::modules::search::Action;

/// Render a program as an indented textual tree: procedure definitions
/// first, then the main body under its on-start wrapper.
pub fn render(program: &Program) -> String {
    let mut out = String::new();
    for procedure in &program.procedures {
        let _ = writeln!(out, "DEFINE {}:", procedure.name);
        render_body(&procedure.body, 1, &mut out);
    }
    if !program.procedures.is_empty() {
        out.push('\n');
    }
    let _ = writeln!(out, "MAIN PROGRAM:");
    let _ = writeln!(out, "  On start:");
    render_body(&program.main, 2, &mut out);
    out
}

fn render_body(body: &[Block], indent: usize, out: &mut String) {
    let prefix = "  ".repeat(indent);
    for block in body {
        match block {
            Block::Action { action } => {
                let _ = writeln!(out, "{}{}", prefix, action.label());
            }
            Block::Repeat { times, body } => {
                let _ = writeln!(out, "{}repeat {} times:", prefix, times);
                render_body(body, indent + 1, out);
            }
            Block::Call { name } => {
                let _ = writeln!(out, "{}CALL {}", prefix, name);
            }
        }
    }
}

/// Total emitted blocks: one per action, call and repeat header, plus one
/// per procedure definition. Compared against the raw action count to
/// report compression effectiveness.
pub fn block_count(program: &Program) -> usize {
    let mut count = program.procedures.len();
    for procedure in &program.procedures {
        count += body_count(&procedure.body);
    }
    count + body_count(&program.main)
}

fn body_count(body: &[Block]) -> usize {
    body.iter()
        .map(|block| match block {
            Block::Action { .. } | Block::Call { .. } => 1,
            Block::Repeat { body, .. } => 1 + body_count(body),
        })
        .sum()
}

/// Unroll a program back into the flat action sequence it encodes:
/// repeats expand by their count, calls inline their procedure's body.
pub fn flatten(program: &Program) -> Vec<Action> {
    let mut actions = Vec::new();
    flatten_body(&program.main, program, &mut actions);
    actions
}

fn flatten_body(body: &[Block], program: &Program, actions: &mut Vec<Action>) {
    for block in body {
        match block {
            Block::Action { action } => actions.push(*action),
            Block::Repeat { times, body } => {
                for _ in 0..*times {
                    flatten_body(body, program, actions);
                }
            }
            Block::Call { name } => {
                if let Some(procedure) = program.procedure(name) {
                    flatten_body(&procedure.body, program, actions);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::program::Procedure;
    use crate::modules::synth::synthesize;

    use crate::modules::search::Action::{Collect, MoveForward, TurnLeft};

    #[test]
    fn corridor_renders_as_a_single_repeat() {
        let program = synthesize(&[MoveForward; 5]);
        assert_eq!(
            render(&program),
            "MAIN PROGRAM:\n  On start:\n    repeat 5 times:\n      moveForward\n"
        );
        assert_eq!(block_count(&program), 2);
    }

    #[test]
    fn procedures_render_before_the_main_program() {
        let program = Program {
            main: vec![
                Block::Call {
                    name: "PROCEDURE_1".into(),
                },
                Block::Action { action: Collect },
            ],
            procedures: vec![Procedure {
                name: "PROCEDURE_1".into(),
                body: vec![
                    Block::Repeat {
                        times: 3,
                        body: vec![Block::Action {
                            action: MoveForward,
                        }],
                    },
                    Block::Action { action: TurnLeft },
                ],
            }],
        };
        let expected = concat!(
            "DEFINE PROCEDURE_1:\n",
            "  repeat 3 times:\n",
            "    moveForward\n",
            "  turnLeft\n",
            "\n",
            "MAIN PROGRAM:\n",
            "  On start:\n",
            "    CALL PROCEDURE_1\n",
            "    collect\n",
        );
        assert_eq!(render(&program), expected);
    }

    #[test]
    fn block_count_charges_headers_and_definitions() {
        let program = Program {
            main: vec![
                Block::Call {
                    name: "PROCEDURE_1".into(),
                },
                Block::Action { action: Collect },
            ],
            procedures: vec![Procedure {
                name: "PROCEDURE_1".into(),
                body: vec![
                    Block::Repeat {
                        times: 3,
                        body: vec![Block::Action {
                            action: MoveForward,
                        }],
                    },
                    Block::Action { action: TurnLeft },
                ],
            }],
        };
        // definition + (repeat header + action + action) + (call + action)
        assert_eq!(block_count(&program), 6);
    }

    #[test]
    fn flatten_inlines_calls_and_unrolls_repeats() {
        let program = Program {
            main: vec![
                Block::Call {
                    name: "PROCEDURE_1".into(),
                },
                Block::Call {
                    name: "PROCEDURE_1".into(),
                },
            ],
            procedures: vec![Procedure {
                name: "PROCEDURE_1".into(),
                body: vec![
                    Block::Repeat {
                        times: 2,
                        body: vec![Block::Action {
                            action: MoveForward,
                        }],
                    },
                    Block::Action { action: TurnLeft },
                ],
            }],
        };
        assert_eq!(
            flatten(&program),
            vec![MoveForward, MoveForward, TurnLeft, MoveForward, MoveForward, TurnLeft]
        );
    }
}
