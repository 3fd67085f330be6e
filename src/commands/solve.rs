use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;
use voxplan::{
    LevelDoc, Program, SearchOutcome, SearchStats, World, block_count, is_goal, parse_level,
    render, replay, solve, synthesize,
};

const LOG_DIR: &str = ".voxplan";

pub struct SolveOptions {
    pub level: PathBuf,
    pub budget: u64,
    pub json: bool,
    pub check: bool,
    pub log: bool,
}

#[derive(Serialize)]
struct SolveRecord<'a> {
    level: String,
    status: &'static str,
    raw_actions: usize,
    blocks: usize,
    stats: SearchStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    program: Option<&'a Program>,
}

pub fn run_solve(options: SolveOptions) -> Result<(), String> {
    let doc = load_level(&options.level)?;
    let world = World::from_level(&doc).map_err(|e| e.to_string())?;
    let report = solve(&world, Some(options.budget));

    let (status, program, raw_actions) = match &report.outcome {
        SearchOutcome::Solved(actions) => {
            if options.check {
                let end = replay(&world, actions)
                    .map_err(|e| format!("plan failed verification: {}", e))?;
                if !is_goal(&world, &end) {
                    return Err(
                        "plan failed verification: replay did not end in a goal state".into()
                    );
                }
            }
            ("solved", Some(synthesize(actions)), actions.len())
        }
        SearchOutcome::Unsolvable => ("unsolvable", None, 0),
        SearchOutcome::BudgetExhausted => ("budget-exhausted", None, 0),
    };
    let blocks = program.as_ref().map(block_count).unwrap_or(0);

    if options.json {
        let record = SolveRecord {
            level: options.level.display().to_string(),
            status,
            raw_actions,
            blocks,
            stats: report.stats,
            program: program.as_ref(),
        };
        let json = serde_json::to_string_pretty(&record).map_err(|e| e.to_string())?;
        println!("{}", json);
    } else {
        match &program {
            Some(program) => {
                print!("{}", render(program));
                println!();
                println!(
                    "Solved in {} actions, emitted as {} blocks ({} expanded, {} duplicates pruned)",
                    raw_actions, blocks, report.stats.expanded, report.stats.duplicates_skipped,
                );
            }
            None if report.outcome == SearchOutcome::Unsolvable => {
                println!(
                    "No solution exists for this level ({} states expanded).",
                    report.stats.expanded
                );
            }
            None => {
                println!(
                    "No solution found within {} expansions; unsolvability not proven.",
                    options.budget
                );
            }
        }
    }

    if options.log {
        append_solve_log(&options.level, status, raw_actions, blocks, &report.stats);
    }
    Ok(())
}

pub fn run_inspect(level: &Path) -> Result<(), String> {
    let doc = load_level(level)?;
    let world = World::from_level(&doc).map_err(|e| e.to_string())?;
    let start = world.start();
    let finish = world.finish();
    println!("Level {}", level.display());
    println!(
        " - start: ({}, {}, {}) facing {:?}",
        start.x,
        start.y,
        start.z,
        world.start_heading()
    );
    println!(" - finish: ({}, {}, {})", finish.x, finish.y, finish.z);
    println!(" - indexed blocks: {}", world.block_count());
    println!(" - collectibles: {}", world.collectible_count());
    println!(" - switches: {}", world.switch_count());
    println!(" - portals: {}", world.portal_count());
    Ok(())
}

fn load_level(path: &Path) -> Result<LevelDoc, String> {
    let text =
        fs::read_to_string(path).map_err(|e| format!("read {}: {}", path.display(), e))?;
    parse_level(&text).map_err(|e| format!("parse {}: {}", path.display(), e))
}

fn append_solve_log(
    level: &Path,
    status: &str,
    raw_actions: usize,
    blocks: usize,
    stats: &SearchStats,
) {
    use std::fs::OpenOptions;
    use std::io::Write;

    let timestamp = Utc::now().to_rfc3339();
    let dir = PathBuf::from(LOG_DIR);
    if let Err(err) = fs::create_dir_all(&dir) {
        eprintln!("warn: failed to create log dir: {}", err);
        return;
    }
    let path = dir.join("solve.log");
    let line = format!(
        "[{}] level={} status={} raw_actions={} blocks={} expanded={} duplicates={}\n",
        timestamp,
        level.display(),
        status,
        raw_actions,
        blocks,
        stats.expanded,
        stats.duplicates_skipped
    );
    let result = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .and_then(|mut f| f.write_all(line.as_bytes()));
    if let Err(err) = result {
        eprintln!("warn: failed to write solve log {}: {}", path.display(), err);
    }
}
