use std::path::PathBuf;

use clap::{Parser, Subcommand};
use voxplan::DEFAULT_EXPANSION_BUDGET;

mod solve;

use solve::{SolveOptions, run_inspect, run_solve};

#[derive(Parser)]
#[command(
    name = "voxplan",
    version,
    about = "Offline solver for voxel block-world puzzle levels",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Solve a level and print the synthesized block program
    Solve {
        /// Path to the level JSON document
        level: PathBuf,
        /// Maximum node expansions before the search gives up
        #[arg(long, default_value_t = DEFAULT_EXPANSION_BUDGET)]
        budget: u64,
        /// Print the structured result as JSON instead of the block tree
        #[arg(long)]
        json: bool,
        /// Replay the plan against the world rules before reporting
        #[arg(long)]
        check: bool,
        /// Skip appending a record to .voxplan/solve.log
        #[arg(long)]
        no_log: bool,
    },
    /// Print level statistics without solving
    Inspect {
        /// Path to the level JSON document
        level: PathBuf,
    },
}

pub fn run() {
    let cli = Cli::parse();
    if let Err(err) = dispatch(cli.command) {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}

fn dispatch(command: Command) -> Result<(), String> {
    match command {
        Command::Solve {
            level,
            budget,
            json,
            check,
            no_log,
        } => run_solve(SolveOptions {
            level,
            budget,
            json,
            check,
            log: !no_log,
        }),
        Command::Inspect { level } => run_inspect(&level),
    }
}
