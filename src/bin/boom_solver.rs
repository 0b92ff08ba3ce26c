use anyhow::{Context, Result};
use boom_solver::engine::Board;
use boom_solver::sites::DEFAULT_BUDGET;
use boom_solver::solver::{solve, SolveConfig};
use boom_solver::utils::{board_from_json, format_action};
use clap::Parser;
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Maximum number of states the site search may expand
    #[clap(short, long, default_value_t = DEFAULT_BUDGET)]
    budget: usize,

    /// Print the actions as JSON instead of game notation
    #[clap(long)]
    json: bool,

    /// Path to the board file (JSON with "white" and "black" token lists)
    board_file: PathBuf,
}

fn read_board_file(path: &Path) -> Result<Board> {
    let content = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    board_from_json(&content)
        .map_err(anyhow::Error::msg)
        .with_context(|| format!("Invalid board in {}", path.display()))
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let board = read_board_file(&args.board_file)?;
    info!("Loaded board from {}\n{}", args.board_file.display(), board);

    let config = SolveConfig { budget: args.budget, ..SolveConfig::default() };
    let solution = solve(&board, &config);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&solution.actions)?);
    } else {
        for action in &solution.actions {
            println!("{}", format_action(action));
        }
    }

    if !solution.cleared {
        warn!(
            "No complete solution found ({:?}, {} expansions)",
            solution.status, solution.expansions
        );
    }
    Ok(())
}
