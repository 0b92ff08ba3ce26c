use boom_solver::engine::Board;
use boom_solver::sites::SelectionStatus;
use boom_solver::solver::{solve, SolveConfig};
use std::collections::HashMap;

const NUM_RANDOM_BOARDS_FOR_EVALUATION: usize = 20;
const START_SEED: u64 = 0;
const ENEMY_COUNT: usize = 8;
const FRIENDLY_COUNT: usize = 3;

fn main() {
    env_logger::init();

    let config = SolveConfig::default();
    let mut status_counts: HashMap<String, usize> = HashMap::new();
    let mut cleared = 0;
    let mut total_actions = 0;

    println!(
        "Solving {} random boards ({} enemies, {} friendly stacks, budget {})...",
        NUM_RANDOM_BOARDS_FOR_EVALUATION, ENEMY_COUNT, FRIENDLY_COUNT, config.budget
    );

    for board_idx in 0..NUM_RANDOM_BOARDS_FOR_EVALUATION {
        let seed = START_SEED + board_idx as u64;
        let board = Board::new_random_with_seed(seed, ENEMY_COUNT, FRIENDLY_COUNT);
        let solution = solve(&board, &config);

        println!(
            "  Board {:<3} (Seed: {:<3}) status: {:<16} expansions: {:<4} actions: {:<3} cleared: {}",
            board_idx,
            seed,
            format!("{:?}", solution.status),
            solution.expansions,
            solution.actions.len(),
            solution.cleared
        );

        *status_counts.entry(format!("{:?}", solution.status)).or_insert(0) += 1;
        total_actions += solution.actions.len();
        if solution.cleared {
            cleared += 1;
        }
        if solution.status == SelectionStatus::Complete && !solution.cleared {
            eprintln!("Warning: board {} (Seed: {}) had a complete assignment but was not cleared:\n{}", board_idx, seed, board);
        }
    }

    println!("\n--- Evaluation Complete ---");
    println!("Boards cleared: {}/{}", cleared, NUM_RANDOM_BOARDS_FOR_EVALUATION);
    println!(
        "Average actions per board: {:.2}",
        total_actions as f64 / NUM_RANDOM_BOARDS_FOR_EVALUATION as f64
    );

    let mut statuses: Vec<(String, usize)> = status_counts.into_iter().collect();
    statuses.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    for (status, count) in statuses {
        println!("  {:<16}: {}", status, count);
    }
}
