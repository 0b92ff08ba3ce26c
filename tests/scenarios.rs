use boom_solver::clusters::{analyze, ClusterTargets};
use boom_solver::engine::{Action, Board, Coord, Stack, BOARD_SIZE};
use boom_solver::sites::{select_sites, SelectionStatus, SlotTarget};
use boom_solver::solver::{solve, SolveConfig};
use boom_solver::utils::{board_from_json, board_from_str_array, format_action};
use test_case::test_case;

fn c(x: i32, y: i32) -> Coord {
    Coord::new(x, y)
}

fn replay(board: &Board, actions: &[Action]) -> Board {
    let mut sim = board.clone();
    for action in actions {
        sim.apply(action, BOARD_SIZE).unwrap();
    }
    sim
}

#[test]
fn single_enemy_single_token() {
    let board = board_from_json(r#"{"white": [[1, 4, 2]], "black": [[1, 4, 4]]}"#).unwrap();

    let analysis = analyze(&board, BOARD_SIZE);
    assert_eq!(analysis.clusters.len(), 1);
    assert!(analysis.clusters[0].is_isolated());
    assert!(analysis.clusters[0].targets.coords().contains(&c(4, 3)));

    let solution = solve(&board, &SolveConfig::default());
    let lines: Vec<String> = solution.actions.iter().map(format_action).collect();
    assert_eq!(lines, vec!["MOVE 1 from (4, 2) to (4, 3).", "BOOM at (4, 3)."]);
    assert!(solution.cleared);
}

#[test]
fn diagonal_gap_has_one_site() {
    let board = Board::new(vec![c(3, 3), c(5, 5)], vec![]);
    let analysis = analyze(&board, BOARD_SIZE);

    let mut sites: Vec<Coord> = analysis.clusters.iter().flat_map(|cl| cl.sites().to_vec()).collect();
    sites.sort();
    sites.dedup();
    assert_eq!(sites, vec![c(4, 4)]);
}

#[test]
fn budget_exhaustion_is_not_fatal() {
    // Ten bridged clusters and four tokens: a budget of 10 only gets through the
    // first level of the search.
    let board = board_from_str_array(&[
        "X.X..X.X",
        "........",
        "X.X..X.X",
        "........",
        "........",
        "X.X.....",
        "........",
        "1.1.1.1.",
    ])
    .unwrap();

    let config = SolveConfig { budget: 10, ..SolveConfig::default() };
    let solution = solve(&board, &config);

    assert_eq!(solution.status, SelectionStatus::BudgetExhausted);
    assert_eq!(solution.expansions, 10);
    assert!(solution.slots.iter().any(|s| *s == SlotTarget::Unresolved));
    assert!(solution.booms().count() < board.friendly_token_count() as usize);

    // Whatever was produced must still be playable.
    let sim = replay(&board, &solution.actions);
    assert_eq!(sim.is_cleared(), solution.cleared);
}

#[test_case(&[(3, 3), (5, 5)], 1, 1 ; "diagonal pair cleared by one boom")]
#[test_case(&[(3, 3), (5, 5), (3, 5)], 3, 1 ; "three clusters around one square")]
#[test_case(&[(0, 0), (2, 2), (5, 5), (7, 7)], 2, 2 ; "two separate pairs need two booms")]
#[test_case(&[(1, 1), (1, 3)], 2, 1 ; "column pair leaves a spare token")]
fn slot_consumption(enemies: &[(i32, i32)], tokens: u32, expected_resolved: usize) {
    let enemies: Vec<Coord> = enemies.iter().map(|&(x, y)| c(x, y)).collect();
    let board = Board::new(enemies, vec![]);
    let analysis = analyze(&board, BOARD_SIZE);

    let selection = select_sites(&analysis, tokens as usize, SolveConfig::default().budget);
    assert_eq!(selection.status, SelectionStatus::Complete);
    assert_eq!(selection.resolved_count(), expected_resolved);
    assert_eq!(selection.slots.len(), tokens as usize);
}

#[test_case(&["........", "........", "........", "...X....", "........", "........", "........", "3......."] ; "tall stack far from an isolated enemy")]
#[test_case(&["........", "..X.X...", "........", "........", "........", "......X.", "........", "1.....1."] ; "pair plus an isolated enemy")]
#[test_case(&["........", "........", "..XX....", "..XX....", "........", "........", "........", ".2......"] ; "square cluster")]
#[test_case(&["X.......", "XXX.....", "........", "........", "........", "........", "........", ".......1"] ; "corner cluster across the board")]
fn solved_boards_are_cleared(rows: &[&str]) {
    let board = board_from_str_array(rows).unwrap();
    let solution = solve(&board, &SolveConfig::default());

    assert_eq!(solution.status, SelectionStatus::Complete);
    assert!(solution.cleared, "Board was not cleared by {:?}", solution.actions);

    let sim = replay(&board, &solution.actions);
    assert!(sim.is_cleared());
}

#[test]
fn moves_never_touch_enemies() {
    for seed in 0..25 {
        let board = Board::new_random_with_seed(seed, 10, 4);
        let solution = solve(&board, &SolveConfig::default());

        for action in solution.moves() {
            if let Action::Move { from, to, .. } = *action {
                assert!(!board.is_enemy(to), "Seed {}: move lands on enemy {}", seed, to);
                let dx = (to.x - from.x).signum();
                let dy = (to.y - from.y).signum();
                for k in 1..from.manhattan(to) {
                    let passed = from.offset(dx * k, dy * k);
                    assert!(!board.is_enemy(passed), "Seed {}: move passes over enemy {}", seed, passed);
                }
            }
        }

        // Every produced action is legal on the simulated board.
        let sim = replay(&board, &solution.actions);
        assert_eq!(sim.is_cleared(), solution.cleared);

        // A complete assignment whose targets were all reached must clear the board.
        let all_placed = solution
            .slots
            .iter()
            .zip(&solution.placements)
            .all(|(slot, placed)| !slot.is_resolved() || placed.is_some());
        if solution.status == SelectionStatus::Complete && all_placed {
            assert!(solution.cleared, "Seed {}: complete solution left enemies:\n{}", seed, sim);
        }
    }
}

#[test]
fn walled_in_stack_does_not_lose_the_slot() {
    // The stack at (0, 0) is boxed in by its own cluster; the isolated enemy at
    // (0, 4) has to be served by the stack at (7, 4) instead.
    let board = Board::new(
        vec![c(0, 4), c(1, 0), c(0, 1)],
        vec![Stack::new(1, c(0, 0)), Stack::new(1, c(7, 4))],
    );
    let solution = solve(&board, &SolveConfig::default());

    assert_eq!(solution.status, SelectionStatus::Complete);
    assert_eq!(solution.placements, vec![Some(c(1, 4)), Some(c(0, 0))]);
    assert_eq!(solution.moves().count(), 6);
    assert_eq!(
        solution.booms().cloned().collect::<Vec<_>>(),
        vec![Action::Boom { at: c(1, 4) }, Action::Boom { at: c(0, 0) }]
    );
    assert!(solution.cleared);
}

#[test]
fn isolated_targets_are_shorelines() {
    let board = Board::new(vec![c(0, 0), c(1, 0)], vec![Stack::new(1, c(5, 5))]);
    let analysis = analyze(&board, BOARD_SIZE);
    match &analysis.clusters[0].targets {
        ClusterTargets::Isolated(shore) => {
            let mut shore = shore.clone();
            shore.sort();
            assert_eq!(shore, vec![c(0, 1), c(1, 1), c(2, 0), c(2, 1)]);
        }
        other => panic!("Expected an isolated cluster, got {:?}", other),
    }
}
