use crate::clusters::analyze;
use crate::engine::{Action, Board, Coord, BOARD_SIZE};
use crate::router::Router;
use crate::sites::{select_sites, SelectionStatus, SlotTarget, DEFAULT_BUDGET};
use log::{debug, info, warn};

/// Parameters of a single solve.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SolveConfig {
    /// Maximum number of states the site search may expand.
    pub budget: usize,
    /// Width and height of the (square) board.
    pub board_size: i32,
}

impl Default for SolveConfig {
    fn default() -> Self {
        SolveConfig { budget: DEFAULT_BUDGET, board_size: BOARD_SIZE }
    }
}

/// Represents a solution found by the solver.
#[derive(Clone, Debug)]
pub struct Solution {
    /// Every move, followed by every boom, in playing order.
    pub actions: Vec<Action>,
    /// Target assigned to each friendly-token slot by the site search.
    pub slots: Vec<SlotTarget>,
    /// Square each slot's token was routed to, `None` where routing was skipped.
    pub placements: Vec<Option<Coord>>,
    pub status: SelectionStatus,
    /// States expanded by the site search.
    pub expansions: usize,
    /// True when replaying `actions` destroys every enemy token.
    pub cleared: bool,
}

impl Solution {
    pub fn moves(&self) -> impl Iterator<Item = &Action> {
        self.actions.iter().filter(|a| matches!(a, Action::Move { .. }))
    }

    pub fn booms(&self) -> impl Iterator<Item = &Action> {
        self.actions.iter().filter(|a| matches!(a, Action::Boom { .. }))
    }
}

/// Computes an action list that clears `board`.
///
/// The board's enemies are split into clusters, the site search assigns a boom
/// square to each friendly token, and each token is routed there in slot order.
/// Booms follow all moves, in slot order; a boom is left out when its stack was
/// already destroyed by an earlier chain reaction.
///
/// The function never fails. A budget overrun, a slot that cannot be routed or a
/// board with too few tokens all show up as a `Solution` with `cleared == false`.
pub fn solve(board: &Board, config: &SolveConfig) -> Solution {
    let analysis = analyze(board, config.board_size);
    info!(
        "Formed {} clusters ({} isolated) from {} enemy tokens",
        analysis.clusters.len(),
        analysis.isolated_count(),
        board.enemies().len()
    );

    let slot_count = board.friendly_token_count() as usize;
    let selection = select_sites(&analysis, slot_count, config.budget);
    info!(
        "Site search: {:?} after {} expansions, {} of {} slots assigned",
        selection.status,
        selection.expansions,
        selection.resolved_count(),
        slot_count
    );

    let mut router = Router::new(board, config.board_size);
    let mut actions = Vec::new();
    let mut placements = Vec::with_capacity(selection.slots.len());

    for (slot, target) in selection.slots.iter().enumerate() {
        if !target.is_resolved() {
            placements.push(None);
            continue;
        }
        match router.route(target) {
            Ok(route) => {
                debug!("Slot {}: {} jumps to {}", slot, route.jumps.len(), route.target);
                actions.extend(route.jumps.iter().map(|&jump| Action::from(jump)));
                placements.push(Some(route.target));
            }
            Err(err) => {
                warn!("Skipping slot {}: {}", slot, err);
                placements.push(None);
            }
        }
    }

    let mut sim = board.clone();
    for action in &actions {
        if let Err(err) = sim.apply(action, config.board_size) {
            warn!("Replaying {:?} failed: {}", action, err);
        }
    }

    for &at in placements.iter().flatten() {
        if sim.stack_at(at).is_none() {
            debug!("Stack at {} already destroyed, no boom needed", at);
            continue;
        }
        let boom = Action::Boom { at };
        if sim.apply(&boom, config.board_size).is_ok() {
            actions.push(boom);
        }
    }

    let cleared = sim.is_cleared();
    if !cleared {
        info!("{} enemy tokens survive the solution", sim.enemies().len());
    }

    Solution {
        actions,
        slots: selection.slots,
        placements,
        status: selection.status,
        expansions: selection.expansions,
        cleared,
    }
}
