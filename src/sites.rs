//! Best-first search assigning detonation squares to friendly-token slots.
//!
//! Every friendly token can boom once, so each token is a *slot*. Isolated
//! clusters are served up front by handing a slot their shoreline; the search
//! then spends the remaining slots on detonation sites of bridged clusters. One
//! site may clear several clusters at once while still consuming a single slot.
//!
//! The queue is ordered by the expansion at which an entry was generated, ties
//! broken by insertion order, so the search visits shallow assignments first. It
//! gives up after a fixed number of expansions and reports the best partial
//! assignment it saw.
use crate::clusters::{ClusterAnalysis, ClusterTargets};
use crate::engine::Coord;
use log::{debug, warn};
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// Default number of expansions before the site search gives up.
pub const DEFAULT_BUDGET: usize = 75;

/// What a single friendly-token slot has been assigned to.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SlotTarget {
    /// Boom on this detonation site.
    Site(Coord),
    /// Boom on any of these shoreline squares of an isolated cluster; the router
    /// picks the concrete square.
    Shoreline(Vec<Coord>),
    /// No target: the slot is spare, or the search ran out of budget.
    Unresolved,
}

impl SlotTarget {
    pub fn is_resolved(&self) -> bool {
        !matches!(self, SlotTarget::Unresolved)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectionStatus {
    /// Every cluster is served by some slot.
    Complete,
    /// All slots are assigned but some clusters are left standing.
    OutOfTokens,
    /// The expansion budget ran out before every slot was assigned.
    BudgetExhausted,
}

/// Outcome of the site search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selection {
    /// One entry per friendly token, in slot order.
    pub slots: Vec<SlotTarget>,
    pub status: SelectionStatus,
    /// Number of states popped off the queue.
    pub expansions: usize,
}

impl Selection {
    pub fn resolved_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_resolved()).count()
    }

    pub fn unresolved_count(&self) -> usize {
        self.slots.len() - self.resolved_count()
    }
}

/// A partial assignment. States are never modified once built; applying a site
/// produces a new state.
#[derive(Clone, Debug, PartialEq, Eq)]
struct SearchState {
    slots: Vec<SlotTarget>,
    /// Per cluster: still waiting for a boom.
    needed: Vec<bool>,
}

impl SearchState {
    fn initial(analysis: &ClusterAnalysis, slot_count: usize) -> Self {
        let mut slots = vec![SlotTarget::Unresolved; slot_count];
        let mut needed = vec![true; analysis.clusters.len()];
        let mut next_slot = 0;

        for (i, cluster) in analysis.clusters.iter().enumerate() {
            if let ClusterTargets::Isolated(shore) = &cluster.targets {
                if next_slot < slot_count {
                    slots[next_slot] = SlotTarget::Shoreline(shore.clone());
                    next_slot += 1;
                    needed[i] = false;
                }
            }
        }

        SearchState { slots, needed }
    }

    fn has_free_slot(&self) -> bool {
        self.slots.iter().any(|s| !s.is_resolved())
    }

    fn needed_count(&self) -> usize {
        self.needed.iter().filter(|&&n| n).count()
    }

    fn is_goal(&self) -> bool {
        !self.has_free_slot() || self.needed_count() == 0
    }

    /// Booms on `site`: clears every still-needed cluster whose site list holds
    /// it, and fills the first free slot. Returns `None` when no slot is free.
    fn apply_site(&self, site: Coord, analysis: &ClusterAnalysis) -> Option<SearchState> {
        let free = self.slots.iter().position(|s| !s.is_resolved())?;

        let mut next = self.clone();
        next.slots[free] = SlotTarget::Site(site);
        for (i, cluster) in analysis.clusters.iter().enumerate() {
            if next.needed[i] && cluster.sites().contains(&site) {
                next.needed[i] = false;
            }
        }
        Some(next)
    }

    fn successors(&self, analysis: &ClusterAnalysis) -> Vec<SearchState> {
        let mut children = Vec::new();
        for (i, cluster) in analysis.clusters.iter().enumerate() {
            if !self.needed[i] {
                continue;
            }
            for &site in cluster.sites() {
                if let Some(child) = self.apply_site(site, analysis) {
                    children.push(child);
                }
            }
        }
        children
    }

    /// Preference used to pick the best partial answer: fewer standing clusters,
    /// then more assigned slots.
    fn progress(&self) -> (Reverse<usize>, usize) {
        let assigned = self.slots.iter().filter(|s| s.is_resolved()).count();
        (Reverse(self.needed_count()), assigned)
    }
}

struct QueueEntry {
    priority: usize,
    seq: usize,
    state: SearchState,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Reversed so that `BinaryHeap` pops the lowest (priority, seq) first.
impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        (other.priority, other.seq).cmp(&(self.priority, self.seq))
    }
}

/// Assigns a target to each of `slot_count` friendly-token slots.
///
/// Isolated clusters get the first slots, in cluster order, with their shoreline
/// as target. Bridged clusters are then covered by a best-first search over
/// detonation sites. The search stops at the first state where every slot is
/// assigned or no cluster is left, or when `budget` expansions have been spent.
///
/// Running out of budget is not an error: the best partial assignment seen is
/// returned with [`SelectionStatus::BudgetExhausted`], and callers must cope with
/// [`SlotTarget::Unresolved`] entries.
pub fn select_sites(analysis: &ClusterAnalysis, slot_count: usize, budget: usize) -> Selection {
    let initial = SearchState::initial(analysis, slot_count);

    let mut heap = BinaryHeap::new();
    let mut seq = 0;
    heap.push(QueueEntry { priority: 0, seq, state: initial.clone() });
    seq += 1;

    let mut expansions = 0;
    let mut best = initial;

    while let Some(entry) = heap.pop() {
        // Every pop counts against the budget, goal or not.
        expansions += 1;
        let state = entry.state;

        // Slots full or nothing left to destroy.
        if state.is_goal() {
            let status = if state.needed_count() == 0 {
                SelectionStatus::Complete
            } else {
                SelectionStatus::OutOfTokens
            };
            debug!(
                "Site search reached a goal after {} expansions ({} clusters left)",
                expansions,
                state.needed_count()
            );
            return Selection { slots: state.slots, status, expansions };
        }

        // Remember the most promising partial state in case the budget runs out.
        if state.progress() > best.progress() {
            best = state.clone();
        }

        if expansions >= budget {
            warn!(
                "Unable to assign every slot within {} expansions; {} clusters left standing",
                budget,
                best.needed_count()
            );
            return Selection { slots: best.slots, status: SelectionStatus::BudgetExhausted, expansions };
        }

        // Children queue behind every waiting state; `seq` keeps siblings in order.
        for child in state.successors(analysis) {
            heap.push(QueueEntry { priority: expansions, seq, state: child });
            seq += 1;
        }
    }

    warn!("Site search ran out of states after {} expansions", expansions);
    Selection { slots: best.slots, status: SelectionStatus::BudgetExhausted, expansions }
}
