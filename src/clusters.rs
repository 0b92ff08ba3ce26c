//! Partitioning of enemy tokens into destruction clusters.
//!
//! A boom destroys every token in its 3×3 area and each destroyed token explodes
//! in turn, so touching any token of a king-connected cluster wipes out the whole
//! cluster. This module finds those clusters and, for each one, the squares from
//! which a single boom would reach it:
//! - an *isolated* cluster (no other cluster within king distance 2) exposes its
//!   shoreline, the empty squares touching it;
//! - a *bridged* cluster exposes detonation sites shared with a neighbouring
//!   cluster, so that one boom can clear both.
use crate::engine::{Board, Coord};
use std::collections::{HashMap, HashSet, VecDeque};

/// Where a cluster can be destroyed from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClusterTargets {
    /// No other cluster is close enough to share a boom. The coordinates are the
    /// cluster's shoreline.
    Isolated(Vec<Coord>),
    /// Detonation sites, each reaching this cluster and at least one other.
    Bridged(Vec<Coord>),
}

impl ClusterTargets {
    pub fn is_isolated(&self) -> bool {
        matches!(self, ClusterTargets::Isolated(_))
    }

    pub fn coords(&self) -> &[Coord] {
        match self {
            ClusterTargets::Isolated(coords) | ClusterTargets::Bridged(coords) => coords,
        }
    }
}

/// A maximal king-connected group of enemy tokens.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cluster {
    pub tokens: Vec<Coord>,
    pub targets: ClusterTargets,
}

impl Cluster {
    pub fn is_isolated(&self) -> bool {
        self.targets.is_isolated()
    }

    /// Returns the detonation sites of a bridged cluster, or an empty slice for an
    /// isolated one.
    pub fn sites(&self) -> &[Coord] {
        match &self.targets {
            ClusterTargets::Bridged(sites) => sites,
            ClusterTargets::Isolated(_) => &[],
        }
    }
}

/// The result of analysing one board snapshot.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClusterAnalysis {
    pub clusters: Vec<Cluster>,
}

impl ClusterAnalysis {
    pub fn isolated_count(&self) -> usize {
        self.clusters.iter().filter(|c| c.is_isolated()).count()
    }

    /// Index of the cluster holding the enemy token at `c`, if any.
    #[cfg(test)]
    pub fn cluster_of(&self, c: Coord) -> Option<usize> {
        self.clusters.iter().position(|cluster| cluster.tokens.contains(&c))
    }
}

/// Groups enemy tokens into king-connected clusters.
///
/// Clusters come out in the order of their first token in `enemies`; tokens in a
/// cluster are listed in breadth-first discovery order. Duplicate coordinates are
/// collapsed.
pub fn form_clusters(enemies: &[Coord], board_size: i32) -> Vec<Vec<Coord>> {
    let occupied: HashSet<Coord> = enemies.iter().copied().collect();
    let mut visited: HashSet<Coord> = HashSet::new();
    let mut clusters = Vec::new();

    for &start in enemies {
        if !visited.insert(start) {
            continue;
        }

        let mut cluster = Vec::new();
        let mut queue = VecDeque::new();
        queue.push_back(start);

        while let Some(token) = queue.pop_front() {
            cluster.push(token);
            for n in token.king_neighbors(board_size) {
                if occupied.contains(&n) && visited.insert(n) {
                    queue.push_back(n);
                }
            }
        }

        clusters.push(cluster);
    }

    clusters
}

/// Returns the in-bounds squares touching the cluster that are not cluster tokens.
pub fn shoreline(cluster: &[Coord], board_size: i32) -> Vec<Coord> {
    let mut shore = Vec::new();
    for token in cluster {
        for n in token.king_neighbors(board_size) {
            if !cluster.contains(&n) && !shore.contains(&n) {
                shore.push(n);
            }
        }
    }
    shore
}

/// Squares from which one blast reaches both `token` and `foreign`.
///
/// `foreign` must sit at king distance exactly 2 from `token`; any other offset
/// yields no sites. The result is not clipped to the board.
pub fn bridge_sites(token: Coord, foreign: Coord) -> Vec<Coord> {
    let dx = foreign.x - token.x;
    let dy = foreign.y - token.y;

    match (dx.abs(), dy.abs()) {
        // Diagonal gap: only the square between them.
        (2, 2) => vec![token.offset(dx / 2, dy / 2)],
        // Same column: the midpoint and its row neighbours.
        (0, 2) => {
            let mid = token.offset(0, dy / 2);
            vec![mid.offset(-1, 0), mid, mid.offset(1, 0)]
        }
        // Same row: the midpoint and its column neighbours.
        (2, 0) => {
            let mid = token.offset(dx / 2, 0);
            vec![mid.offset(0, -1), mid, mid.offset(0, 1)]
        }
        // Knight offsets: the midline square in line with each token.
        (1, 2) => {
            let y = token.y + dy / 2;
            vec![Coord::new(token.x, y), Coord::new(foreign.x, y)]
        }
        (2, 1) => {
            let x = token.x + dx / 2;
            vec![Coord::new(x, token.y), Coord::new(x, foreign.y)]
        }
        _ => Vec::new(),
    }
}

/// Forms the clusters of `board` and works out how each one can be destroyed.
pub fn analyze(board: &Board, board_size: i32) -> ClusterAnalysis {
    let groups = form_clusters(board.enemies(), board_size);

    let mut owner: HashMap<Coord, usize> = HashMap::new();
    for (i, group) in groups.iter().enumerate() {
        for &token in group {
            owner.insert(token, i);
        }
    }

    let clusters = groups
        .iter()
        .enumerate()
        .map(|(i, group)| {
            let mut bridged = false;
            let mut sites: Vec<Coord> = Vec::new();

            for &token in group {
                for dx in -2i32..=2 {
                    for dy in -2i32..=2 {
                        let foreign = token.offset(dx, dy);
                        // Only tokens exactly two king steps away can share a blast.
                        if token.chebyshev(foreign) != 2 {
                            continue;
                        }
                        match owner.get(&foreign) {
                            Some(&j) if j != i => {}
                            _ => continue,
                        }

                        bridged = true;
                        for site in bridge_sites(token, foreign) {
                            if site.on_board(board_size) && !sites.contains(&site) {
                                sites.push(site);
                            }
                        }
                    }
                }
            }

            let targets = if bridged {
                ClusterTargets::Bridged(sites)
            } else {
                ClusterTargets::Isolated(shoreline(group, board_size))
            };
            Cluster { tokens: group.clone(), targets }
        })
        .collect();

    ClusterAnalysis { clusters }
}
