//! Shortest-path routing of friendly stacks onto their boom squares.
//!
//! Targets are served one at a time. For each target the router tries the
//! stacks that still have a free token, closest first, running A* over stack moves:
//! a stack of height `h` jumps 1..=h squares along a row or column, merging with
//! any friendly stack it lands on. Once a target is reached it is *in position*
//! and keeps one token reserved; stacks leaving such a square leave that token
//! behind.
//!
//! Search nodes live in an arena and point at their parent by index, so a
//! queued node can never be changed through another one.
use crate::engine::{Action, Board, Coord, Stack, ORTHOGONAL_STEPS};
use crate::sites::SlotTarget;
use log::debug;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::fmt;

/// A single move of `count` tokens from one square to another.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Jump {
    pub count: u32,
    pub from: Coord,
    pub to: Coord,
}

impl Jump {
    pub fn length(&self) -> i32 {
        self.from.manhattan(self.to)
    }

    /// Squares strictly between `from` and `to`.
    pub fn passed_over(&self) -> Vec<Coord> {
        let steps = self.length();
        let dx = (self.to.x - self.from.x).signum();
        let dy = (self.to.y - self.from.y).signum();
        (1..steps).map(|k| self.from.offset(dx * k, dy * k)).collect()
    }
}

impl From<Jump> for Action {
    fn from(jump: Jump) -> Action {
        Action::Move { count: jump.count, from: jump.from, to: jump.to }
    }
}

/// The moves that bring one token onto a target square.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Route {
    /// Square of the stack chosen to move.
    pub mover: Coord,
    /// Square the token ends on.
    pub target: Coord,
    pub jumps: Vec<Jump>,
    /// Total jump length.
    pub cost: i32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RouteError {
    /// The slot has no target, or every candidate square is already taken.
    NoTarget,
    /// No stack has a free token left.
    NoMover,
    /// No stack with a free token can reach any target square. Names the
    /// closest pair.
    Unreachable { from: Coord, to: Coord },
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteError::NoTarget => write!(f, "no target square available"),
            RouteError::NoMover => write!(f, "no friendly stack with a free token"),
            RouteError::Unreachable { from, to } => write!(f, "no path from {} to {}", from, to),
        }
    }
}

impl std::error::Error for RouteError {}

/// Everything that distinguishes two search nodes.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct NodeKey {
    pos: Coord,
    /// Height of the stack on `pos`, mover included.
    height: u32,
    /// Every other friendly stack, sorted.
    pool: Vec<Stack>,
}

struct RouteNode {
    key: NodeKey,
    parent: Option<usize>,
    jump: Option<Jump>,
    cost: i32,
}

pub struct Router {
    enemies: HashSet<Coord>,
    pool: Vec<Stack>,
    in_position: Vec<Coord>,
    board_size: i32,
}

impl Router {
    pub fn new(board: &Board, board_size: i32) -> Self {
        let mut pool = board.stacks().to_vec();
        pool.sort();
        Router {
            enemies: board.enemies().iter().copied().collect(),
            pool,
            in_position: Vec::new(),
            board_size,
        }
    }

    /// Current friendly stacks, sorted by square.
    pub fn pool(&self) -> &[Stack] {
        &self.pool
    }

    /// Squares already holding the token of a routed target, in routing order.
    pub fn in_position(&self) -> &[Coord] {
        &self.in_position
    }

    fn reserved_at(&self, c: Coord) -> u32 {
        self.in_position.contains(&c) as u32
    }

    fn free_tokens(&self, stack: &Stack) -> u32 {
        stack.height.saturating_sub(self.reserved_at(stack.pos))
    }

    /// Every (stack, target square) pair worth trying, closest first.
    ///
    /// Pairs at equal distance keep pool order, then target order.
    fn candidates(&self, target: &SlotTarget) -> Result<Vec<(usize, Coord)>, RouteError> {
        let squares: Vec<Coord> = match target {
            SlotTarget::Site(site) => vec![*site],
            SlotTarget::Shoreline(shore) => shore.clone(),
            SlotTarget::Unresolved => return Err(RouteError::NoTarget),
        };
        let goals: Vec<Coord> = squares
            .into_iter()
            .filter(|g| !self.in_position.contains(g) && !self.enemies.contains(g))
            .collect();
        if goals.is_empty() {
            return Err(RouteError::NoTarget);
        }

        let mut pairs: Vec<(i32, usize, Coord)> = Vec::new();
        for (i, stack) in self.pool.iter().enumerate() {
            if self.free_tokens(stack) == 0 {
                continue;
            }
            for &goal in &goals {
                pairs.push((stack.pos.manhattan(goal), i, goal));
            }
        }
        if pairs.is_empty() {
            return Err(RouteError::NoMover);
        }

        // Stable sort, so ties stay in pool then target order.
        pairs.sort_by_key(|&(dist, _, _)| dist);
        Ok(pairs.into_iter().map(|(_, i, goal)| (i, goal)).collect())
    }

    /// Routes a token onto `target` and commits the resulting board.
    ///
    /// Candidate pairs are searched closest first until one connects. If none
    /// does, the error names the closest pair. On success the target square is
    /// marked in position and the pool reflects every merge and split along the
    /// route. On error nothing changes.
    pub fn route(&mut self, target: &SlotTarget) -> Result<Route, RouteError> {
        let mut first_failure = None;

        for (mover_idx, goal) in self.candidates(target)? {
            let mover = self.pool[mover_idx];
            let mut others = self.pool.clone();
            others.remove(mover_idx);

            match self.search(mover, others, goal) {
                Ok((route, pool)) => {
                    debug!(
                        "Routed stack at {} to {} in {} jumps (cost {})",
                        route.mover,
                        route.target,
                        route.jumps.len(),
                        route.cost
                    );
                    self.pool = pool;
                    self.in_position.push(goal);
                    return Ok(route);
                }
                Err(err) => {
                    debug!("Stack at {} cannot reach {}, trying the next pair", mover.pos, goal);
                    first_failure.get_or_insert(err);
                }
            }
        }

        Err(first_failure.unwrap_or(RouteError::NoMover))
    }

    fn search(&self, mover: Stack, others: Vec<Stack>, goal: Coord) -> Result<(Route, Vec<Stack>), RouteError> {
        let mut arena: Vec<RouteNode> = Vec::new();
        let mut open = BinaryHeap::new();
        let mut best_cost: HashMap<NodeKey, i32> = HashMap::new();
        let mut closed: HashSet<NodeKey> = HashSet::new();

        let start = NodeKey { pos: mover.pos, height: mover.height, pool: others };
        best_cost.insert(start.clone(), 0);
        arena.push(RouteNode { key: start, parent: None, jump: None, cost: 0 });
        open.push(Reverse((mover.pos.manhattan(goal), 0usize)));

        while let Some(Reverse((_, handle))) = open.pop() {
            // Stale entry: a cheaper copy of this node was already expanded.
            if closed.contains(&arena[handle].key) {
                continue;
            }
            // The heuristic is admissible, so the first goal popped is optimal.
            if arena[handle].key.pos == goal {
                return Ok(Self::finish(&arena, handle, mover.pos, goal));
            }
            closed.insert(arena[handle].key.clone());

            let cost = arena[handle].cost;
            let children = self.expand(&arena[handle].key);
            for (key, jump) in children {
                let next_cost = cost + jump.length();
                // Skip children already reached at least as cheaply.
                if closed.contains(&key) || best_cost.get(&key).map_or(false, |&c| c <= next_cost) {
                    continue;
                }
                best_cost.insert(key.clone(), next_cost);

                // f = g + Manhattan distance to the goal.
                let estimate = next_cost + key.pos.manhattan(goal);
                arena.push(RouteNode { key, parent: Some(handle), jump: Some(jump), cost: next_cost });
                open.push(Reverse((estimate, arena.len() - 1)));
            }
        }

        Err(RouteError::Unreachable { from: mover.pos, to: goal })
    }

    /// Every node reachable from `key` in one jump.
    fn expand(&self, key: &NodeKey) -> Vec<(NodeKey, Jump)> {
        let reserved = self.reserved_at(key.pos);
        let free = key.height.saturating_sub(reserved);
        if free == 0 {
            return Vec::new();
        }

        // The reserved token stays behind as a stack of its own.
        let mut base = key.pool.clone();
        if reserved > 0 {
            base.push(Stack::new(reserved, key.pos));
            base.sort();
        }

        let mut children = Vec::new();
        for &(dx, dy) in ORTHOGONAL_STEPS.iter() {
            for dist in 1..=key.height as i32 {
                let to = key.pos.offset(dx * dist, dy * dist);
                // Nothing beyond the edge or an enemy is reachable in this direction.
                if !to.on_board(self.board_size) || self.enemies.contains(&to) {
                    break;
                }

                // Landing on a friendly stack merges the two.
                let mut pool = base.clone();
                let mut height = free;
                if let Some(i) = pool.iter().position(|s| s.pos == to) {
                    height += pool.remove(i).height;
                }
                children.push((NodeKey { pos: to, height, pool }, Jump { count: free, from: key.pos, to }));
            }
        }
        children
    }

    /// Rebuilds the jump list and the final pool for the goal node at `handle`.
    ///
    /// A final jump carrying several tokens is cut down to one token; the rest
    /// stays on the square it jumped from.
    fn finish(arena: &[RouteNode], handle: usize, mover: Coord, goal: Coord) -> (Route, Vec<Stack>) {
        let mut jumps = Vec::new();
        let mut cursor = Some(handle);
        while let Some(i) = cursor {
            if let Some(jump) = arena[i].jump {
                jumps.push(jump);
            }
            cursor = arena[i].parent;
        }
        jumps.reverse();

        let last = &arena[handle];
        let mut pool = last.key.pool.clone();
        let mut arrived = last.key.height;

        if let Some(final_jump) = jumps.last_mut() {
            if final_jump.count > 1 {
                let rest = final_jump.count - 1;
                final_jump.count = 1;
                arrived -= rest;
                match pool.iter_mut().find(|s| s.pos == final_jump.from) {
                    Some(stack) => stack.height += rest,
                    None => pool.push(Stack::new(rest, final_jump.from)),
                }
            }
        }

        pool.push(Stack::new(arrived, goal));
        pool.sort();

        let route = Route { mover, target: goal, jumps, cost: last.cost };
        (route, pool)
    }
}
