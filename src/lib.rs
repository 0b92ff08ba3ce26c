//! # Boom Solver Library
//!
//! This library computes a winning action sequence for the boom puzzle: an 8×8
//! board holding immovable enemy tokens and stacks of friendly tokens that can
//! move, merge, split and detonate. A boom destroys every token in the 3×3 area
//! around it, and every destroyed token explodes in turn.
//!
//! It is used by two binaries:
//! - `boom_solver`: loads a JSON board, solves it and prints the actions.
//! - `solver_evaluator`: solves a batch of seeded random boards and reports how
//!   many were cleared.
//!
//! ## Modules
//! - `engine`: the board model (`Coord`, `Stack`, `Action`, `Board`) and a rules
//!   simulation that replays actions.
//! - `clusters`: splits enemy tokens into clusters and finds where each can be
//!   destroyed from.
//! - `sites`: the budgeted best-first search assigning a boom square to every
//!   friendly token.
//! - `router`: A* routing of friendly stacks onto their boom squares.
//! - `solver`: provides `solve`, tying the three stages together.
//! - `utils`: board parsing (text and JSON) and action formatting.

pub mod clusters;
pub mod engine;
pub mod router;
pub mod sites;
pub mod solver;
pub mod utils;

// Items are reached through their module, e.g. `boom_solver::solver::solve`.
