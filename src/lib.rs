//! sente: a Monte-Carlo Go engine.
//!
//! The engine plays Go by running many randomized simulated games from
//! the current position and picking the move whose simulated outcomes
//! are most favorable, guided by a statistics tree that blends direct
//! win rates with the RAVE (all-moves-as-first) estimator.
//!
//! ## Modules
//!
//! - [`board`] - Incremental board model: captures, ko, legality, scoring
//! - [`group`] - Stone chains and their liberties
//! - [`engine`] - Search loop, budgets, and move generation
//! - [`tree`] - Double-buffered arena of statistics nodes
//! - [`amaf`] - Per-simulation all-moves-as-first recorder
//! - [`playout`] - Simulated games with tactical move policies
//! - [`heuristics`] - Liberty analysis and the playout policies
//! - [`patterns`] - Hand-coded tactical shape matching
//! - [`priors`] - Pseudo-count seeding for new tree nodes
//! - [`zobrist`] - Position hashing and the bounded superko window
//! - [`topology`] - Precomputed per-point neighbourhood tables
//! - [`gtp`] - Go Text Protocol adapter
//! - [`constants`] - Engine parameters
//!
//! ## Example
//!
//! ```no_run
//! use sente::board::Color;
//! use sente::engine::{Engine, GenMove};
//!
//! let mut engine = Engine::with_seed(42);
//! engine.set_playouts(1000);
//! engine.play_move(41, Color::Black).unwrap();
//! engine.report_move(41);
//! match engine.generate_move(true) {
//!     GenMove::Play(p) => println!("reply at point {p}"),
//!     GenMove::Pass => println!("pass"),
//!     GenMove::Resign => println!("resign"),
//! }
//! ```

pub mod amaf;
pub mod board;
pub mod constants;
pub mod engine;
pub mod gtp;
pub mod group;
pub mod heuristics;
pub mod patterns;
pub mod playout;
pub mod priors;
pub mod topology;
pub mod tree;
pub mod zobrist;
