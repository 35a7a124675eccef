//! Threat-Brain: a single-ply Gomoku engine for tournament managers.
//!
//! The engine keeps the match position, answers the manager's line protocol
//! on stdin/stdout, and computes each move on a background worker that can
//! be cancelled mid-turn.
//!
//! ## Modules
//!
//! - [`constants`] - Board capacity and scoring parameters
//! - [`board`] - Board model with active sub-rectangle
//! - [`config`] - Match settings from `INFO` commands
//! - [`genome`] - Scoring weights and aggression
//! - [`relevance`] - Neighborhood filter for candidate cells
//! - [`threat`] - Directional threat scoring and evaluation strategies
//! - [`selector`] - Score surface and move choice
//! - [`worker`] - Cancellable background computation
//! - [`protocol`] - Command state machine
//! - [`output`] - Shared response sink
//! - [`error`] - Error kinds
//!
//! ## Example
//!
//! ```
//! use std::sync::atomic::AtomicBool;
//! use threat_brain::board::{Board, Cell, Point};
//! use threat_brain::selector::select_move;
//! use threat_brain::threat::Evaluator;
//!
//! let mut board = Board::with_size(20, 20).unwrap();
//! board.place(Point::new(10, 10), Cell::Opponent).unwrap();
//!
//! let choice = select_move(
//!     &board,
//!     &Evaluator::default(),
//!     &AtomicBool::new(false),
//!     &mut fastrand::Rng::with_seed(1),
//! )
//! .unwrap();
//! assert!(board.is_free(choice.point()));
//! ```

pub mod board;
pub mod config;
pub mod constants;
pub mod error;
pub mod genome;
pub mod output;
pub mod protocol;
pub mod relevance;
pub mod selector;
pub mod threat;
pub mod worker;
