//! Constants for board capacity, scoring geometry, and the default genome.
//!
//! The board is pre-allocated at its maximum capacity once; a match only
//! uses the active sub-rectangle chosen by `START`/`RECTSTART`.
//!
//! # Board Capacity Configuration
//!
//! The capacity is controlled by Cargo features:
//! - `board100` (default): up to 100x100
//! - `board20`: up to 20x20
//!
//! ```sh
//! cargo build                                           # 100x100 capacity
//! cargo build --no-default-features --features board20  # 20x20 capacity
//! ```

// =============================================================================
// Board Geometry
// =============================================================================

/// Largest supported side length.
#[cfg(feature = "board100")]
pub const MAX_BOARD: usize = 100;

#[cfg(feature = "board20")]
pub const MAX_BOARD: usize = 20;

#[cfg(all(feature = "board20", feature = "board100"))]
compile_error!("Cannot enable both 'board20' and 'board100' features at the same time");

#[cfg(not(any(feature = "board20", feature = "board100")))]
compile_error!("Must enable exactly one board capacity feature: 'board20' or 'board100'");

/// Smallest side length a match may use.
pub const MIN_BOARD: usize = 5;

/// Side length assumed when a board command arrives before any `START`.
pub const DEFAULT_BOARD: usize = 20;

// =============================================================================
// Scoring Parameters
// =============================================================================

/// Stones in a row needed to win.
pub const WIN_LENGTH: usize = 5;

/// Default scan length along an axis, counting the candidate cell.
pub const MAX_RUN_LENGTH: usize = 5;

/// Default half-width of the relevance window (radius 4 is a 9x9 window).
pub const RELEVANCE_RADIUS: usize = 4;

/// Score of a move that completes a winning run.
pub const WIN_SCORE: f64 = f64::INFINITY;

/// The four board axes: vertical, diagonal, horizontal, anti-diagonal.
/// Each is scanned in both its positive and negative sense.
pub const AXES: [(isize, isize); 4] = [(0, 1), (1, 1), (1, 0), (1, -1)];

// =============================================================================
// Genome
// =============================================================================

/// Default weights, one per (run length x openness) bucket, followed by the
/// aggression scalar.
///
/// Bucket `2n - 2` is a blocked run of `n`, bucket `2n - 1` an open one.
pub const DEFAULT_GENOME: [f64; 9] = [8.0, 16.0, 32.0, 64.0, 128.0, 512.0, 1000.0, 2000.0, 0.5];
