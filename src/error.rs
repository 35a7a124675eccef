//! Error kinds reported by the engine.
//!
//! Every variant's `Display` is what follows `ERROR ` on the wire, so the
//! messages are kept short and lowercase.

use thiserror::Error;

use crate::board::Point;
use crate::constants::{MAX_BOARD, MIN_BOARD};

/// A board mutation that was refused. The board is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("{0} is outside the board")]
    OutOfBounds(Point),
    #[error("{0} is already occupied")]
    Occupied(Point),
    #[error("{0} is empty")]
    NotOccupied(Point),
}

/// A requested board size the engine cannot play on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SizeError {
    #[error("size of the board must be at least {MIN_BOARD}, got {0}x{1}")]
    TooSmall(usize, usize),
    #[error("Maximal board size is {MAX_BOARD}")]
    TooLarge(usize, usize),
}

/// A command line that could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("bad coordinates")]
    BadCoordinates,
    #[error("bad START parameter")]
    BadStart,
    #[error("bad RECTSTART parameters")]
    BadRectStart,
    #[error("bad value for INFO {key}: {value}")]
    BadInfoValue { key: String, value: String },
    #[error("x,y,who or DONE expected after BOARD")]
    BadBoardLine,
    #[error(transparent)]
    Size(#[from] SizeError),
}

/// A genome that cannot drive the scorer. Fatal at start-up.
#[derive(Debug, Error)]
pub enum GenomeError {
    #[error("genome is not a JSON array of numbers: {0}")]
    Json(#[from] serde_json::Error),
    #[error("genome needs at least one weight and an aggression value, got {0} values")]
    TooShort(usize),
    #[error("genome weight {index} must be finite and non-negative, got {value}")]
    BadWeight { index: usize, value: f64 },
    #[error("aggression must lie in [0, 1], got {0}")]
    BadAggression(f64),
}

/// The compute worker is no longer running.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("compute worker has stopped")]
pub struct WorkerGone;
