//! Board model: a fixed-capacity grid with an active sub-rectangle.
//!
//! The grid is allocated once at [`MAX_BOARD`] x [`MAX_BOARD`]. Only cells
//! inside the active `width` x `height` rectangle are ever addressed; a
//! resize or reset clears that rectangle in place without reallocating.

use std::fmt;

use crate::constants::{MAX_BOARD, MIN_BOARD};
use crate::error::{BoardError, SizeError};

/// Contents of a single board cell.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Cell {
    #[default]
    Empty,
    Mine,
    Opponent,
    /// Part of an already completed line (continuous play).
    WinningBlock,
}

/// The side a run is evaluated for.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Player {
    Me,
    Opponent,
}

impl Player {
    /// The cell value this player's stones occupy.
    pub fn stone(self) -> Cell {
        match self {
            Player::Me => Cell::Mine,
            Player::Opponent => Cell::Opponent,
        }
    }

    pub fn other(self) -> Player {
        match self {
            Player::Me => Player::Opponent,
            Player::Opponent => Player::Me,
        }
    }
}

/// A board coordinate, written `x,y` on the wire.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: usize,
    pub y: usize,
}

impl Point {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

#[derive(Clone)]
pub struct Board {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// An unsized board. Every point is invalid until [`Board::resize`].
    pub fn new() -> Self {
        Self {
            width: 0,
            height: 0,
            cells: vec![Cell::Empty; MAX_BOARD * MAX_BOARD],
        }
    }

    pub fn with_size(width: usize, height: usize) -> Result<Self, SizeError> {
        let mut board = Self::new();
        board.resize(width, height)?;
        Ok(board)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    fn idx(&self, x: usize, y: usize) -> usize {
        y * MAX_BOARD + x
    }

    /// Set the active rectangle and clear it. On error the board is unchanged.
    pub fn resize(&mut self, width: usize, height: usize) -> Result<(), SizeError> {
        if width < MIN_BOARD || height < MIN_BOARD {
            return Err(SizeError::TooSmall(width, height));
        }
        if width > MAX_BOARD || height > MAX_BOARD {
            return Err(SizeError::TooLarge(width, height));
        }
        // Clear the old rectangle too so no stale stone survives a shrink-then-grow.
        self.reset();
        self.width = width;
        self.height = height;
        self.reset();
        Ok(())
    }

    /// Clear every cell of the active rectangle.
    pub fn reset(&mut self) {
        for y in 0..self.height {
            let start = self.idx(0, y);
            self.cells[start..start + self.width].fill(Cell::Empty);
        }
    }

    pub fn is_valid(&self, p: Point) -> bool {
        p.x < self.width && p.y < self.height
    }

    pub fn is_free(&self, p: Point) -> bool {
        self.get(p) == Some(Cell::Empty)
    }

    /// Cell at `p`, or `None` outside the active rectangle.
    pub fn get(&self, p: Point) -> Option<Cell> {
        if !self.is_valid(p) {
            return None;
        }
        Some(self.cells[self.idx(p.x, p.y)])
    }

    /// Signed lookup for directional scans that may step off the board.
    pub fn at(&self, x: isize, y: isize) -> Option<Cell> {
        if x < 0 || y < 0 {
            return None;
        }
        self.get(Point::new(x as usize, y as usize))
    }

    /// Put `cell` on an empty, in-bounds point.
    pub fn place(&mut self, p: Point, cell: Cell) -> Result<(), BoardError> {
        debug_assert_ne!(cell, Cell::Empty, "use clear() to empty a cell");
        match self.get(p) {
            None => Err(BoardError::OutOfBounds(p)),
            Some(Cell::Empty) => {
                let i = self.idx(p.x, p.y);
                self.cells[i] = cell;
                Ok(())
            }
            Some(_) => Err(BoardError::Occupied(p)),
        }
    }

    /// Take back whatever occupies `p`.
    pub fn clear(&mut self, p: Point) -> Result<(), BoardError> {
        match self.get(p) {
            None => Err(BoardError::OutOfBounds(p)),
            Some(Cell::Empty) => Err(BoardError::NotOccupied(p)),
            Some(_) => {
                let i = self.idx(p.x, p.y);
                self.cells[i] = Cell::Empty;
                Ok(())
            }
        }
    }

    /// Geometric center of the active rectangle.
    pub fn center(&self) -> Point {
        Point::new(self.width / 2, self.height / 2)
    }

    /// All points of the active rectangle, column by column.
    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        (0..self.width).flat_map(move |x| (0..self.height).map(move |y| Point::new(x, y)))
    }

    /// Number of non-empty cells.
    pub fn stones(&self) -> usize {
        self.points().filter(|&p| !self.is_free(p)).count()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.height {
            for x in 0..self.width {
                let ch = match self.cells[self.idx(x, y)] {
                    Cell::Mine => 'X',
                    Cell::Opponent => 'O',
                    Cell::WinningBlock => '#',
                    Cell::Empty => '.',
                };
                write!(f, "{ch} ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
