//! Relevance filter: which cells are near enough to a stone to be worth scoring.
//!
//! A cell is relevant when the `(2r + 1) x (2r + 1)` window centered on it
//! holds at least one stone of any kind. The window sums come from a
//! summed-area table, so the whole mask costs one pass over the board.

use crate::board::{Board, Cell, Point};

/// Per-cell relevance for one board snapshot.
pub struct RelevanceMask {
    width: usize,
    height: usize,
    relevant: Vec<bool>,
}

impl RelevanceMask {
    /// Compute the mask for `board` with neighborhood radius `radius`.
    pub fn compute(board: &Board, radius: usize) -> Self {
        let (w, h) = (board.width(), board.height());

        // sums[(y * (w + 1)) + x] = stones in columns [0, x) and rows [0, y).
        let stride = w + 1;
        let mut sums = vec![0u32; stride * (h + 1)];
        for y in 0..h {
            let mut row = 0;
            for x in 0..w {
                if board.get(Point::new(x, y)) != Some(Cell::Empty) {
                    row += 1;
                }
                sums[(y + 1) * stride + x + 1] = sums[y * stride + x + 1] + row;
            }
        }

        let mut relevant = vec![false; w * h];
        for y in 0..h {
            let y0 = y.saturating_sub(radius);
            let y1 = y.saturating_add(radius).saturating_add(1).min(h);
            for x in 0..w {
                let x0 = x.saturating_sub(radius);
                let x1 = x.saturating_add(radius).saturating_add(1).min(w);
                let count = sums[y1 * stride + x1] + sums[y0 * stride + x0]
                    - sums[y0 * stride + x1]
                    - sums[y1 * stride + x0];
                relevant[y * w + x] = count != 0;
            }
        }

        Self {
            width: w,
            height: h,
            relevant,
        }
    }

    pub fn is_relevant(&self, p: Point) -> bool {
        p.x < self.width && p.y < self.height && self.relevant[p.y * self.width + p.x]
    }

    /// Number of relevant cells, occupied ones included.
    pub fn count(&self) -> usize {
        self.relevant.iter().filter(|&&r| r).count()
    }
}

/// Empty cells eligible for scoring.
pub fn candidates(board: &Board, radius: usize) -> Vec<Point> {
    let mask = RelevanceMask::compute(board, radius);
    board
        .points()
        .filter(|&p| mask.is_relevant(p) && board.is_free(p))
        .collect()
}
