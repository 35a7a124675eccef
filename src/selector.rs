//! Move selection over the per-cell score surface.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::board::{Board, Point};
use crate::relevance;
use crate::threat::Evaluator;

/// Scores for one turn. Cells that were never scored hold `None`.
pub struct ScoreSurface {
    width: usize,
    height: usize,
    scores: Vec<Option<f64>>,
}

impl ScoreSurface {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            scores: vec![None; width * height],
        }
    }

    pub fn get(&self, p: Point) -> Option<f64> {
        if p.x >= self.width || p.y >= self.height {
            return None;
        }
        self.scores[p.y * self.width + p.x]
    }

    pub fn set(&mut self, p: Point, score: f64) {
        self.scores[p.y * self.width + p.x] = Some(score);
    }

    /// Every scored cell with its score, column by column.
    pub fn scored(&self) -> impl Iterator<Item = (Point, f64)> + '_ {
        (0..self.width)
            .flat_map(move |x| (0..self.height).map(move |y| Point::new(x, y)))
            .filter_map(move |p| self.get(p).map(|s| (p, s)))
    }

    /// Highest and lowest score, or `None` when nothing was scored.
    pub fn range(&self) -> Option<(f64, f64)> {
        self.scored().fold(None, |acc, (_, s)| match acc {
            None => Some((s, s)),
            Some((hi, lo)) => Some((hi.max(s), lo.min(s))),
        })
    }
}

/// Outcome of a completed selection.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Choice {
    /// One of the top-scoring cells.
    Best(Point),
    /// Nothing separates the candidates; the board center was taken.
    Center(Point),
}

impl Choice {
    pub fn point(self) -> Point {
        match self {
            Choice::Best(p) | Choice::Center(p) => p,
        }
    }
}

/// Score every relevant empty cell of `board`.
///
/// Returns `None` as soon as `cancel` is observed set.
pub fn score_surface(board: &Board, evaluator: &Evaluator, cancel: &AtomicBool) -> Option<ScoreSurface> {
    let mut surface = ScoreSurface::new(board.width(), board.height());
    for p in relevance::candidates(board, evaluator.radius()) {
        if cancel.load(Ordering::Relaxed) {
            return None;
        }
        surface.set(p, evaluator.score(board, p));
    }
    Some(surface)
}

/// Pick the cell to play, or `None` if cancelled first.
///
/// Ties between top-scoring cells are broken uniformly at random. When every
/// scored cell ties, including the empty-board case where nothing is scored,
/// the center is chosen if it is free.
pub fn select_move(
    board: &Board,
    evaluator: &Evaluator,
    cancel: &AtomicBool,
    rng: &mut fastrand::Rng,
) -> Option<Choice> {
    if cancel.load(Ordering::Relaxed) {
        return None;
    }
    let surface = score_surface(board, evaluator, cancel)?;
    let center = board.center();

    let tied = match surface.range() {
        None => true,
        Some((hi, lo)) => hi == lo,
    };
    if tied && board.is_free(center) {
        return Some(Choice::Center(center));
    }

    let best: Vec<Point> = match surface.range() {
        Some((hi, _)) => surface
            .scored()
            .filter(|&(_, s)| s == hi)
            .map(|(p, _)| p)
            .collect(),
        // Stones everywhere near the center and nothing relevant left.
        None => board.points().filter(|&p| board.is_free(p)).collect(),
    };
    if best.is_empty() {
        return Some(Choice::Center(center));
    }
    Some(Choice::Best(best[rng.usize(..best.len())]))
}
