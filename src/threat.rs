//! Threat scoring for candidate cells.
//!
//! For each of the four axes the scorer walks outward from the candidate in
//! both senses, counting the player's stones and passing over empty cells,
//! until it leaves the board, meets a blocking cell, or has taken
//! `max_run_length - 1` steps. The resulting run length and openness index a
//! weight in the genome; the per-axis weights are summed. A run that reaches
//! [`WIN_LENGTH`] short-circuits to [`WIN_SCORE`].
//!
//! Two strategies share this primitive:
//! - [`Strategy::Heuristic`] blends the offensive and defensive threat at
//!   the cell by the genome's aggression.
//! - [`Strategy::Lookahead`] additionally plays the candidate and subtracts
//!   the opponent's best threat in the resulting position.

use crate::board::{Board, Cell, Player, Point};
use crate::constants::{AXES, MAX_RUN_LENGTH, RELEVANCE_RADIUS, WIN_LENGTH, WIN_SCORE};
use crate::genome::Genome;
use crate::relevance;

/// How candidate cells are valued.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Strategy {
    #[default]
    Heuristic,
    /// One-ply opponent reply lookahead.
    Lookahead,
}

/// Offensive, defensive, and combined value of one cell.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Breakdown {
    pub offense: f64,
    pub defense: f64,
    pub combined: f64,
}

/// One directional walk from the candidate.
struct Ray {
    stones: usize,
    /// Cells passed before the walk was stopped, if it was.
    stop: Option<usize>,
}

/// `weight * score`, where a zero weight cancels even a winning score.
fn weigh(weight: f64, score: f64) -> f64 {
    if weight == 0.0 { 0.0 } else { weight * score }
}

#[derive(Clone, Debug)]
pub struct Evaluator {
    genome: Genome,
    strategy: Strategy,
    max_run_length: usize,
    radius: usize,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new(Genome::default(), Strategy::default())
    }
}

impl Evaluator {
    pub fn new(genome: Genome, strategy: Strategy) -> Self {
        Self {
            genome,
            strategy,
            max_run_length: MAX_RUN_LENGTH,
            radius: RELEVANCE_RADIUS,
        }
    }

    /// Override the scan length (at least 2: the candidate and one neighbor).
    pub fn with_max_run_length(mut self, max_run_length: usize) -> Self {
        self.max_run_length = max_run_length.max(2);
        self
    }

    pub fn with_radius(mut self, radius: usize) -> Self {
        self.radius = radius;
        self
    }

    pub fn genome(&self) -> &Genome {
        &self.genome
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn radius(&self) -> usize {
        self.radius
    }

    pub fn max_run_length(&self) -> usize {
        self.max_run_length
    }

    fn scan(&self, board: &Board, from: Point, (dx, dy): (isize, isize), player: Player) -> Ray {
        let own = player.stone();
        let (mut x, mut y) = (from.x as isize, from.y as isize);
        let mut stones = 0;
        for k in 1..self.max_run_length {
            x += dx;
            y += dy;
            match board.at(x, y) {
                // A finished line neither counts nor blocks.
                Some(Cell::Empty | Cell::WinningBlock) => {}
                Some(cell) if cell == own => stones += 1,
                // Off the board or an opposing stone.
                _ => {
                    return Ray {
                        stones,
                        stop: Some(k - 1),
                    };
                }
            }
        }
        Ray { stones, stop: None }
    }

    /// Threat value of `p` if `player` were to own it. Never negative;
    /// [`WIN_SCORE`] exactly when some axis reaches a winning run.
    pub fn threat(&self, board: &Board, p: Point, player: Player) -> f64 {
        let mut value = 0.0;
        for &(dx, dy) in &AXES {
            let fwd = self.scan(board, p, (dx, dy), player);
            let back = self.scan(board, p, (-dx, -dy), player);

            // Walled in on both sides with no room for five.
            if let (Some(a), Some(b)) = (fwd.stop, back.stop) {
                if a + b + 1 < WIN_LENGTH {
                    continue;
                }
            }

            let run = 1 + fwd.stones + back.stones;
            if run >= WIN_LENGTH {
                return WIN_SCORE;
            }

            let blocked = fwd.stop.is_some() || back.stop.is_some();
            let bucket = if blocked { 2 * run - 2 } else { 2 * run - 1 };
            value += self.genome.weight(bucket);
        }
        value
    }

    /// Aggression-weighted blend of the offensive and defensive threat.
    pub fn breakdown(&self, board: &Board, p: Point) -> Breakdown {
        let aggression = self.genome.aggression();
        let offense = self.threat(board, p, Player::Me);
        let defense = self.threat(board, p, Player::Opponent);
        Breakdown {
            offense,
            defense,
            combined: weigh(aggression, offense) + weigh(1.0 - aggression, defense),
        }
    }

    /// Our threat at `p`, net of the opponent's best reply after we play it.
    fn lookahead(&self, board: &Board, p: Point) -> f64 {
        let aggression = self.genome.aggression();
        let ours = self.threat(board, p, Player::Me);
        if ours == WIN_SCORE {
            return WIN_SCORE;
        }

        let mut after = board.clone();
        if after.place(p, Player::Me.stone()).is_err() {
            return weigh(aggression, ours);
        }
        let best_reply = relevance::candidates(&after, self.radius)
            .into_iter()
            .map(|q| self.threat(&after, q, Player::Opponent))
            .fold(0.0, f64::max);

        weigh(aggression, ours) - weigh(1.0 - aggression, best_reply)
    }

    /// Value of playing `p` under the configured strategy.
    pub fn score(&self, board: &Board, p: Point) -> f64 {
        match self.strategy {
            Strategy::Heuristic => self.breakdown(board, p).combined,
            Strategy::Lookahead => self.lookahead(board, p),
        }
    }
}
