//! Scoring genome: bucket weights plus a trailing aggression scalar.
//!
//! A genome arrives once at start-up as a JSON array such as
//! `[8, 16, 32, 64, 128, 512, 1000, 2000, 0.5]` and never changes for the
//! lifetime of the process.

use std::str::FromStr;

use crate::constants::DEFAULT_GENOME;
use crate::error::GenomeError;

#[derive(Clone, Debug, PartialEq)]
pub struct Genome {
    weights: Vec<f64>,
    aggression: f64,
}

impl Default for Genome {
    fn default() -> Self {
        let last = DEFAULT_GENOME.len() - 1;
        Self {
            weights: DEFAULT_GENOME[..last].to_vec(),
            aggression: DEFAULT_GENOME[last],
        }
    }
}

impl Genome {
    /// Build a genome from a flat value list whose last entry is the aggression.
    pub fn from_values(values: &[f64]) -> Result<Self, GenomeError> {
        let Some((&aggression, weights)) = values.split_last() else {
            return Err(GenomeError::TooShort(0));
        };
        if weights.is_empty() {
            return Err(GenomeError::TooShort(values.len()));
        }
        if let Some((index, &value)) = weights
            .iter()
            .enumerate()
            .find(|&(_, w)| !w.is_finite() || *w < 0.0)
        {
            return Err(GenomeError::BadWeight { index, value });
        }
        if !(0.0..=1.0).contains(&aggression) {
            return Err(GenomeError::BadAggression(aggression));
        }
        Ok(Self {
            weights: weights.to_vec(),
            aggression,
        })
    }

    /// Weight of a bucket, clamped to the last bucket.
    pub fn weight(&self, bucket: usize) -> f64 {
        self.weights[bucket.min(self.weights.len() - 1)]
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn aggression(&self) -> f64 {
        self.aggression
    }
}

impl FromStr for Genome {
    type Err = GenomeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values: Vec<f64> = serde_json::from_str(s)?;
        Self::from_values(&values)
    }
}
