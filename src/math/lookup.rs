#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// Maximum number of (x, y) pairs a lookup table may hold
pub const MAX_LOOKUP_PAIRS: usize = 8;

/// A small piecewise-linear graph of y against ascending x
///
/// Used for engine torque against normalized engine speed and for steer
/// scaling against forward speed. Queries outside the stored range clamp
/// to the first or last y value.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct LookupTable {
    /// Ascending sample positions
    xs: Vec<f32>,

    /// Sample values
    ys: Vec<f32>,
}

impl LookupTable {
    /// Creates an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a table from (x, y) pairs
    pub fn from_pairs(pairs: &[(f32, f32)]) -> Self {
        let mut table = Self::new();
        for &(x, y) in pairs {
            table.add_pair(x, y);
        }
        table
    }

    /// Appends a pair, silently ignoring pairs past capacity
    pub fn add_pair(&mut self, x: f32, y: f32) {
        if self.xs.len() >= MAX_LOOKUP_PAIRS {
            log::warn!("lookup table full, dropping pair ({}, {})", x, y);
            return;
        }
        self.xs.push(x);
        self.ys.push(y);
    }

    /// Removes all pairs
    pub fn clear(&mut self) {
        self.xs.clear();
        self.ys.clear();
    }

    /// Returns the number of stored pairs
    pub fn len(&self) -> usize {
        self.xs.len()
    }

    /// Returns true if the table has no pairs
    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    /// Returns the stored pairs
    pub fn pairs(&self) -> impl Iterator<Item = (f32, f32)> + '_ {
        self.xs.iter().copied().zip(self.ys.iter().copied())
    }

    /// Returns true if x values are strictly ascending
    pub fn is_ascending(&self) -> bool {
        self.xs.windows(2).all(|w| w[0] < w[1])
    }

    /// Evaluates the graph at `x`
    ///
    /// An empty table evaluates to zero.
    pub fn evaluate(&self, x: f32) -> f32 {
        let n = self.xs.len();
        if n == 0 {
            return 0.0;
        }
        if x <= self.xs[0] {
            return self.ys[0];
        }
        if x >= self.xs[n - 1] {
            return self.ys[n - 1];
        }

        let mut i = 1;
        while i < n && x > self.xs[i] {
            i += 1;
        }
        let (x0, x1) = (self.xs[i - 1], self.xs[i]);
        let (y0, y1) = (self.ys[i - 1], self.ys[i]);
        y0 + (y1 - y0) * (x - x0) / (x1 - x0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluate_clamps_and_interpolates() {
        let table = LookupTable::from_pairs(&[(0.0, 0.8), (0.33, 1.0), (1.0, 0.8)]);
        assert_eq!(table.evaluate(-1.0), 0.8);
        assert_eq!(table.evaluate(2.0), 0.8);
        assert!((table.evaluate(0.33) - 1.0).abs() < 1e-6);
        assert!((table.evaluate(0.665) - 0.9).abs() < 1e-4);
    }

    #[test]
    fn test_capacity() {
        let mut table = LookupTable::new();
        for i in 0..12 {
            table.add_pair(i as f32, 1.0);
        }
        assert_eq!(table.len(), MAX_LOOKUP_PAIRS);
        assert!(table.is_ascending());
    }
}
