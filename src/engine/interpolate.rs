//! Piecewise-linear interpolation over sparse empirical tables.
//!
//! Historical punt aggregates only exist at the field positions where punts
//! actually happened. An [`EmpiricalTable`] turns those points into a
//! continuous curve: linear between neighbouring keys, and extended beyond
//! the outermost keys along the slope of the edge segment.

use super::error::EngineError;

/// One metric sampled at a set of field positions.
#[derive(Debug, Clone, PartialEq)]
pub struct EmpiricalTable {
    name: String,
    /// Sorted by key, keys unique and finite.
    points: Vec<(f64, f64)>,
}

impl EmpiricalTable {
    /// Build a table from `(field_position, value)` pairs in any order.
    ///
    /// Non-finite pairs are dropped. When a key repeats, the first value seen
    /// is kept.
    pub fn new(name: impl Into<String>, points: impl IntoIterator<Item = (f64, f64)>) -> Self {
        let mut points: Vec<(f64, f64)> = points
            .into_iter()
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .collect();
        // Stable sort keeps first-seen order among equal keys.
        points.sort_by(|a, b| a.0.total_cmp(&b.0));
        points.dedup_by(|later, earlier| later.0 == earlier.0);
        EmpiricalTable {
            name: name.into(),
            points,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Interpolated (or extrapolated) value at `x`.
    ///
    /// Exact keys return their stored value. Fails only when the table has
    /// fewer than two distinct keys.
    pub fn interpolate(&self, x: f64) -> Result<f64, EngineError> {
        let n = self.points.len();
        if n < 2 {
            return Err(EngineError::DegenerateTable {
                table: self.name.clone(),
                keys: n,
            });
        }

        // Index of the first key >= x.
        let idx = self.points.partition_point(|(k, _)| *k < x);
        if idx < n && self.points[idx].0 == x {
            return Ok(self.points[idx].1);
        }

        // Segment [lo, lo + 1] that contains x, or the edge segment for
        // queries outside the key range.
        let lo = idx.saturating_sub(1).min(n - 2);
        let (x0, y0) = self.points[lo];
        let (x1, y1) = self.points[lo + 1];
        let slope = (y1 - y0) / (x1 - x0);
        Ok(y0 + (x - x0) * slope)
    }
}
