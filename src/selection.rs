//! Selectable dimension rows and the reducer that folds them into factor bounds.

use log::trace;
use serde::{Deserialize, Serialize};

use crate::data::{DimensionSummary, DimensionType};

/// Closed interval of multiplicative factors, `min <= max`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FactorRange {
    pub min: f64,
    pub max: f64,
}

impl FactorRange {
    /// The neutral range `[1.0, 1.0]`.
    pub const NEUTRAL: FactorRange = FactorRange { min: 1.0, max: 1.0 };

    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// A degenerate range holding a single factor.
    pub fn point(factor: f64) -> Self {
        Self {
            min: factor,
            max: factor,
        }
    }

    /// Bound-wise product of two ranges.
    ///
    /// Ordering is preserved as long as both ranges are ordered and non-negative.
    pub fn scale(self, other: FactorRange) -> Self {
        Self {
            min: self.min * other.min,
            max: self.max * other.max,
        }
    }
}

impl Default for FactorRange {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

impl From<&DimensionSummary> for FactorRange {
    fn from(summary: &DimensionSummary) -> Self {
        Self::new(summary.min, summary.max)
    }
}

/// A per-dimension record the user can toggle into the calculation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SelectionRow {
    pub dimension: DimensionType,
    /// Number of modifier values behind the limits.
    pub count: u32,
    /// Observed `[min, max]` factors of the dimension.
    pub limits: FactorRange,
    /// Whether the row took part in the most recent selection.
    pub selected: bool,
    /// Already applied by autopilot; never counted again through selection.
    pub implicit: bool,
}

impl SelectionRow {
    /// Derives an unselected row from a dimension summary.
    pub fn from_summary(summary: &DimensionSummary) -> Self {
        Self {
            dimension: summary.dimension,
            count: summary.count,
            limits: FactorRange::from(summary),
            selected: false,
            implicit: false,
        }
    }

    /// Marks the row as implicitly applied.
    pub fn into_implicit(mut self) -> Self {
        self.implicit = true;
        self
    }

    /// Label shown in the selection table.
    pub fn label(&self) -> &'static str {
        self.dimension.label()
    }
}

/// Multiplies the limits of every given row; an empty set yields [`FactorRange::NEUTRAL`].
///
/// Implicit rows are skipped since their factor is applied elsewhere.
pub fn reduce_selection(rows: &[SelectionRow]) -> FactorRange {
    let factors = rows
        .iter()
        .filter(|row| !row.implicit)
        .fold(FactorRange::NEUTRAL, |acc, row| acc.scale(row.limits));
    trace!(
        "reduced {} selected rows to factors [{}, {}]",
        rows.len(),
        factors.min,
        factors.max
    );
    factors
}
