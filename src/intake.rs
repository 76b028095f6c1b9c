//! Input normalization and the current/legacy dispatch of the source dimension.

use serde::{Deserialize, Serialize};

use crate::data::{
    parse_percent, percent_to_factor, BidInputs, BidModifier, BiddingType, Currency,
    DimensionSummary, DimensionType,
};
use crate::options::ComputationMode;
use crate::selection::SelectionRow;

/// Canonical form of a [`BidInputs`] snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NormalizedInputs {
    /// Edited modifier with its factor always set.
    pub modifier: BidModifier,
    /// Unit of the base bid.
    pub bidding_type: BiddingType,
    /// Base bid as entered, not yet parsed.
    pub bid: Option<String>,
    /// Account currency, if known.
    pub currency: Option<Currency>,
    /// Fraction digits used for display, if known.
    pub precision: Option<u32>,
    /// Whether the autopilot state is anything but inactive.
    pub autopilot: bool,
    /// One row per dimension type other than the edited one.
    pub rows: Vec<SelectionRow>,
    /// Source summary applied implicitly under autopilot, if any.
    pub source_summary: Option<DimensionSummary>,
}

impl NormalizedInputs {
    /// Factor of the edited modifier after normalization.
    pub fn modifier_factor(&self) -> f64 {
        self.modifier.factor()
    }

    /// Type of the edited dimension.
    pub fn edited_dimension(&self) -> DimensionType {
        self.modifier.dimension
    }
}

/// Resolves the edited factor: a percent override wins over the stored modifier.
///
/// Overrides below `-100%` are clamped to a zero factor.
pub fn resolve_factor(modifier: &BidModifier, percent_override: Option<&str>) -> f64 {
    match percent_override {
        Some(percent) => percent_to_factor(parse_percent(percent)).max(0.0),
        None => modifier.factor(),
    }
}

/// Drops the summary of the edited dimension; it is represented by the modifier itself.
pub fn exclude_edited(
    summaries: &[DimensionSummary],
    edited: DimensionType,
) -> Vec<DimensionSummary> {
    summaries
        .iter()
        .filter(|summary| summary.dimension != edited)
        .cloned()
        .collect()
}

/// Normalizes a snapshot for the given computation mode.
pub fn normalize(inputs: &BidInputs, mode: ComputationMode) -> NormalizedInputs {
    let autopilot = inputs.autopilot_state.is_active();
    let factor = resolve_factor(&inputs.modifier, inputs.percent_override.as_deref());
    let modifier = BidModifier {
        modifier: Some(factor),
        ..inputs.modifier.clone()
    };

    let remaining = exclude_edited(&inputs.summaries, modifier.dimension);
    let (rows, source_summary) = match mode {
        ComputationMode::Current => split_current(remaining, autopilot),
        ComputationMode::Legacy => split_legacy(remaining, autopilot),
    };

    NormalizedInputs {
        modifier,
        bidding_type: inputs.bidding_type,
        bid: inputs.bid.clone(),
        currency: inputs.currency,
        precision: inputs.precision,
        autopilot,
        rows,
        source_summary,
    }
}

/// Source stays in the row list; under autopilot its row is flagged implicit.
///
/// The edited summary is already gone, so a source summary left here means
/// the edited dimension is not source.
fn split_current(
    remaining: Vec<DimensionSummary>,
    autopilot: bool,
) -> (Vec<SelectionRow>, Option<DimensionSummary>) {
    let source_summary = if autopilot {
        remaining
            .iter()
            .find(|summary| summary.dimension.is_source())
            .cloned()
    } else {
        None
    };

    let rows = remaining
        .iter()
        .map(|summary| {
            let row = SelectionRow::from_summary(summary);
            if source_summary.is_some() && summary.dimension.is_source() {
                row.into_implicit()
            } else {
                row
            }
        })
        .collect();
    (rows, source_summary)
}

/// Under autopilot the source summary is pulled out of the selectable set entirely.
fn split_legacy(
    mut remaining: Vec<DimensionSummary>,
    autopilot: bool,
) -> (Vec<SelectionRow>, Option<DimensionSummary>) {
    let source_summary = if autopilot {
        remaining
            .iter()
            .position(|summary| summary.dimension.is_source())
            .map(|index| remaining.remove(index))
    } else {
        None
    };
    let rows = remaining.iter().map(SelectionRow::from_summary).collect();
    (rows, source_summary)
}
