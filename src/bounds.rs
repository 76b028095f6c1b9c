//! Bound calculator: combines the edited factor, the selection and the implicit
//! source factor into a final `[min, max]` bid.
//!
//! Two formulas coexist. [`compute_current`] clamps the autopilot minimum to a
//! nominal floor, [`compute_legacy`] reports the arithmetic minimum. They are kept
//! as separate functions on purpose and share only the arithmetic helpers.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::data::{factor_to_percent, parse_amount, Currency, DimensionSummary, DimensionType};
use crate::formatting::CurrencyFormatter;
use crate::options::ComputationMode;
use crate::selection::FactorRange;

/// Everything the calculator reads from the held state.
#[derive(Clone, Copy, Debug)]
pub struct BoundInputs<'a> {
    /// Normalized factor of the edited modifier.
    pub modifier_factor: f64,
    pub edited: DimensionType,
    pub bid: Option<&'a str>,
    pub autopilot: bool,
    /// Product of the selected rows' limits.
    pub factors: FactorRange,
    pub source_summary: Option<&'a DimensionSummary>,
}

/// Final bid bounds in currency units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BidBounds {
    pub min: f64,
    pub max: f64,
}

/// Formatted bounds as exposed on the computation state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedBounds {
    pub computed_bid_min: String,
    pub computed_bid_max: String,
    /// `"<min> - <max>"`.
    pub final_bid_range_value: String,
}

/// Edited factor, times the implicit source range under autopilot, times the selection.
pub fn combined_factors(inputs: &BoundInputs<'_>) -> FactorRange {
    let mut base = FactorRange::point(inputs.modifier_factor);
    if inputs.autopilot && !inputs.edited.is_source() {
        if let Some(source) = inputs.source_summary {
            base = base.scale(FactorRange::from(source));
        }
    }
    base.scale(inputs.factors)
}

/// Applies a factor to a bid through its percent delta.
pub fn adjust_bid(bid: f64, factor: f64) -> f64 {
    let percent = factor_to_percent(factor);
    bid * (percent + 100.0) / 100.0
}

fn arithmetic_bounds(inputs: &BoundInputs<'_>) -> Option<BidBounds> {
    let bid = parse_amount(inputs.bid?);
    let factors = combined_factors(inputs);
    Some(BidBounds {
        min: adjust_bid(bid, factors.min),
        max: adjust_bid(bid, factors.max),
    })
}

/// A ceiling is known when it is a finite, strictly positive amount.
fn ceiling_known(max: f64) -> bool {
    max.is_finite() && max > 0.0
}

/// Current formula: under autopilot the minimum is forced to `floor`.
///
/// Returns `None` when the bid is unset, or under autopilot when no ceiling is known.
pub fn compute_current(inputs: &BoundInputs<'_>, floor: f64) -> Option<BidBounds> {
    let bounds = arithmetic_bounds(inputs)?;
    if !inputs.autopilot {
        return Some(bounds);
    }
    if !ceiling_known(bounds.max) {
        debug!("autopilot ceiling not derivable (max {}), suppressing range", bounds.max);
        return None;
    }
    Some(BidBounds {
        min: floor,
        max: bounds.max,
    })
}

/// Legacy formula: same arithmetic and abort rule, but the true minimum is reported.
pub fn compute_legacy(inputs: &BoundInputs<'_>) -> Option<BidBounds> {
    let bounds = arithmetic_bounds(inputs)?;
    if inputs.autopilot && !ceiling_known(bounds.max) {
        debug!("autopilot ceiling not derivable (max {}), suppressing range", bounds.max);
        return None;
    }
    Some(bounds)
}

/// Dispatches to the formula of the given mode.
pub fn compute_bounds(
    mode: ComputationMode,
    inputs: &BoundInputs<'_>,
    floor: f64,
) -> Option<BidBounds> {
    match mode {
        ComputationMode::Current => compute_current(inputs, floor),
        ComputationMode::Legacy => compute_legacy(inputs),
    }
}

/// Formats both bounds, or returns `None` while currency or precision is unknown.
pub fn format_bounds<F: CurrencyFormatter + ?Sized>(
    bounds: BidBounds,
    currency: Option<Currency>,
    precision: Option<u32>,
    formatter: &F,
) -> Option<FormattedBounds> {
    let currency = currency?;
    let precision = precision?;
    let computed_bid_min = formatter.format(bounds.min, currency, precision);
    let computed_bid_max = formatter.format(bounds.max, currency, precision);
    let final_bid_range_value = format!("{computed_bid_min} - {computed_bid_max}");
    Some(FormattedBounds {
        computed_bid_min,
        computed_bid_max,
        final_bid_range_value,
    })
}
