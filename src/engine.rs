//! Reactive state container tying intake, selection, bounds and messages together.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::bounds::{compute_bounds, format_bounds, BidBounds, BoundInputs};
use crate::data::{BidInputs, DimensionType};
use crate::formatting::{CurrencyFormatter, StandardCurrencyFormatter};
use crate::intake::{normalize, NormalizedInputs};
use crate::messages::{
    bid_message, final_bid_range_message, formatted_bid_value_range, info_message,
    selection_tooltip_message, BidValueInputs, MessageContext,
};
use crate::options::{ComputationMode, EngineOptions};
use crate::selection::{reduce_selection, FactorRange, SelectionRow};

/// Immutable snapshot of everything derived from the latest inputs and selection.
///
/// Derived fields are `None` until they are computable: before the first
/// [`BidRangeEngine::update_inputs`], while bid, currency or precision is unset,
/// or under autopilot when no ceiling is known.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComputationState {
    /// Normalized inputs the snapshot was derived from.
    pub inputs: Option<NormalizedInputs>,
    pub min_factor: f64,
    pub max_factor: f64,
    pub autopilot: bool,
    /// Unformatted bounds, kept for callers that need the numbers.
    pub bounds: Option<BidBounds>,
    pub computed_bid_min: Option<String>,
    pub computed_bid_max: Option<String>,
    pub final_bid_range_value: Option<String>,
    pub info_message: Option<String>,
    pub bid_message: Option<String>,
    pub formatted_bid_value_range: Option<String>,
    pub selection_tooltip_message: Option<String>,
    pub final_bid_range_message: Option<String>,
}

impl Default for ComputationState {
    fn default() -> Self {
        Self {
            inputs: None,
            min_factor: 1.0,
            max_factor: 1.0,
            autopilot: false,
            bounds: None,
            computed_bid_min: None,
            computed_bid_max: None,
            final_bid_range_value: None,
            info_message: None,
            bid_message: None,
            formatted_bid_value_range: None,
            selection_tooltip_message: None,
            final_bid_range_message: None,
        }
    }
}

impl ComputationState {
    /// Selectable rows of the latest inputs, empty before the first intake.
    pub fn rows(&self) -> &[SelectionRow] {
        self.inputs
            .as_ref()
            .map(|inputs| inputs.rows.as_slice())
            .unwrap_or(&[])
    }

    /// Selection factors as a range.
    pub fn factors(&self) -> FactorRange {
        FactorRange::new(self.min_factor, self.max_factor)
    }
}

/// Holds one bid-editing session's state and recomputes it on every update.
///
/// Each update builds a complete [`ComputationState`] and swaps it in, so a
/// reader never sees fields derived from different inputs.
#[derive(Debug)]
pub struct BidRangeEngine<F = StandardCurrencyFormatter> {
    options: EngineOptions,
    formatter: F,
    state: ComputationState,
}

impl BidRangeEngine<StandardCurrencyFormatter> {
    /// Creates an engine with the standard currency formatter.
    pub fn new(options: EngineOptions) -> Self {
        Self::with_formatter(options, StandardCurrencyFormatter)
    }

    /// Creates an engine that uses the current formula.
    pub fn current() -> Self {
        Self::new(EngineOptions::default())
    }

    /// Creates an engine that uses the legacy formula.
    pub fn legacy() -> Self {
        Self::new(EngineOptions::legacy())
    }
}

impl<F: CurrencyFormatter> BidRangeEngine<F> {
    /// Creates an engine with a custom formatter.
    pub fn with_formatter(options: EngineOptions, formatter: F) -> Self {
        Self {
            options,
            formatter,
            state: ComputationState::default(),
        }
    }

    /// Computation mode, fixed at construction.
    pub fn mode(&self) -> ComputationMode {
        self.options.mode
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Read-only view of the latest snapshot.
    pub fn state(&self) -> &ComputationState {
        &self.state
    }

    /// Owned copy of the latest snapshot.
    pub fn snapshot(&self) -> ComputationState {
        self.state.clone()
    }

    /// Normalizes a new input snapshot and recomputes the whole state.
    ///
    /// Rows are regenerated unselected; the current selection factors are kept.
    pub fn update_inputs(&mut self, inputs: &BidInputs) {
        let normalized = normalize(inputs, self.options.mode);
        let factors = self.state.factors();
        self.state = self.derive(normalized, factors);
    }

    /// Replaces the selection with `rows` and recomputes the bounds.
    ///
    /// Every given row counts as selected; rows not in the list do not contribute.
    /// While the source summary applies implicitly, source rows are ignored so the
    /// source factor is counted once.
    pub fn update_selected_rows(&mut self, rows: &[SelectionRow]) {
        match self.state.inputs.clone() {
            Some(mut normalized) => {
                let implicit_source = normalized.source_summary.is_some();
                let counted: Vec<SelectionRow> = rows
                    .iter()
                    .filter(|row| !(implicit_source && row.dimension.is_source()))
                    .cloned()
                    .collect();
                let factors = reduce_selection(&counted);
                for row in &mut normalized.rows {
                    row.selected = !row.implicit
                        && counted.iter().any(|picked| picked.dimension == row.dimension);
                }
                self.state = self.derive(normalized, factors);
            }
            None => {
                let factors = reduce_selection(rows);
                self.state = ComputationState {
                    min_factor: factors.min,
                    max_factor: factors.max,
                    ..ComputationState::default()
                };
            }
        }
    }

    /// Selects the held rows whose dimension is listed. Implicit rows are never selected.
    pub fn select_dimensions(&mut self, dimensions: &[DimensionType]) {
        let rows: Vec<SelectionRow> = self
            .state
            .rows()
            .iter()
            .filter(|row| !row.implicit && dimensions.contains(&row.dimension))
            .cloned()
            .collect();
        self.update_selected_rows(&rows);
    }

    fn derive(&self, normalized: NormalizedInputs, factors: FactorRange) -> ComputationState {
        let mode = self.options.mode;
        let context = MessageContext {
            bidding_type: normalized.bidding_type,
            autopilot: normalized.autopilot,
            edited: normalized.edited_dimension(),
            mode,
        };

        let bound_inputs = BoundInputs {
            modifier_factor: normalized.modifier_factor(),
            edited: normalized.edited_dimension(),
            bid: normalized.bid.as_deref(),
            autopilot: normalized.autopilot,
            factors,
            source_summary: normalized.source_summary.as_ref(),
        };
        let bounds = compute_bounds(mode, &bound_inputs, self.options.autopilot_floor);
        let formatted = bounds.and_then(|bounds| {
            format_bounds(
                bounds,
                normalized.currency,
                normalized.precision,
                &self.formatter,
            )
        });

        let value_inputs = BidValueInputs {
            bid: normalized.bid.as_deref(),
            currency: normalized.currency,
            precision: normalized.precision,
            modifier_factor: normalized.modifier_factor(),
            source_summary: normalized.source_summary.as_ref(),
            autopilot_floor: self.options.autopilot_floor,
        };
        let formatted_bid_value_range =
            formatted_bid_value_range(context, value_inputs, &self.formatter);

        debug!(
            "recomputed bid range: mode={:?} autopilot={} factors=[{}, {}] range={:?}",
            mode,
            normalized.autopilot,
            factors.min,
            factors.max,
            formatted.as_ref().map(|f| f.final_bid_range_value.as_str())
        );

        let (computed_bid_min, computed_bid_max, final_bid_range_value) = match formatted {
            Some(formatted) => (
                Some(formatted.computed_bid_min),
                Some(formatted.computed_bid_max),
                Some(formatted.final_bid_range_value),
            ),
            None => (None, None, None),
        };

        ComputationState {
            min_factor: factors.min,
            max_factor: factors.max,
            autopilot: normalized.autopilot,
            bounds,
            computed_bid_min,
            computed_bid_max,
            final_bid_range_value,
            info_message: Some(info_message(context.bidding_type, context.autopilot)),
            bid_message: Some(bid_message(context)),
            formatted_bid_value_range,
            selection_tooltip_message: Some(selection_tooltip_message(context.bidding_type)),
            final_bid_range_message: Some(final_bid_range_message(context.bidding_type)),
            inputs: Some(normalized),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{AutopilotState, BidModifier, BiddingType, Currency, DimensionSummary};

    /// Renders amounts as plain numbers followed by the currency code.
    struct CodeSuffixFormatter;

    impl CurrencyFormatter for CodeSuffixFormatter {
        fn format(&self, amount: f64, currency: Currency, fraction_digits: u32) -> String {
            format!("{:.*} {}", fraction_digits as usize, amount, currency.code())
        }
    }

    fn inputs(autopilot: AutopilotState) -> BidInputs {
        BidInputs::builder(
            BidModifier::new(DimensionType::Device, "MOBILE", 1.1),
            BiddingType::Cpc,
        )
        .bid("1.0")
        .summaries(vec![
            DimensionSummary::new(DimensionType::Device, 3, 0.9, 1.1).unwrap(),
            DimensionSummary::new(DimensionType::Source, 4, 0.8, 1.2).unwrap(),
        ])
        .currency(Currency::Usd)
        .precision(4)
        .autopilot(autopilot)
        .build()
        .unwrap()
    }

    #[test]
    fn fresh_engine_has_neutral_factors_and_no_output() {
        let engine = BidRangeEngine::current();
        assert_eq!(engine.state().factors(), FactorRange::NEUTRAL);
        assert!(engine.state().final_bid_range_value.is_none());
        assert!(engine.state().rows().is_empty());
    }

    #[test]
    fn selection_before_inputs_is_kept_for_intake() {
        let mut engine = BidRangeEngine::current();
        let row = SelectionRow::from_summary(
            &DimensionSummary::new(DimensionType::Country, 1, 0.5, 2.0).unwrap(),
        );
        engine.update_selected_rows(&[row]);
        engine.update_inputs(&inputs(AutopilotState::Inactive));
        assert_eq!(engine.state().factors(), FactorRange::new(0.5, 2.0));
        assert_eq!(
            engine.state().final_bid_range_value.as_deref(),
            Some("$0.5500 - $2.2000")
        );
    }

    #[test]
    fn selection_flags_follow_last_selection() {
        let mut engine = BidRangeEngine::current();
        engine.update_inputs(&inputs(AutopilotState::Inactive));
        engine.select_dimensions(&[DimensionType::Source]);
        assert!(engine.state().rows().iter().all(|row| row.selected));
        engine.select_dimensions(&[]);
        assert!(engine.state().rows().iter().all(|row| !row.selected));
        assert_eq!(engine.state().factors(), FactorRange::NEUTRAL);
    }

    #[test]
    fn intake_regenerates_rows_but_keeps_factors() {
        let mut engine = BidRangeEngine::current();
        engine.update_inputs(&inputs(AutopilotState::Inactive));
        engine.select_dimensions(&[DimensionType::Source]);
        engine.update_inputs(&inputs(AutopilotState::Inactive));
        assert!(engine.state().rows().iter().all(|row| !row.selected));
        assert_eq!(engine.state().factors(), FactorRange::new(0.8, 1.2));
    }

    #[test]
    fn autopilot_current_reports_floor() {
        let mut engine = BidRangeEngine::current();
        engine.update_inputs(&inputs(AutopilotState::ActiveBid));
        let state = engine.state();
        assert!(state.autopilot);
        assert_eq!(state.computed_bid_min.as_deref(), Some("$0.0001"));
        assert_eq!(state.computed_bid_max.as_deref(), Some("$1.3200"));
        assert_eq!(state.bid_message.as_deref(), Some("Autopilot bid CPC range:"));
        assert_eq!(
            state.formatted_bid_value_range.as_deref(),
            Some("$0.0001 - $1.0000")
        );
    }

    #[test]
    fn autopilot_legacy_reports_arithmetic_minimum() {
        let mut engine = BidRangeEngine::legacy();
        engine.update_inputs(&inputs(AutopilotState::ActiveBid));
        let state = engine.state();
        assert_eq!(state.final_bid_range_value.as_deref(), Some("$0.8800 - $1.3200"));
        assert_eq!(
            state.bid_message.as_deref(),
            Some("Autopilot media source bid CPC range:")
        );
        assert_eq!(
            state.formatted_bid_value_range.as_deref(),
            Some("$0.8000 - $1.2000")
        );
        assert!(state.rows().is_empty());
    }

    #[test]
    fn caller_built_source_row_is_not_counted_twice() {
        let mut engine = BidRangeEngine::current();
        engine.update_inputs(&BidInputs {
            modifier: BidModifier::new(DimensionType::Device, "MOBILE", 1.0),
            ..inputs(AutopilotState::ActiveBid)
        });
        assert_eq!(engine.state().computed_bid_max.as_deref(), Some("$1.2000"));

        let source = DimensionSummary::new(DimensionType::Source, 4, 0.8, 1.2).unwrap();
        engine.update_selected_rows(&[SelectionRow::from_summary(&source)]);
        assert_eq!(engine.state().factors(), FactorRange::NEUTRAL);
        assert_eq!(engine.state().computed_bid_max.as_deref(), Some("$1.2000"));
        assert!(engine.state().rows().iter().all(|row| !row.selected));
    }

    #[test]
    fn implicit_source_row_is_never_flagged_selected() {
        let mut engine = BidRangeEngine::current();
        engine.update_inputs(&inputs(AutopilotState::ActiveBid));
        engine.select_dimensions(&[DimensionType::Source]);
        let source_row = &engine.state().rows()[0];
        assert!(source_row.implicit);
        assert!(!source_row.selected);
        assert_eq!(engine.state().factors(), FactorRange::NEUTRAL);
    }

    #[test]
    fn custom_formatter_renders_every_amount() {
        let mut engine =
            BidRangeEngine::with_formatter(EngineOptions::default(), CodeSuffixFormatter);
        engine.update_inputs(&inputs(AutopilotState::Inactive));
        let state = engine.state();
        assert_eq!(state.final_bid_range_value.as_deref(), Some("1.1000 USD - 1.1000 USD"));
        assert_eq!(state.formatted_bid_value_range.as_deref(), Some("1.0000 USD"));
    }
}
