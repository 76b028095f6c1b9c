//! Human-readable labels derived from the computation state.

use crate::data::{parse_amount, BiddingType, Currency, DimensionSummary, DimensionType};
use crate::formatting::CurrencyFormatter;
use crate::options::ComputationMode;

/// The state fields every message template is keyed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MessageContext {
    /// Unit named verbatim in every template.
    pub bidding_type: BiddingType,
    /// Whether the ad group runs on autopilot.
    pub autopilot: bool,
    /// Dimension of the edited modifier.
    pub edited: DimensionType,
    /// Formula the owning engine was created with.
    pub mode: ComputationMode,
}

/// Explains how the final bid is derived, with separate autopilot and manual wording.
pub fn info_message(bidding_type: BiddingType, autopilot: bool) -> String {
    if autopilot {
        format!(
            "Autopilot sets the base {bidding_type} bid. The final bid range shows how far \
             the bid modifier and the selected dimensions can move the autopilot bid."
        )
    } else {
        format!(
            "The final {bidding_type} bid is the base bid adjusted by this bid modifier and \
             by the modifiers of the selected dimensions."
        )
    }
}

/// Label placed before the base bid value, e.g. `"Bid CPC:"`.
pub fn bid_message(context: MessageContext) -> String {
    let unit = context.bidding_type;
    match (context.autopilot, context.mode) {
        (false, _) => format!("Bid {unit}:"),
        (true, ComputationMode::Current) => format!("Autopilot bid {unit} range:"),
        (true, ComputationMode::Legacy) if context.edited.is_source() => {
            format!("Autopilot media source bid {unit}:")
        }
        (true, ComputationMode::Legacy) => format!("Autopilot media source bid {unit} range:"),
    }
}

/// Label placed before the final range value.
pub fn final_bid_range_message(bidding_type: BiddingType) -> String {
    format!("Final {bidding_type} bid range:")
}

/// Tooltip of the dimension selection table.
pub fn selection_tooltip_message(bidding_type: BiddingType) -> String {
    format!(
        "Select the dimensions whose bid modifiers should be included in the final \
         {bidding_type} bid range."
    )
}

/// Inputs for [`formatted_bid_value_range`].
#[derive(Clone, Copy, Debug)]
pub struct BidValueInputs<'a> {
    /// Base bid as entered; non-numeric values count as `0.0`.
    pub bid: Option<&'a str>,
    pub currency: Option<Currency>,
    /// Fraction digits passed to the formatter.
    pub precision: Option<u32>,
    /// Normalized factor of the edited modifier.
    pub modifier_factor: f64,
    /// Implicit source summary, if the intake extracted one.
    pub source_summary: Option<&'a DimensionSummary>,
    /// Nominal autopilot minimum shown in current mode.
    pub autopilot_floor: f64,
}

/// The base bid as displayed next to [`bid_message`].
///
/// Current mode shows `floor - bid` under autopilot and the plain bid otherwise.
/// Legacy mode scales the bid by the edited factor when source is being edited,
/// or by the implicit source range when one is held.
pub fn formatted_bid_value_range<F: CurrencyFormatter + ?Sized>(
    context: MessageContext,
    inputs: BidValueInputs<'_>,
    formatter: &F,
) -> Option<String> {
    let bid = parse_amount(inputs.bid?);
    let currency = inputs.currency?;
    let precision = inputs.precision?;
    let format = |amount: f64| formatter.format(amount, currency, precision);

    let rendered = match context.mode {
        ComputationMode::Current if context.autopilot => {
            format!("{} - {}", format(inputs.autopilot_floor), format(bid))
        }
        ComputationMode::Current => format(bid),
        ComputationMode::Legacy if context.edited.is_source() => {
            format(bid * inputs.modifier_factor)
        }
        ComputationMode::Legacy => match inputs.source_summary {
            Some(source) => format!("{} - {}", format(bid * source.min), format(bid * source.max)),
            None => format(bid),
        },
    };
    Some(rendered)
}
