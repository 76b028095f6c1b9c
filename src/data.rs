//! Input snapshot types and validation utilities consumed by the bid-range engine.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{BidRangeError, Result};

/// Targeting axis that can carry independent bid modifiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DimensionType {
    Publisher,
    Source,
    Device,
    OperatingSystem,
    Environment,
    Country,
    State,
    Dma,
    Ad,
    DayHour,
    Browser,
    ConnectionType,
}

impl DimensionType {
    /// Every dimension type, in display order.
    pub const ALL: [DimensionType; 12] = [
        DimensionType::Publisher,
        DimensionType::Source,
        DimensionType::Device,
        DimensionType::OperatingSystem,
        DimensionType::Environment,
        DimensionType::Country,
        DimensionType::State,
        DimensionType::Dma,
        DimensionType::Ad,
        DimensionType::DayHour,
        DimensionType::Browser,
        DimensionType::ConnectionType,
    ];

    /// Identifier used on the wire (`"OPERATING_SYSTEM"`).
    pub fn wire_name(self) -> &'static str {
        match self {
            DimensionType::Publisher => "PUBLISHER",
            DimensionType::Source => "SOURCE",
            DimensionType::Device => "DEVICE",
            DimensionType::OperatingSystem => "OPERATING_SYSTEM",
            DimensionType::Environment => "ENVIRONMENT",
            DimensionType::Country => "COUNTRY",
            DimensionType::State => "STATE",
            DimensionType::Dma => "DMA",
            DimensionType::Ad => "AD",
            DimensionType::DayHour => "DAY_HOUR",
            DimensionType::Browser => "BROWSER",
            DimensionType::ConnectionType => "CONNECTION_TYPE",
        }
    }

    /// Human-readable label shown next to selection rows.
    pub fn label(self) -> &'static str {
        match self {
            DimensionType::Publisher => "Publisher",
            DimensionType::Source => "Media Source",
            DimensionType::Device => "Device",
            DimensionType::OperatingSystem => "Operating System",
            DimensionType::Environment => "Environment",
            DimensionType::Country => "Country",
            DimensionType::State => "State / Region",
            DimensionType::Dma => "DMA",
            DimensionType::Ad => "Content Ad",
            DimensionType::DayHour => "Day / Hour",
            DimensionType::Browser => "Browser",
            DimensionType::ConnectionType => "Connection Type",
        }
    }

    /// Whether this is the media source dimension, which autopilot treats specially.
    pub fn is_source(self) -> bool {
        self == DimensionType::Source
    }
}

impl fmt::Display for DimensionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for DimensionType {
    type Err = BidRangeError;

    fn from_str(value: &str) -> Result<Self> {
        DimensionType::ALL
            .into_iter()
            .find(|dimension| dimension.wire_name().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| BidRangeError::unknown("dimension type", value))
    }
}

/// Unit the target bid is denominated in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BiddingType {
    /// Cost per click.
    #[default]
    Cpc,
    /// Cost per thousand impressions.
    Cpm,
}

impl BiddingType {
    /// The unit as it appears verbatim in messages.
    pub fn as_str(self) -> &'static str {
        match self {
            BiddingType::Cpc => "CPC",
            BiddingType::Cpm => "CPM",
        }
    }
}

impl fmt::Display for BiddingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BiddingType {
    type Err = BidRangeError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "CPC" => Ok(BiddingType::Cpc),
            "CPM" => Ok(BiddingType::Cpm),
            _ => Err(BidRangeError::unknown("bidding type", value)),
        }
    }
}

/// Autopilot setting of the ad group that owns the edited modifier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AutopilotState {
    /// Bids are set manually.
    #[default]
    Inactive,
    /// Autopilot optimizes bids.
    ActiveBid,
    /// Autopilot optimizes bids and daily budgets.
    ActiveBidBudget,
}

impl AutopilotState {
    /// Any state other than [`AutopilotState::Inactive`] counts as autopilot.
    pub fn is_active(self) -> bool {
        self != AutopilotState::Inactive
    }
}

impl FromStr for AutopilotState {
    type Err = BidRangeError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "INACTIVE" => Ok(AutopilotState::Inactive),
            "ACTIVE_BID" => Ok(AutopilotState::ActiveBid),
            "ACTIVE_BID_BUDGET" => Ok(AutopilotState::ActiveBidBudget),
            _ => Err(BidRangeError::unknown("autopilot state", value)),
        }
    }
}

/// Account currency. Only the symbol is consumed here; exchange rates live elsewhere.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Currency {
    Usd,
    Eur,
    Gbp,
    Aud,
    Sgd,
    Brl,
    Myr,
    Chf,
    Zar,
    Ils,
    Inr,
    Jpy,
    Cad,
    Nzd,
    Try,
    Mxn,
}

impl Currency {
    /// ISO 4217 code.
    pub fn code(self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
            Currency::Aud => "AUD",
            Currency::Sgd => "SGD",
            Currency::Brl => "BRL",
            Currency::Myr => "MYR",
            Currency::Chf => "CHF",
            Currency::Zar => "ZAR",
            Currency::Ils => "ILS",
            Currency::Inr => "INR",
            Currency::Jpy => "JPY",
            Currency::Cad => "CAD",
            Currency::Nzd => "NZD",
            Currency::Try => "TRY",
            Currency::Mxn => "MXN",
        }
    }

    /// Symbol prefixed to formatted amounts.
    pub fn symbol(self) -> &'static str {
        match self {
            Currency::Usd => "$",
            Currency::Eur => "€",
            Currency::Gbp => "£",
            Currency::Aud => "A$",
            Currency::Sgd => "S$",
            Currency::Brl => "R$",
            Currency::Myr => "RM",
            Currency::Chf => "CHF ",
            Currency::Zar => "R",
            Currency::Ils => "₪",
            Currency::Inr => "₹",
            Currency::Jpy => "¥",
            Currency::Cad => "C$",
            Currency::Nzd => "NZ$",
            Currency::Try => "₺",
            Currency::Mxn => "MX$",
        }
    }
}

impl FromStr for Currency {
    type Err = BidRangeError;

    fn from_str(value: &str) -> Result<Self> {
        const ALL: [Currency; 16] = [
            Currency::Usd,
            Currency::Eur,
            Currency::Gbp,
            Currency::Aud,
            Currency::Sgd,
            Currency::Brl,
            Currency::Myr,
            Currency::Chf,
            Currency::Zar,
            Currency::Ils,
            Currency::Inr,
            Currency::Jpy,
            Currency::Cad,
            Currency::Nzd,
            Currency::Try,
            Currency::Mxn,
        ];
        ALL.into_iter()
            .find(|currency| currency.code().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| BidRangeError::unknown("currency", value))
    }
}

/// One dimension-value pair whose modifier is being edited.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BidModifier {
    /// Dimension the target belongs to.
    #[serde(rename = "type")]
    pub dimension: DimensionType,
    /// Dimension value, e.g. a source slug or device name.
    pub target: String,
    /// Multiplicative factor relative to the base bid; `None` means "not yet set".
    pub modifier: Option<f64>,
}

impl BidModifier {
    /// Creates a modifier with an explicit factor.
    pub fn new<S: Into<String>>(dimension: DimensionType, target: S, modifier: f64) -> Self {
        Self {
            dimension,
            target: target.into(),
            modifier: Some(modifier),
        }
    }

    /// Creates a modifier whose factor has not been set yet.
    pub fn unset<S: Into<String>>(dimension: DimensionType, target: S) -> Self {
        Self {
            dimension,
            target: target.into(),
            modifier: None,
        }
    }

    /// The effective factor, with unset modifiers counting as neutral.
    pub fn factor(&self) -> f64 {
        self.modifier.unwrap_or(1.0)
    }

    /// Signed percent delta, e.g. `"+10.00%"` for a factor of `1.1`.
    pub fn percent_label(&self) -> String {
        let percent = factor_to_percent(self.factor());
        // Avoid rendering "-0.00%" for factors a hair below neutral.
        if percent.abs() < 0.005 {
            return "0.00%".to_string();
        }
        format!("{percent:+.2}%")
    }
}

/// Aggregate statistics for one dimension type across all of its modifier values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DimensionSummary {
    #[serde(rename = "type")]
    pub dimension: DimensionType,
    /// Number of modifier values observed for the dimension.
    pub count: u32,
    /// Smallest observed factor.
    pub min: f64,
    /// Largest observed factor.
    pub max: f64,
}

impl DimensionSummary {
    /// Creates a summary after checking that `[min, max]` is a finite, ordered,
    /// non-negative interval.
    pub fn new(dimension: DimensionType, count: u32, min: f64, max: f64) -> Result<Self> {
        let summary = Self {
            dimension,
            count,
            min,
            max,
        };
        summary.validate()?;
        Ok(summary)
    }

    fn validate(&self) -> Result<()> {
        if !self.min.is_finite() {
            return Err(BidRangeError::non_finite("summary min", self.min));
        }
        if !self.max.is_finite() {
            return Err(BidRangeError::non_finite("summary max", self.max));
        }
        if self.min < 0.0 {
            return Err(BidRangeError::negative("summary min", self.min));
        }
        if self.min > self.max {
            return Err(BidRangeError::InvertedLimits {
                dimension: self.dimension,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

/// Validated snapshot of everything the engine needs for one recomputation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BidInputs {
    pub modifier: BidModifier,
    pub bidding_type: BiddingType,
    /// Base bid as entered, e.g. `"1.0"`. Non-numeric values are coerced to `0.0`.
    pub bid: Option<String>,
    pub summaries: Vec<DimensionSummary>,
    pub currency: Option<Currency>,
    /// Number of fraction digits used when formatting amounts.
    pub precision: Option<u32>,
    pub autopilot_state: AutopilotState,
    /// Raw percent string such as `"-10.00"` that replaces the modifier factor.
    pub percent_override: Option<String>,
}

impl BidInputs {
    /// Start building an input snapshot for the given modifier.
    pub fn builder(modifier: BidModifier, bidding_type: BiddingType) -> BidInputsBuilder {
        BidInputsBuilder::new(modifier, bidding_type)
    }

    /// Re-runs builder validation, e.g. after deserializing a snapshot.
    pub fn validate(&self) -> Result<()> {
        if let Some(factor) = self.modifier.modifier {
            if !factor.is_finite() {
                return Err(BidRangeError::non_finite("edited modifier", factor));
            }
            if factor < 0.0 {
                return Err(BidRangeError::negative("edited modifier", factor));
            }
        }
        let mut seen = HashSet::new();
        for summary in &self.summaries {
            summary.validate()?;
            if !seen.insert(summary.dimension) {
                return Err(BidRangeError::DuplicateSummary {
                    dimension: summary.dimension,
                });
            }
        }
        Ok(())
    }
}

/// Builder that validates summaries before constructing [`BidInputs`].
#[derive(Debug)]
pub struct BidInputsBuilder {
    inputs: BidInputs,
}

impl BidInputsBuilder {
    /// Start from a modifier and bidding type; everything else is unset.
    pub fn new(modifier: BidModifier, bidding_type: BiddingType) -> Self {
        Self {
            inputs: BidInputs {
                modifier,
                bidding_type,
                bid: None,
                summaries: Vec::new(),
                currency: None,
                precision: None,
                autopilot_state: AutopilotState::Inactive,
                percent_override: None,
            },
        }
    }

    /// Sets the base bid string.
    pub fn bid<S: Into<String>>(mut self, bid: S) -> Self {
        self.inputs.bid = Some(bid.into());
        self
    }

    /// Sets the per-dimension summaries (one per dimension type).
    pub fn summaries(mut self, summaries: Vec<DimensionSummary>) -> Self {
        self.inputs.summaries = summaries;
        self
    }

    /// Sets the account currency.
    pub fn currency(mut self, currency: Currency) -> Self {
        self.inputs.currency = Some(currency);
        self
    }

    /// Sets the number of fraction digits used for display.
    pub fn precision(mut self, precision: u32) -> Self {
        self.inputs.precision = Some(precision);
        self
    }

    /// Sets the ad group's autopilot state.
    pub fn autopilot(mut self, state: AutopilotState) -> Self {
        self.inputs.autopilot_state = state;
        self
    }

    /// Overrides the modifier factor with a percent string such as `"-10.00"`.
    pub fn percent_override<S: Into<String>>(mut self, percent: S) -> Self {
        self.inputs.percent_override = Some(percent.into());
        self
    }

    /// Finalizes construction after validating factors and summary uniqueness.
    pub fn build(self) -> Result<BidInputs> {
        self.inputs.validate()?;
        Ok(self.inputs)
    }
}

/// Converts a factor into a percent delta (`1.1` becomes `10.0`).
///
/// Non-finite factors count as no change.
pub fn factor_to_percent(factor: f64) -> f64 {
    let percent = factor * 100.0 - 100.0;
    if percent.is_finite() {
        percent
    } else {
        0.0
    }
}

/// Converts a percent delta back into a factor (`-10.0` becomes `0.9`).
pub fn percent_to_factor(percent: f64) -> f64 {
    (percent + 100.0) / 100.0
}

/// Parses a percent string such as `"-10.00"` or `" 5 %"`, coercing junk to `0.0`.
pub fn parse_percent(raw: &str) -> f64 {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_suffix('%').unwrap_or(trimmed).trim_end();
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => {
            warn!("coercing non-numeric percent `{raw}` to 0.0");
            0.0
        }
    }
}

/// Parses a money amount such as `"1.0"`, coercing junk to `0.0`.
pub fn parse_amount(raw: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => {
            warn!("coercing non-numeric amount `{raw}` to 0.0");
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn summary(dimension: DimensionType, min: f64, max: f64) -> DimensionSummary {
        DimensionSummary::new(dimension, 3, min, max).unwrap()
    }

    #[test]
    fn builder_rejects_duplicate_summaries() {
        let modifier = BidModifier::unset(DimensionType::Device, "MOBILE");
        let result = BidInputs::builder(modifier, BiddingType::Cpc)
            .summaries(vec![
                summary(DimensionType::Source, 0.8, 1.2),
                summary(DimensionType::Source, 0.9, 1.0),
            ])
            .build();
        assert!(matches!(
            result,
            Err(BidRangeError::DuplicateSummary {
                dimension: DimensionType::Source
            })
        ));
    }

    #[test]
    fn summary_rejects_inverted_and_non_finite_limits() {
        assert!(matches!(
            DimensionSummary::new(DimensionType::Device, 2, 1.2, 0.8),
            Err(BidRangeError::InvertedLimits { .. })
        ));
        assert!(matches!(
            DimensionSummary::new(DimensionType::Device, 2, f64::NAN, 0.8),
            Err(BidRangeError::NonFiniteFactor { .. })
        ));
    }

    #[test]
    fn negative_factors_are_rejected() {
        assert!(matches!(
            DimensionSummary::new(DimensionType::Country, 1, -2.0, 1.0),
            Err(BidRangeError::NegativeFactor {
                context: "summary min",
                ..
            })
        ));
        let result = BidInputs::builder(
            BidModifier::new(DimensionType::Device, "MOBILE", -0.5),
            BiddingType::Cpc,
        )
        .build();
        assert!(matches!(
            result,
            Err(BidRangeError::NegativeFactor {
                context: "edited modifier",
                ..
            })
        ));
        assert!(DimensionSummary::new(DimensionType::Country, 1, 0.0, 1.0).is_ok());
    }

    #[test]
    fn dimension_labels_are_human_readable() {
        assert_eq!(DimensionType::Source.label(), "Media Source");
        assert_eq!(DimensionType::OperatingSystem.label(), "Operating System");
        assert_eq!(DimensionType::Source.to_string(), "SOURCE");
    }

    #[test]
    fn percent_helpers_coerce_junk() {
        assert_relative_eq!(parse_percent("-10.00"), -10.0);
        assert_relative_eq!(parse_percent(" 5 %"), 5.0);
        assert_eq!(parse_percent("abc"), 0.0);
        assert_eq!(parse_amount(""), 0.0);
        assert_relative_eq!(percent_to_factor(-10.0), 0.9, epsilon = 1e-12);
        assert_eq!(factor_to_percent(f64::INFINITY), 0.0);
    }

    #[test]
    fn percent_label_is_signed() {
        let label =
            |factor| BidModifier::new(DimensionType::Device, "TABLET", factor).percent_label();
        assert_eq!(label(1.1), "+10.00%");
        assert_eq!(label(0.9), "-10.00%");
        assert_eq!(label(1.0), "0.00%");
        assert_eq!(
            BidModifier::unset(DimensionType::Device, "TABLET").percent_label(),
            "0.00%"
        );
    }

    #[test]
    fn enums_parse_from_wire_names() {
        assert_eq!(
            "operating_system".parse::<DimensionType>().unwrap(),
            DimensionType::OperatingSystem
        );
        assert_eq!("usd".parse::<Currency>().unwrap(), Currency::Usd);
        assert_eq!("CPM".parse::<BiddingType>().unwrap(), BiddingType::Cpm);
        assert!("ACTIVE_BID".parse::<AutopilotState>().unwrap().is_active());
        assert!(matches!(
            "XYZ".parse::<Currency>(),
            Err(BidRangeError::UnknownVariant { kind: "currency", .. })
        ));
    }
}
