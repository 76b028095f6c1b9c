//! Engine configuration: computation mode and autopilot floor.

use serde::{Deserialize, Serialize};

/// Nominal autopilot minimum bid, in currency units.
pub const DEFAULT_AUTOPILOT_FLOOR: f64 = 0.0001;

/// Which of the two historically divergent bound formulas an engine uses.
///
/// The mode is fixed when the engine is created and never changes afterwards.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComputationMode {
    /// Source is a selectable dimension; autopilot clamps the minimum to the floor.
    #[default]
    Current,
    /// Source is pulled out of the selectable set under autopilot; no floor clamp.
    Legacy,
}

/// Configuration used when constructing a [`BidRangeEngine`](crate::BidRangeEngine).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    /// Bound formula used for the lifetime of the engine.
    pub mode: ComputationMode,
    /// Minimum bid reported under autopilot whenever a ceiling is known.
    pub autopilot_floor: f64,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            mode: ComputationMode::Current,
            autopilot_floor: DEFAULT_AUTOPILOT_FLOOR,
        }
    }
}

impl EngineOptions {
    /// Options for the legacy formula, keeping other defaults.
    pub fn legacy() -> Self {
        Self::default().with_mode(ComputationMode::Legacy)
    }

    /// Override the computation mode while preserving other defaults.
    pub fn with_mode(mut self, mode: ComputationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Override the autopilot floor. Non-finite or negative values fall back to the default.
    pub fn with_autopilot_floor(mut self, floor: f64) -> Self {
        self.autopilot_floor = if floor.is_finite() && floor >= 0.0 {
            floor
        } else {
            DEFAULT_AUTOPILOT_FLOOR
        };
        self
    }
}
