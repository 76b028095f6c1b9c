//! Bid-range aggregation for campaign bid modifiers.
//!
//! Given a base bid, the bid modifier being edited, per-dimension modifier
//! statistics and the autopilot state of the ad group, this crate computes the
//! effective `[min, max]` range of the final CPC or CPM bid together with the
//! labels a console shows next to it. It offers tools to
//!
//! - describe and validate an input snapshot (`data` module),
//! - normalize it and dispatch the source dimension per mode (`intake` module),
//! - fold the selected dimensions into factor bounds (`selection` module),
//! - compute the bid bounds under the current or legacy formula (`bounds` module),
//! - derive the human-readable messages (`messages` module), and
//! - hold all of it as an atomically replaced snapshot (`engine` module).
//!
//! Everything is synchronous and free of I/O. Each engine instance is
//! independent and owned by the editing session that created it.
//!
//! # Quick start
//!
//! ```
//! use bidrange::data::{
//!     BidInputs, BidModifier, BiddingType, Currency, DimensionSummary, DimensionType,
//! };
//! use bidrange::BidRangeEngine;
//!
//! let inputs = BidInputs::builder(
//!     BidModifier::new(DimensionType::Device, "MOBILE", 1.1),
//!     BiddingType::Cpc,
//! )
//! .bid("1.0")
//! .summaries(vec![
//!     DimensionSummary::new(DimensionType::Device, 3, 0.9, 1.1).expect("ordered limits"),
//!     DimensionSummary::new(DimensionType::Source, 4, 0.8, 1.2).expect("ordered limits"),
//! ])
//! .currency(Currency::Usd)
//! .precision(4)
//! .build()
//! .expect("validated inputs");
//!
//! let mut engine = BidRangeEngine::current();
//! engine.update_inputs(&inputs);
//! engine.select_dimensions(&[DimensionType::Source]);
//!
//! assert_eq!(
//!     engine.state().final_bid_range_value.as_deref(),
//!     Some("$0.8800 - $1.3200")
//! );
//! ```

pub mod bounds;
pub mod data;
pub mod engine;
pub mod error;
pub mod formatting;
pub mod intake;
pub mod messages;
pub mod options;
pub mod selection;

pub use engine::{BidRangeEngine, ComputationState};
pub use error::{BidRangeError, Result};
pub use options::{ComputationMode, EngineOptions};
pub use selection::{FactorRange, SelectionRow};
