//! Retirement growth projection
//!
//! - `simulator` - year-by-year monthly-compounding projection
//! - `scenarios` - "what if" variants with a larger monthly contribution
//!
//! ## Usage
//!
//! ```rust,ignore
//! use nestegg_core::growth::{simulate, ScenarioProjector};
//!
//! let result = simulate(&params)?;
//! let scenarios = ScenarioProjector::new(&params, &result).presets()?;
//! ```

pub mod scenarios;
pub mod simulator;

pub use scenarios::{CompoundingMethod, ScenarioPreset, ScenarioProjector, SCENARIO_PRESETS};
pub use simulator::{monthly_rate, simulate};
