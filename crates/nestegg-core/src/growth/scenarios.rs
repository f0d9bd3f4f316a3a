//! "What if" scenarios
//!
//! A scenario answers: how much bigger is the nest egg if I put an extra
//! amount in every month? By default the extra contribution is run through
//! the same monthly-compounding simulator as the base projection, so the
//! scenario and the base are directly comparable.
//!
//! [`CompoundingMethod::LumpSumApproximation`] reproduces the quick estimate
//! `extra * 12 * years * (1 + annual_rate)^years`, which treats every year's
//! extra contributions as one lump sum compounded annually over the whole
//! horizon. It overstates the effect and is only offered for comparison.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{GrowthResult, InvestmentParameters, Scenario};

use super::simulator::simulate;

/// How the extra contribution is compounded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompoundingMethod {
    /// Same monthly compounding as the base projection
    #[default]
    Monthly,
    /// Lump sum compounded annually over the full horizon (overstates growth)
    LumpSumApproximation,
}

impl CompoundingMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::LumpSumApproximation => "lump_sum_approximation",
        }
    }
}

impl std::str::FromStr for CompoundingMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "monthly" => Ok(Self::Monthly),
            "lump_sum_approximation" | "lump_sum" | "lumpsum" => Ok(Self::LumpSumApproximation),
            _ => Err(format!("Unknown compounding method: {}", s)),
        }
    }
}

/// A named extra monthly contribution
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScenarioPreset {
    pub title: &'static str,
    pub additional_contribution: f64,
}

/// Built-in lifestyle-change scenarios
pub const SCENARIO_PRESETS: &[ScenarioPreset] = &[
    ScenarioPreset {
        title: "Saved an extra $100 per month",
        additional_contribution: 100.0,
    },
    ScenarioPreset {
        title: "Gave up daily coffee purchases",
        additional_contribution: 128.0,
    },
    ScenarioPreset {
        title: "Gave up weekly restaurant visits",
        additional_contribution: 200.0,
    },
];

/// Derives scenarios from a base projection
pub struct ScenarioProjector<'a> {
    params: &'a InvestmentParameters,
    base: &'a GrowthResult,
    method: CompoundingMethod,
}

impl<'a> ScenarioProjector<'a> {
    pub fn new(params: &'a InvestmentParameters, base: &'a GrowthResult) -> Self {
        Self {
            params,
            base,
            method: CompoundingMethod::default(),
        }
    }

    /// Use a different compounding method
    pub fn with_method(mut self, method: CompoundingMethod) -> Self {
        self.method = method;
        self
    }

    pub fn method(&self) -> CompoundingMethod {
        self.method
    }

    /// Project one scenario with an extra monthly contribution
    pub fn project(&self, title: &str, additional_contribution: f64) -> Result<Scenario> {
        if !additional_contribution.is_finite() || additional_contribution <= 0.0 {
            return Err(Error::InvalidParameters(
                "Additional monthly contribution must be a positive number".into(),
            ));
        }
        if self.base.total_years != self.params.horizon_years() {
            return Err(Error::InvalidParameters(format!(
                "Base projection covers {} years but parameters span {}",
                self.base.total_years,
                self.params.horizon_years()
            )));
        }

        let additional_growth = match self.method {
            CompoundingMethod::Monthly => {
                let boosted = InvestmentParameters {
                    monthly_contribution: self.params.monthly_contribution
                        + additional_contribution,
                    ..self.params.clone()
                };
                simulate(&boosted)?.final_amount - self.base.final_amount
            }
            CompoundingMethod::LumpSumApproximation => {
                let years = self.base.total_years as f64;
                let annual_rate = self.params.annual_return_percent / 100.0;
                additional_contribution * 12.0 * years * (1.0 + annual_rate).powf(years)
            }
        };

        Ok(Scenario {
            title: title.to_string(),
            additional_contribution,
            final_amount: self.base.final_amount + additional_growth,
            additional_growth,
        })
    }

    /// The three built-in scenarios, in preset order
    pub fn presets(&self) -> Result<Vec<Scenario>> {
        SCENARIO_PRESETS
            .iter()
            .map(|p| self.project(p.title, p.additional_contribution))
            .collect()
    }
}
