//! Monthly-compounding growth simulator
//!
//! Each simulated year applies twelve steps of
//! `balance = balance * (1 + r) + monthly_contribution` with
//! `r = annual_return_percent / 100 / 12`, then records a [`YearSnapshot`].
//! The loop is iterative rather than a closed-form annuity so that every
//! year has an exact snapshot for charting. No rounding happens here.

use crate::error::Result;
use crate::models::{GrowthResult, InvestmentParameters, YearSnapshot};

const MONTHS_PER_YEAR: u32 = 12;

/// Monthly rate for a nominal annual percentage
pub fn monthly_rate(annual_return_percent: f64) -> f64 {
    annual_return_percent / 100.0 / MONTHS_PER_YEAR as f64
}

/// Project `params` forward to retirement.
///
/// Fails with `InvalidParameters` before doing any work if the ages are out of
/// order or beyond [`MAX_AGE`](crate::models::MAX_AGE), or if any amount is
/// negative, non-finite, or above the return cap.
pub fn simulate(params: &InvestmentParameters) -> Result<GrowthResult> {
    params.validate()?;

    let rate = monthly_rate(params.annual_return_percent);
    let total_years = params.horizon_years();
    let yearly_contribution = params.monthly_contribution * MONTHS_PER_YEAR as f64;

    let mut balance = params.current_investment;
    let mut yearly_data = Vec::with_capacity(total_years as usize);

    for year in 1..=total_years {
        let starting = balance;
        for _ in 0..MONTHS_PER_YEAR {
            balance = balance * (1.0 + rate) + params.monthly_contribution;
        }
        yearly_data.push(YearSnapshot {
            year: params.current_age + year,
            balance,
            contributions: yearly_contribution,
            growth: balance - starting - yearly_contribution,
        });
    }

    let total_contributions = yearly_contribution * total_years as f64;

    Ok(GrowthResult {
        total_years,
        final_amount: balance,
        initial_balance: params.current_investment,
        total_contributions,
        total_growth: balance - params.current_investment - total_contributions,
        yearly_data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn params(
        current_age: u32,
        retirement_age: u32,
        current_investment: f64,
        monthly_contribution: f64,
        annual_return_percent: f64,
    ) -> InvestmentParameters {
        InvestmentParameters {
            current_age,
            retirement_age,
            current_investment,
            monthly_contribution,
            annual_return_percent,
        }
    }

    #[test]
    fn test_single_year_lump_sum() {
        let result = simulate(&params(30, 31, 1000.0, 0.0, 12.0)).unwrap();

        assert_eq!(result.total_years, 1);
        assert!((result.final_amount - 1126.83).abs() < 0.01);
        assert_eq!(result.yearly_data.len(), 1);
        assert_eq!(result.yearly_data[0].year, 31);
        assert_eq!(result.total_contributions, 0.0);
    }

    #[test]
    fn test_zero_rate_zero_contribution_is_flat() {
        let result = simulate(&params(40, 50, 2500.0, 0.0, 0.0)).unwrap();

        assert_eq!(result.final_amount, 2500.0);
        assert_eq!(result.total_growth, 0.0);
        assert!(result.yearly_data.iter().all(|y| y.growth == 0.0));
    }

    #[test]
    fn test_zero_rate_with_contributions() {
        let result = simulate(&params(40, 42, 100.0, 50.0, 0.0)).unwrap();

        assert_eq!(result.total_contributions, 1200.0);
        assert_eq!(result.final_amount, 1300.0);
        assert_eq!(result.total_growth, 0.0);
    }

    #[test]
    fn test_all_zero_inputs() {
        let result = simulate(&params(20, 25, 0.0, 0.0, 7.0)).unwrap();

        assert_eq!(result.final_amount, 0.0);
        assert_eq!(result.total_growth, 0.0);
        assert_eq!(result.yearly_data.len(), 5);
    }

    #[test]
    fn test_balance_identity_holds() {
        let cases = [
            params(25, 65, 5000.0, 400.0, 7.0),
            params(30, 60, 0.0, 1000.0, 10.0),
            params(50, 67, 250_000.0, 0.0, 4.5),
            params(18, 70, 1.0, 1.0, 20.0),
        ];

        for p in &cases {
            let r = simulate(p).unwrap();
            let rebuilt = r.initial_balance + r.total_contributions + r.total_growth;
            let tolerance = 1e-6 * r.final_amount.abs().max(1.0);
            assert!(
                (r.final_amount - rebuilt).abs() <= tolerance,
                "identity broken for {:?}",
                p
            );
        }
    }

    #[test]
    fn test_snapshots_are_consistent() {
        let p = params(30, 40, 10_000.0, 250.0, 6.0);
        let r = simulate(&p).unwrap();

        assert_eq!(r.yearly_data.len(), 10);
        assert_eq!(r.yearly_data.first().unwrap().year, 31);
        assert_eq!(r.yearly_data.last().unwrap().year, 40);
        assert_eq!(r.yearly_data.last().unwrap().balance, r.final_amount);

        let mut previous = p.current_investment;
        for snap in &r.yearly_data {
            assert_eq!(snap.contributions, 3000.0);
            assert!((snap.balance - previous - snap.contributions - snap.growth).abs() < 1e-9);
            previous = snap.balance;
        }

        let summed_growth: f64 = r.yearly_data.iter().map(|y| y.growth).sum();
        assert!((summed_growth - r.total_growth).abs() < 1e-6);
    }

    #[test]
    fn test_rejects_invalid_parameters() {
        assert!(matches!(
            simulate(&params(65, 65, 1000.0, 100.0, 7.0)),
            Err(Error::InvalidParameters(_))
        ));
        assert!(matches!(
            simulate(&params(70, 65, 1000.0, 100.0, 7.0)),
            Err(Error::InvalidParameters(_))
        ));
        assert!(matches!(
            simulate(&params(30, 65, -1.0, 100.0, 7.0)),
            Err(Error::InvalidParameters(_))
        ));
        assert!(matches!(
            simulate(&params(30, 65, 1000.0, 100.0, 20.5)),
            Err(Error::InvalidParameters(_))
        ));
        assert!(matches!(
            simulate(&params(30, 65, f64::INFINITY, 100.0, 7.0)),
            Err(Error::InvalidParameters(_))
        ));
    }

    #[test]
    fn test_rejects_ages_beyond_limit() {
        assert!(matches!(
            simulate(&params(0, u32::MAX, 0.0, 0.0, 7.0)),
            Err(Error::InvalidParameters(_))
        ));
        assert!(matches!(
            simulate(&params(30, 121, 1000.0, 100.0, 7.0)),
            Err(Error::InvalidParameters(_))
        ));

        let oldest = simulate(&params(0, 120, 0.0, 1.0, 0.0)).unwrap();
        assert_eq!(oldest.yearly_data.len(), 120);
        assert_eq!(oldest.total_contributions, 1440.0);
    }

    #[test]
    fn test_repeatable() {
        let p = params(35, 60, 12_345.67, 321.0, 8.25);
        assert_eq!(simulate(&p).unwrap(), simulate(&p).unwrap());
    }
}
