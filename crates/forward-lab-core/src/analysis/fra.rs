use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::{default_steps, ensure_grid, linspace};
use crate::error::ForwardLabError;
use crate::compounding::sub;
use crate::fra::{
    ensure_positive_notional, fra_settlement, period_fraction, period_interest, FraInput,
};
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::ForwardLabResult;

fn default_min_mrr() -> Rate {
    dec!(0.01)
}

fn default_max_mrr() -> Rate {
    dec!(0.10)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FraSweepInput {
    pub term_sheet: FraInput,
    #[serde(default = "default_min_mrr")]
    pub min_mrr: Rate,
    #[serde(default = "default_max_mrr")]
    pub max_mrr: Rate,
    #[serde(default = "default_steps")]
    pub steps: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FraSweepPoint {
    pub market_reference_rate: Rate,
    pub net_payment: Money,
    /// `None` where 1 + MRR * period_fraction <= 0.
    pub cash_settlement_pv: Option<Money>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FraSweepOutput {
    pub period_fraction: Decimal,
    pub fixed_interest: Money,
    /// Settlement is zero where MRR equals the fixed rate.
    pub breakeven_mrr: Rate,
    pub points: Vec<FraSweepPoint>,
}

/// FRA cash settlement across a grid of market reference rates.
pub fn fra_sweep(input: &FraSweepInput) -> ForwardLabResult<ComputationOutput<FraSweepOutput>> {
    let start = Instant::now();
    let ts = &input.term_sheet;
    ensure_grid("steps", input.steps, input.min_mrr, input.max_mrr)?;

    ensure_positive_notional(ts.notional)?;
    let pf = period_fraction(ts.start_period, ts.end_period, ts.days_in_year_basis)?;
    let fixed_interest = period_interest(ts.notional, ts.fixed_rate, pf)?;

    let mut undefined = 0usize;
    let mut points = Vec::with_capacity(input.steps);
    for mrr in linspace(input.min_mrr, input.max_mrr, input.steps)? {
        match fra_settlement(
            ts.notional,
            ts.fixed_rate,
            ts.start_period,
            ts.end_period,
            ts.days_in_year_basis,
            mrr,
        ) {
            Ok(s) => points.push(FraSweepPoint {
                market_reference_rate: mrr,
                net_payment: s.net_payment,
                cash_settlement_pv: Some(s.cash_settlement_pv),
            }),
            Err(ForwardLabError::Domain { .. }) => {
                undefined += 1;
                points.push(FraSweepPoint {
                    market_reference_rate: mrr,
                    net_payment: sub(period_interest(ts.notional, mrr, pf)?, fixed_interest)?,
                    cash_settlement_pv: None,
                });
            }
            Err(e) => return Err(e),
        }
    }

    let mut warnings: Vec<String> = Vec::new();
    if undefined > 0 {
        tracing::warn!(undefined, "FRA sweep has points with a non-positive discount denominator");
        warnings.push(format!(
            "{undefined} point(s) have 1 + MRR * period_fraction <= 0; cash settlement is undefined there"
        ));
    }

    let output = FraSweepOutput {
        period_fraction: pf,
        fixed_interest,
        breakeven_mrr: ts.fixed_rate,
        points,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "FRA Cash Settlement vs Market Reference Rate",
        &serde_json::json!({
            "min_mrr": input.min_mrr.to_string(),
            "max_mrr": input.max_mrr.to_string(),
            "steps": input.steps,
        }),
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn term_sheet() -> FraInput {
        FraInput {
            notional: dec!(10000000),
            fixed_rate: dec!(0.0525),
            start_period: 3,
            end_period: 6,
            days_in_year_basis: 360,
            market_reference_rate: dec!(0.055),
        }
    }

    #[test]
    fn test_sweep_crosses_zero_at_fixed_rate() {
        let out = fra_sweep(&FraSweepInput {
            term_sheet: term_sheet(),
            min_mrr: dec!(0.0425),
            max_mrr: dec!(0.0625),
            steps: 9,
        })
        .unwrap();
        let pts = &out.result.points;
        assert_eq!(pts.len(), 9);
        assert_eq!(pts[4].market_reference_rate, dec!(0.0525));
        assert_eq!(pts[4].cash_settlement_pv, Some(Decimal::ZERO));
        assert!(pts[0].cash_settlement_pv.unwrap() < Decimal::ZERO);
        assert!(pts[8].cash_settlement_pv.unwrap() > Decimal::ZERO);
        assert_eq!(out.result.breakeven_mrr, dec!(0.0525));
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_sweep_marks_undefined_points() {
        // pf = 0.25, so the denominator vanishes at MRR = -4
        let out = fra_sweep(&FraSweepInput {
            term_sheet: term_sheet(),
            min_mrr: dec!(-5),
            max_mrr: dec!(0),
            steps: 6,
        })
        .unwrap();
        let pts = &out.result.points;
        assert!(pts[0].cash_settlement_pv.is_none());
        assert!(pts[1].cash_settlement_pv.is_none());
        assert!(pts[2].cash_settlement_pv.is_some());
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_sweep_survives_undefined_pv_at_fixed_rate() {
        // 1 + (-5) * 0.25 < 0, but every MRR on the grid has a positive denominator
        let mut ts = term_sheet();
        ts.fixed_rate = dec!(-5);
        let out = fra_sweep(&FraSweepInput {
            term_sheet: ts,
            min_mrr: dec!(0.01),
            max_mrr: dec!(0.10),
            steps: 10,
        })
        .unwrap();
        assert_eq!(out.result.period_fraction, dec!(0.25));
        assert_eq!(out.result.fixed_interest, dec!(-12500000));
        assert!(out.result.points.iter().all(|p| p.cash_settlement_pv.is_some()));
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_sweep_rejects_oversized_grid() {
        let err = fra_sweep(&FraSweepInput {
            term_sheet: term_sheet(),
            min_mrr: dec!(0.01),
            max_mrr: dec!(0.10),
            steps: usize::MAX,
        });
        assert!(matches!(err, Err(ForwardLabError::Domain { .. })));
    }

    #[test]
    fn test_sweep_propagates_bad_term_sheet() {
        let mut ts = term_sheet();
        ts.end_period = ts.start_period;
        let err = fra_sweep(&FraSweepInput {
            term_sheet: ts,
            min_mrr: dec!(0.01),
            max_mrr: dec!(0.10),
            steps: 10,
        });
        assert!(matches!(err, Err(ForwardLabError::Domain { .. })));
    }
}
