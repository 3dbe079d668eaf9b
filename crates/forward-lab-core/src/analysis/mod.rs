//! Data series for exploring the valuation engine: MTM paths, cash-flow
//! sensitivities, scenario comparisons and rate/spot sweeps.
//!
//! Spot paths here are illustrative linear interpolations, not simulations.

pub mod carry;
pub mod fra;
pub mod fx;

use rust_decimal::Decimal;

use crate::compounding::{add, mul, sub};
use crate::error::ForwardLabError;
use crate::ForwardLabResult;

/// Largest number of points a single series may request.
pub const MAX_GRID_POINTS: usize = 10_000;

/// `n` evenly spaced values from `start` to `end` inclusive.
///
/// The last value is exactly `end`. `n == 1` yields `[start]`.
pub fn linspace(start: Decimal, end: Decimal, n: usize) -> ForwardLabResult<Vec<Decimal>> {
    match n {
        0 => Ok(Vec::new()),
        1 => Ok(vec![start]),
        _ => {
            let last = n - 1;
            let step = sub(end, start)? / Decimal::from(last);
            (0..n)
                .map(|i| -> ForwardLabResult<Decimal> {
                    if i == last {
                        Ok(end)
                    } else {
                        add(start, mul(step, Decimal::from(i))?)
                    }
                })
                .collect()
        }
    }
}

pub(crate) fn ensure_grid(field: &str, steps: usize, low: Decimal, high: Decimal) -> ForwardLabResult<()> {
    if steps < 2 {
        return Err(ForwardLabError::domain(
            field,
            format!("At least 2 grid points are required (got {steps})"),
        ));
    }
    if steps > MAX_GRID_POINTS {
        return Err(ForwardLabError::domain(
            field,
            format!("At most {MAX_GRID_POINTS} grid points are allowed (got {steps})"),
        ));
    }
    if low > high {
        return Err(ForwardLabError::domain(
            field,
            format!("Grid lower bound {low} exceeds upper bound {high}"),
        ));
    }
    Ok(())
}

fn default_steps() -> usize {
    100
}
