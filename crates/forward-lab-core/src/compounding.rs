use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::ForwardLabError;
use crate::types::{with_metadata, ComputationOutput, Rate, Years};
use crate::ForwardLabResult;

// ---------------------------------------------------------------------------
// Checked arithmetic
// ---------------------------------------------------------------------------

pub(crate) fn add(a: Decimal, b: Decimal) -> ForwardLabResult<Decimal> {
    a.checked_add(b)
        .ok_or_else(|| ForwardLabError::overflow(format!("{a} + {b}")))
}

pub(crate) fn sub(a: Decimal, b: Decimal) -> ForwardLabResult<Decimal> {
    a.checked_sub(b)
        .ok_or_else(|| ForwardLabError::overflow(format!("{a} - {b}")))
}

pub(crate) fn mul(a: Decimal, b: Decimal) -> ForwardLabResult<Decimal> {
    a.checked_mul(b)
        .ok_or_else(|| ForwardLabError::overflow(format!("{a} * {b}")))
}

/// Callers rule out a zero divisor beforehand.
pub(crate) fn div(a: Decimal, b: Decimal) -> ForwardLabResult<Decimal> {
    a.checked_div(b)
        .ok_or_else(|| ForwardLabError::overflow(format!("{a} / {b}")))
}

// ---------------------------------------------------------------------------
// Growth and discount factors
// ---------------------------------------------------------------------------

/// (1 + rate)^years under discrete annual compounding.
///
/// The base must be strictly positive for every exponent, integral or not.
/// A base of zero or below has no meaningful fractional power and is
/// rejected even when `years` happens to be a whole number.
pub fn discrete_growth(rate: Rate, years: Years) -> ForwardLabResult<Decimal> {
    let base = add(Decimal::ONE, rate)?;
    if base <= Decimal::ZERO {
        return Err(ForwardLabError::domain(
            "rate",
            format!("non-positive compounding base: 1 + rate = {base} must be > 0"),
        ));
    }
    if years.is_zero() {
        return Ok(Decimal::ONE);
    }
    base.checked_powd(years)
        .ok_or_else(|| ForwardLabError::overflow(format!("(1 + {rate})^{years}")))
}

/// (1 + rate)^(-years): the discrete discount factor over `years`.
pub fn discrete_discount(rate: Rate, years: Years) -> ForwardLabResult<Decimal> {
    discrete_growth(rate, -years)
}

/// exp(rate * years) under continuous compounding.
pub fn continuous_growth(rate: Rate, years: Years) -> ForwardLabResult<Decimal> {
    let exponent = rate
        .checked_mul(years)
        .ok_or_else(|| ForwardLabError::overflow(format!("{rate} * {years}")))?;
    if exponent.is_zero() {
        return Ok(Decimal::ONE);
    }
    exponent
        .checked_exp()
        .ok_or_else(|| ForwardLabError::overflow(format!("exp({exponent})")))
}

// ---------------------------------------------------------------------------
// APR conversion
// ---------------------------------------------------------------------------

fn periodic_base(apr: Rate, frequency: u32, field: &str) -> ForwardLabResult<Decimal> {
    if frequency == 0 {
        return Err(ForwardLabError::domain(
            field,
            "Compounding frequency must be a positive integer",
        ));
    }
    let base = add(Decimal::ONE, apr / Decimal::from(frequency))?;
    if base <= Decimal::ZERO {
        return Err(ForwardLabError::domain(
            "apr",
            format!("1 + APR / {frequency} = {base} must be positive"),
        ));
    }
    Ok(base)
}

/// Effective annual rate of an APR compounded `frequency` times a year:
/// (1 + APR/m)^m - 1.
pub fn effective_annual_rate(apr: Rate, frequency: u32) -> ForwardLabResult<Rate> {
    let base = periodic_base(apr, frequency, "frequency")?;
    let grown = base
        .checked_powu(u64::from(frequency))
        .ok_or_else(|| ForwardLabError::overflow(format!("{base}^{frequency}")))?;
    Ok(grown - Decimal::ONE)
}

/// Convert an APR compounded `m` times a year into the equivalent APR
/// compounded `n` times a year:
///
///   APR_n = n * ((1 + APR_m / m)^(m / n) - 1)
pub fn convert_apr(apr_m: Rate, m: u32, n: u32) -> ForwardLabResult<Rate> {
    let base = periodic_base(apr_m, m, "m")?;
    if n == 0 {
        return Err(ForwardLabError::domain(
            "n",
            "Compounding frequency must be a positive integer",
        ));
    }
    let n_dec = Decimal::from(n);
    let exponent = Decimal::from(m) / n_dec;
    let grown = base
        .checked_powd(exponent)
        .ok_or_else(|| ForwardLabError::overflow(format!("{base}^({m}/{n})")))?;
    mul(n_dec, grown - Decimal::ONE)
}

/// Input for APR conversion between compounding frequencies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AprConversionInput {
    /// Original APR (decimal, 0.06 = 6%).
    pub apr: Rate,
    /// Compounding periods per year of the original APR (m).
    pub from_frequency: u32,
    /// Compounding periods per year of the target APR (n).
    pub to_frequency: u32,
}

/// Output from APR conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AprConversionOutput {
    pub original_apr: Rate,
    pub from_frequency: u32,
    pub converted_apr: Rate,
    pub to_frequency: u32,
    /// Effective annual rate shared by both quotes.
    pub effective_annual_rate: Rate,
}

/// Convert an APR and report the effective annual rate both quotes imply.
pub fn convert_apr_rate(
    input: &AprConversionInput,
) -> ForwardLabResult<ComputationOutput<AprConversionOutput>> {
    let start = Instant::now();

    let converted_apr = convert_apr(input.apr, input.from_frequency, input.to_frequency)?;
    let effective_annual_rate = effective_annual_rate(input.apr, input.from_frequency)?;

    tracing::debug!(
        apr = %input.apr,
        m = input.from_frequency,
        n = input.to_frequency,
        converted = %converted_apr,
        "APR converted"
    );

    let output = AprConversionOutput {
        original_apr: input.apr,
        from_frequency: input.from_frequency,
        converted_apr,
        to_frequency: input.to_frequency,
        effective_annual_rate,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "APR Conversion: APR_n = n * ((1 + APR_m / m)^(m / n) - 1)",
        &serde_json::json!({
            "apr": input.apr.to_string(),
            "from_frequency": input.from_frequency,
            "to_frequency": input.to_frequency,
        }),
        Vec::new(),
        elapsed,
        output,
    ))
}
