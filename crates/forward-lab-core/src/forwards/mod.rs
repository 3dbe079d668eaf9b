#[cfg(feature = "forwards")]
pub mod carry;

#[cfg(feature = "fx_forwards")]
pub mod fx;

use rust_decimal::Decimal;

use crate::error::ForwardLabError;
use crate::types::Years;
use crate::ForwardLabResult;

pub(crate) fn ensure_non_negative(field: &str, value: Decimal) -> ForwardLabResult<()> {
    if value < Decimal::ZERO {
        return Err(ForwardLabError::domain(
            field,
            format!("{field} cannot be negative (got {value})"),
        ));
    }
    Ok(())
}

/// Time left to maturity for a valuation at `t`, clamped at zero.
///
/// `t` must lie in `[0, maturity]`; the clamp only matters for `t == maturity`.
pub(crate) fn remaining_time(maturity: Years, t: Years) -> ForwardLabResult<Years> {
    ensure_non_negative("maturity", maturity)?;
    if t < Decimal::ZERO {
        return Err(ForwardLabError::domain(
            "current_time",
            format!("Current time {t} cannot be negative"),
        ));
    }
    if t > maturity {
        return Err(ForwardLabError::domain(
            "current_time",
            format!("Current time {t} cannot be after maturity {maturity}"),
        ));
    }
    Ok((maturity - t).max(Decimal::ZERO))
}
