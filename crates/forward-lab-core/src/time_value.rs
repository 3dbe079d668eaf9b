use rust_decimal::Decimal;

use crate::cash_flows::CashFlow;
use crate::compounding::{add, discrete_growth, div, sub};
use crate::types::{Money, Rate, Years};
use crate::ForwardLabResult;

/// Present value at `from_time` of the flows dated inside `[from_time, to_time]`.
///
/// Each included flow is discounted by (1 + rate)^(time_from_t0 - from_time).
/// Flows before `from_time` or after `to_time` contribute nothing. The
/// compounding base is only checked once a flow actually needs discounting,
/// so an empty window is zero for any rate.
pub fn present_value(
    cash_flows: &[CashFlow],
    rate: Rate,
    from_time: Years,
    to_time: Years,
) -> ForwardLabResult<Money> {
    let mut total = Decimal::ZERO;

    for cf in cash_flows
        .iter()
        .filter(|cf| cf.time_from_t0 >= from_time && cf.time_from_t0 <= to_time)
    {
        let periods = sub(cf.time_from_t0, from_time)?.max(Decimal::ZERO);
        let growth = discrete_growth(rate, periods)?;
        total = add(total, div(cf.amount, growth)?)?;
    }

    Ok(total)
}
