use num_format::{Locale, ToFormattedString as _};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Format an amount as `$1,234.56`, with a leading `-` for negatives.
///
/// Always uses the `en` grouping (`,` thousands, `.` decimal mark).
pub fn format_money(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let magnitude = rounded.abs();

    let whole = magnitude.trunc();
    let grouped = whole
        .to_u128()
        .map_or_else(|| whole.to_string(), |n| n.to_formatted_string(&Locale::en));
    let cents = (magnitude.fract() * Decimal::ONE_HUNDRED).to_u32().unwrap_or(0);

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}${grouped}.{cents:02}")
}
