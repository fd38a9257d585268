//! Money helpers shared by the line-item totals and the dashboard.
//!
//! Stored amounts are never rounded; these helpers exist for presentation
//! and for payloads that the backend expects at cent precision.
//!
//! Amounts built from backend data or user input can exceed what a
//! [`Decimal`] holds. Arithmetic on them saturates at `Decimal::MAX` /
//! `Decimal::MIN` instead of panicking.

use rust_decimal::Decimal;

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// Values at exactly 0.005 are rounded away from zero.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use admin_core::money::round_half_up;
///
/// assert_eq!(round_half_up(dec!(123.454)), dec!(123.45));
/// assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
/// assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46));
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

/// Sums amounts, saturating instead of overflowing.
///
/// ```
/// use rust_decimal::Decimal;
/// use rust_decimal_macros::dec;
/// use admin_core::money::saturating_sum;
///
/// assert_eq!(saturating_sum([dec!(1.5), dec!(2)]), dec!(3.5));
/// assert_eq!(saturating_sum([Decimal::MAX, dec!(1)]), Decimal::MAX);
/// ```
pub fn saturating_sum(amounts: impl IntoIterator<Item = Decimal>) -> Decimal {
    amounts
        .into_iter()
        .fold(Decimal::ZERO, Decimal::saturating_add)
}

/// Formats an amount with two decimals and comma thousands separators,
/// e.g. `1234567.5` becomes `"1,234,567.50"`.
///
/// ```
/// use rust_decimal_macros::dec;
/// use admin_core::money::format_amount;
///
/// assert_eq!(format_amount(dec!(4760)), "4,760.00");
/// assert_eq!(format_amount(dec!(-0.5)), "-0.50");
/// ```
pub fn format_amount(value: Decimal) -> String {
    let rounded = round_half_up(value);
    let text = format!("{:.2}", rounded.abs());
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    format!("{sign}{grouped}.{fraction}")
}
