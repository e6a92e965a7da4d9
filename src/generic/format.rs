//! Textual forms of keys, matching the printf conversions cslib has always
//! used for them (`%d`, `%ldL`, `%g`, `%c`, `0x%lX`, ...).

/// Significant digits printed by `%g` when no precision is given.
const GENERAL_PRECISION: i32 = 6;

/// Formats `value` the way printf's `%g` does: six significant digits,
/// scientific notation when the exponent is below -4 or at least the
/// precision, and no trailing zeros.
///
/// # Examples
///
/// ```rust
/// use cslib::generic::format_general;
///
/// assert_eq!(format_general(3.5), "3.5");
/// assert_eq!(format_general(1_234_567.0), "1.23457e+06");
/// assert_eq!(format_general(0.0001), "0.0001");
/// assert_eq!(format_general(0.00001), "1e-05");
/// ```
#[must_use]
pub fn format_general(value: f64) -> String {
    if value.is_nan() {
        return if value.is_sign_negative() { "-nan" } else { "nan" }.to_owned();
    }
    if value.is_infinite() {
        return if value < 0.0 { "-inf" } else { "inf" }.to_owned();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_owned();
    }

    // The exponent must come from the rounded value, as printf computes it.
    let scientific = format!("{value:.5e}");
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if !(-4..GENERAL_PRECISION).contains(&exponent) {
        let sign = if exponent < 0 { '-' } else { '+' };
        let magnitude = exponent.unsigned_abs();
        format!("{}e{sign}{magnitude:02}", trim_fraction(mantissa))
    } else {
        let decimals = usize::try_from(GENERAL_PRECISION - 1 - exponent).unwrap_or(0);
        trim_fraction(&format!("{value:.decimals$}")).to_owned()
    }
}

/// Formats a signed `long` as `%ldL`.
pub(crate) fn format_long(value: i64) -> String {
    format!("{value}L")
}

/// Formats an `unsigned long` as `%luL`.
pub(crate) fn format_unsigned_long(value: u64) -> String {
    format!("{value}L")
}

/// Formats an address as `0x%lX`.
pub(crate) fn format_pointer(address: usize) -> String {
    format!("0x{address:X}")
}

fn trim_fraction(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}
