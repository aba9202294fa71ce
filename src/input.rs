//! Volume input normalisation: turn whatever a user typed into a daily volume.
//!
//! Bad input never fails. Non-numeric text reads as zero, negatives clamp
//! to zero while typing, and committing a field (focus leaves it) snaps the
//! value to the nearest 500-request step with 500 as the minimum.

/// Granularity of committed daily volumes, and their minimum.
pub const DAILY_STEP: u64 = 500;

/// Upper end of the daily-volume slider.
pub const SLIDER_MAX_DAILY: u64 = 50_000;

/// Which field the text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeField {
    Daily,
    Monthly,
}

/// Whether the value is still being edited or has been committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputPhase {
    Editing,
    Committed,
}

/// Resolve raw field text to a daily volume.
pub fn normalize(field: VolumeField, phase: InputPhase, text: &str, days_per_month: u64) -> u64 {
    let value = parse_leading_int(text);
    match (field, phase) {
        (VolumeField::Daily, InputPhase::Editing) => clamp_non_negative(value),
        (VolumeField::Daily, InputPhase::Committed) => snap_daily(value),
        (VolumeField::Monthly, InputPhase::Editing) => daily_from_monthly(value, days_per_month),
        (VolumeField::Monthly, InputPhase::Committed) => {
            snap_daily_from_monthly(value, days_per_month)
        }
    }
}

/// Non-negative integer prefix of `text`, `0` when there is none.
pub fn parse_volume(text: &str) -> u64 {
    clamp_non_negative(parse_leading_int(text))
}

/// `max(500, round(value / 500) × 500)`, rounding half up.
pub fn snap_daily(value: i64) -> u64 {
    let v = clamp_non_negative(value);
    let steps = round_div(u128::from(v), u128::from(DAILY_STEP));
    to_u64(steps * u128::from(DAILY_STEP)).max(DAILY_STEP)
}

/// `floor(value / days_per_month)`, clamped at zero.
pub fn daily_from_monthly(value: i64, days_per_month: u64) -> u64 {
    clamp_non_negative(value) / days_per_month.max(1)
}

/// `max(500, round(value / days_per_month / 500) × 500)`, rounding half up.
pub fn snap_daily_from_monthly(value: i64, days_per_month: u64) -> u64 {
    let v = u128::from(clamp_non_negative(value));
    let divisor = u128::from(days_per_month.max(1)) * u128::from(DAILY_STEP);
    to_u64(round_div(v, divisor) * u128::from(DAILY_STEP)).max(DAILY_STEP)
}

/// Keep a slider value inside `500..=50_000` on a 500 step.
pub fn clamp_slider(value: u64) -> u64 {
    let clamped = value.clamp(DAILY_STEP, SLIDER_MAX_DAILY);
    to_u64(round_div(u128::from(clamped), u128::from(DAILY_STEP)) * u128::from(DAILY_STEP))
}

fn clamp_non_negative(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

fn round_div(numerator: u128, denominator: u128) -> u128 {
    (2 * numerator + denominator) / (2 * denominator)
}

fn to_u64(value: u128) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}

/// Leading-integer parse: optional whitespace, optional sign, digits, then
/// anything. Saturates on overflow.
fn parse_leading_int(text: &str) -> i64 {
    let s = text.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let mut value: i64 = 0;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        let digit = i64::from(b - b'0');
        value = value.saturating_mul(10).saturating_add(digit);
    }
    if negative {
        -value
    } else {
        value
    }
}
