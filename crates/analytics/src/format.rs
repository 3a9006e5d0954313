//! Display formatters for prices, percentages, volumes, dates and durations.
//!
//! Every formatter is total: missing input renders as a fixed zero-equivalent
//! string and nothing here panics. Amounts use the Indian digit grouping
//! (`1,23,45,678.90`) and the compact suffixes K (thousand), L (lakh) and
//! Cr (crore). Rounding is half away from zero.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use core_types::{Exchange, MarketStatus};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::change::price_change;

pub const RUPEE: &str = "₹";

const CRORE: i64 = 10_000_000;
const LAKH: i64 = 100_000;
const THOUSAND: i64 = 1_000;
const THOUSAND_CRORE: i64 = 10_000_000_000;
const LAKH_CRORE: i64 = 1_000_000_000_000;
const MAX_EXPONENT: u32 = 28;

/// Options for [`format_currency`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrencyFormat {
    pub compact: bool,
    pub hide_symbol: bool,
    pub decimals: u32,
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        Self {
            compact: false,
            hide_symbol: false,
            decimals: 2,
        }
    }
}

impl CurrencyFormat {
    pub fn compact() -> Self {
        Self {
            compact: true,
            ..Self::default()
        }
    }
}

/// Options for [`format_percentage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PercentFormat {
    /// The input is a fraction (`0.05` means 5%).
    pub is_decimal: bool,
    pub decimals: u32,
}

impl Default for PercentFormat {
    fn default() -> Self {
        Self {
            is_decimal: false,
            decimals: 2,
        }
    }
}

/// Options for [`format_number`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NumberFormat {
    pub compact: bool,
    pub decimals: u32,
}

/// Options for [`format_date`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateFormat {
    /// Day and abbreviated month only ("18 Oct").
    pub short: bool,
    /// Append the time of day.
    pub time: bool,
}

/// Formats a currency amount, e.g. `₹1,23,456.70` or `₹1.3Cr` in compact mode.
pub fn format_currency(value: Option<Decimal>, options: CurrencyFormat) -> String {
    let Some(value) = value else {
        return format!("{RUPEE}0.00");
    };
    let symbol = if options.hide_symbol { "" } else { RUPEE };

    if options.compact {
        if let Some(compact) = compact_suffix(value) {
            return format!("{symbol}{compact}");
        }
    }

    let sign = if is_negative_after_rounding(value, options.decimals) { "-" } else { "" };
    format!("{sign}{symbol}{}", group_indian(value.abs(), options.decimals))
}

/// Formats a percentage with a trailing `%`.
pub fn format_percentage(value: Option<Decimal>, options: PercentFormat) -> String {
    let Some(value) = value else {
        return "0.00%".to_string();
    };
    let percentage = if options.is_decimal {
        value.checked_mul(Decimal::ONE_HUNDRED).unwrap_or(value)
    } else {
        value
    };
    format!("{}%", to_fixed(percentage, options.decimals))
}

/// Formats a plain number with Indian grouping, or with K/L/Cr in compact mode.
pub fn format_number(value: Option<Decimal>, options: NumberFormat) -> String {
    let Some(value) = value else {
        return "0".to_string();
    };

    if options.compact {
        if let Some(compact) = compact_suffix(value) {
            return compact;
        }
    }

    let sign = if is_negative_after_rounding(value, options.decimals) { "-" } else { "" };
    format!("{sign}{}", group_indian(value.abs(), options.decimals))
}

/// Formats a traded volume, always compacting at a thousand and above.
pub fn format_volume(volume: Option<i64>) -> String {
    match volume {
        None | Some(0) => "0".to_string(),
        Some(v) => compact_suffix(Decimal::from(v)).unwrap_or_else(|| {
            let sign = if v < 0 { "-" } else { "" };
            format!("{sign}{}", group_indian(Decimal::from(v).abs(), 0))
        }),
    }
}

/// Formats a market capitalization in lakh-crore / thousand-crore / crore / lakh words.
pub fn format_market_cap(market_cap: Option<i64>) -> String {
    let cap = match market_cap {
        None | Some(0) => return format!("{RUPEE}0"),
        Some(cap) => cap,
    };
    let value = Decimal::from(cap);

    if cap >= LAKH_CRORE {
        format!("{RUPEE}{} Lakh Cr", to_fixed(value / Decimal::from(LAKH_CRORE), 2))
    } else if cap >= THOUSAND_CRORE {
        format!("{RUPEE}{} Thousand Cr", to_fixed(value / Decimal::from(THOUSAND_CRORE), 0))
    } else if cap >= CRORE {
        format!("{RUPEE}{} Cr", to_fixed(value / Decimal::from(CRORE), 0))
    } else if cap >= LAKH {
        format!("{RUPEE}{} L", to_fixed(value / Decimal::from(LAKH), 1))
    } else {
        format_currency(Some(value), CurrencyFormat::compact())
    }
}

/// A price change rendered for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedChange {
    pub absolute: String,
    pub percentage: String,
    pub is_positive: bool,
    pub is_neutral: bool,
}

/// Formats the change between two prices, e.g. `+₹10.00` / `+10.00%`.
pub fn format_price_change(current: Option<Decimal>, previous: Option<Decimal>) -> FormattedChange {
    let change = price_change(current, previous);
    let sign = if change.is_positive && !change.is_neutral { "+" } else { "" };

    FormattedChange {
        absolute: format!("{sign}{}", format_currency(Some(change.absolute), CurrencyFormat::default())),
        percentage: format!(
            "{sign}{}",
            format_percentage(Some(change.percentage), PercentFormat::default())
        ),
        is_positive: change.is_positive,
        is_neutral: change.is_neutral,
    }
}

/// Formats a date given as text (`YYYY-MM-DD`, `YYYY-MM-DDTHH:MM:SS` or RFC 3339).
///
/// Missing input gives `"N/A"`; input that is not a date gives `"Invalid Date"`.
pub fn format_date(input: Option<&str>, options: DateFormat) -> String {
    let Some(raw) = input.map(str::trim).filter(|s| !s.is_empty()) else {
        return "N/A".to_string();
    };
    match parse_date_time(raw) {
        Some(dt) => format_date_time(dt, options),
        None => "Invalid Date".to_string(),
    }
}

/// Formats a calendar date, e.g. `18 October 2026` or `18 Oct`.
pub fn format_naive_date(date: NaiveDate, options: DateFormat) -> String {
    format_date_time(date.and_time(NaiveTime::MIN), options)
}

fn format_date_time(dt: NaiveDateTime, options: DateFormat) -> String {
    if options.short {
        return dt.format("%-d %b").to_string();
    }
    if options.time {
        return dt.format("%-d %B %Y at %I:%M %P").to_string();
    }
    dt.format("%-d %B %Y").to_string()
}

fn parse_date_time(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    for pattern in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, pattern) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
}

/// Renders a duration in milliseconds with its two most significant units.
pub fn format_duration(milliseconds: Option<i64>) -> String {
    let millis = match milliseconds {
        Some(ms) if ms > 0 => ms,
        _ => return "0s".to_string(),
    };

    let seconds = millis / 1000;
    let minutes = seconds / 60;
    let hours = minutes / 60;
    let days = hours / 24;

    if days > 0 {
        format!("{days}d {}h", hours % 24)
    } else if hours > 0 {
        format!("{hours}h {}m", minutes % 60)
    } else if minutes > 0 {
        format!("{minutes}m {}s", seconds % 60)
    } else {
        format!("{seconds}s")
    }
}

/// Colour family a status label is shown in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Positive,
    Negative,
    Caution,
    Info,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusLabel {
    pub text: String,
    pub tone: Tone,
}

/// Maps a market status code to its label. Unknown codes are shown verbatim.
pub fn format_market_status(status: &str) -> StatusLabel {
    let (text, tone) = match MarketStatus::from_str(status) {
        Ok(MarketStatus::Open) => ("Market Open", Tone::Positive),
        Ok(MarketStatus::Closed) => ("Market Closed", Tone::Negative),
        Ok(MarketStatus::PreOpen) => ("Pre-Open", Tone::Caution),
        Ok(MarketStatus::PostClose) => ("After Hours", Tone::Info),
        Err(_) => (status, Tone::Neutral),
    };
    StatusLabel {
        text: text.to_string(),
        tone,
    }
}

/// Expands an exact exchange code (`"NSE"`) to its full name; anything else passes through.
pub fn format_exchange(code: &str) -> String {
    [Exchange::Nse, Exchange::Bse, Exchange::Mcx]
        .into_iter()
        .find(|exchange| exchange.code() == code)
        .map(|exchange| exchange.full_name().to_string())
        .unwrap_or_else(|| code.to_string())
}

/// Parses the leading number out of `raw` (`"45"`, `" 12.5kg"`, `"1e5"`), or returns `fallback`.
///
/// An exponent is only taken when at least one digit follows it, so `"2e"` reads as 2.
pub fn sanitize_number(raw: &str, fallback: Decimal) -> Decimal {
    let trimmed = raw.trim_start();
    let bytes = trimmed.as_bytes();
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;

    while end < bytes.len() {
        match bytes[end] {
            b'+' | b'-' if end == 0 => {}
            b'0'..=b'9' => seen_digit = true,
            b'.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end += 1;
    }

    if !seen_digit {
        return fallback;
    }
    let mantissa = trimmed[..end].trim_end_matches('.');

    let Ok(number) = Decimal::from_str(mantissa) else {
        return fallback;
    };
    match exponent_len(&bytes[end..]) {
        Some(len) => scale_by_exponent(number, &trimmed[end + 1..end + len]).unwrap_or(fallback),
        None => number,
    }
}

/// Multiplies `number` by `10^exponent`; `None` when the result leaves Decimal's range.
fn scale_by_exponent(number: Decimal, exponent: &str) -> Option<Decimal> {
    let negative = exponent.starts_with('-');
    let magnitude: u32 = exponent.trim_start_matches(['+', '-']).parse().ok()?;
    if magnitude > MAX_EXPONENT {
        return None;
    }
    let power = Decimal::from_i128_with_scale(10_i128.pow(magnitude), 0);
    if negative {
        number.checked_div(power)
    } else {
        number.checked_mul(power)
    }
}

/// Length of an `e[+-]digits` suffix at the start of `rest`.
fn exponent_len(rest: &[u8]) -> Option<usize> {
    if !matches!(rest.first(), Some(b'e' | b'E')) {
        return None;
    }
    let sign = usize::from(matches!(rest.get(1), Some(b'+' | b'-')));
    let digits = rest[1 + sign..].iter().take_while(|b| b.is_ascii_digit()).count();
    (digits > 0).then_some(1 + sign + digits)
}

/// Converts a float to a Decimal, mapping NaN and infinities to `None`.
pub fn decimal_from_f64(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    Decimal::from_str(&value.to_string())
        .ok()
        .or_else(|| Decimal::from_f64(value))
}

/// `value` rounded to `decimals` places and padded with trailing zeros.
fn to_fixed(value: Decimal, decimals: u32) -> String {
    let rounded = value.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.*}", decimals as usize, rounded)
}

fn is_negative_after_rounding(value: Decimal, decimals: u32) -> bool {
    value.is_sign_negative()
        && !value
            .round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero)
            .is_zero()
}

/// K/L/Cr rendering with one decimal, or `None` below a thousand.
fn compact_suffix(value: Decimal) -> Option<String> {
    let (divisor, suffix) = if value >= Decimal::from(CRORE) {
        (CRORE, "Cr")
    } else if value >= Decimal::from(LAKH) {
        (LAKH, "L")
    } else if value >= Decimal::from(THOUSAND) {
        (THOUSAND, "K")
    } else {
        return None;
    };
    Some(format!("{}{suffix}", to_fixed(value / Decimal::from(divisor), 1)))
}

/// Groups the integer part of a non-negative amount as 12,34,56,789.
fn group_indian(value: Decimal, decimals: u32) -> String {
    let fixed = to_fixed(value, decimals);
    let (integer, fraction) = match fixed.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (fixed.as_str(), None),
    };

    let grouped = if integer.len() <= 3 {
        integer.to_string()
    } else {
        let (head, last_three) = integer.split_at(integer.len() - 3);
        let mut groups: Vec<&str> = Vec::new();
        let mut rest = head;
        while rest.len() > 2 {
            let (left, pair) = rest.split_at(rest.len() - 2);
            groups.push(pair);
            rest = left;
        }
        if !rest.is_empty() {
            groups.push(rest);
        }
        groups.reverse();
        format!("{},{last_three}", groups.join(","))
    };

    match fraction {
        Some(fraction) => format!("{grouped}.{fraction}"),
        None => grouped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn currency_uses_indian_grouping() {
        assert_eq!(format_currency(Some(dec!(1234567.891)), CurrencyFormat::default()), "₹12,34,567.89");
        assert_eq!(format_currency(Some(dec!(999)), CurrencyFormat::default()), "₹999.00");
        assert_eq!(format_currency(Some(dec!(0)), CurrencyFormat::default()), "₹0.00");
        assert_eq!(format_currency(Some(dec!(-1234.5)), CurrencyFormat::default()), "-₹1,234.50");
    }

    #[test]
    fn currency_compact_thresholds() {
        let compact = CurrencyFormat::compact();
        assert_eq!(format_currency(Some(dec!(12500000)), compact), "₹1.3Cr");
        assert_eq!(format_currency(Some(dec!(250000)), compact), "₹2.5L");
        assert_eq!(format_currency(Some(dec!(1500)), compact), "₹1.5K");
        assert_eq!(format_currency(Some(dec!(999.5)), compact), "₹999.50");
    }

    #[test]
    fn currency_options_and_missing_values() {
        assert_eq!(format_currency(None, CurrencyFormat::default()), "₹0.00");
        let hidden = CurrencyFormat {
            hide_symbol: true,
            decimals: 0,
            ..CurrencyFormat::default()
        };
        assert_eq!(format_currency(Some(dec!(1234.5)), hidden), "1,235");
    }

    #[test]
    fn percentages() {
        assert_eq!(format_percentage(Some(dec!(10)), PercentFormat::default()), "10.00%");
        assert_eq!(format_percentage(Some(dec!(-3.14159)), PercentFormat::default()), "-3.14%");
        let fraction = PercentFormat {
            is_decimal: true,
            decimals: 1,
        };
        assert_eq!(format_percentage(Some(dec!(0.0525)), fraction), "5.3%");
        assert_eq!(format_percentage(None, PercentFormat::default()), "0.00%");
    }

    #[test]
    fn numbers_and_volumes() {
        assert_eq!(format_number(Some(dec!(12345678)), NumberFormat::default()), "1,23,45,678");
        assert_eq!(
            format_number(Some(dec!(4567)), NumberFormat { compact: true, decimals: 0 }),
            "4.6K"
        );
        assert_eq!(format_number(None, NumberFormat::default()), "0");
        assert_eq!(format_volume(Some(0)), "0");
        assert_eq!(format_volume(None), "0");
        assert_eq!(format_volume(Some(950)), "950");
        assert_eq!(format_volume(Some(45_000_000)), "4.5Cr");
    }

    #[test]
    fn market_cap_words() {
        assert_eq!(format_market_cap(None), "₹0");
        assert_eq!(format_market_cap(Some(1_800_000_000_000)), "₹1.80 Lakh Cr");
        assert_eq!(format_market_cap(Some(65_000_000_000)), "₹7 Thousand Cr");
        assert_eq!(format_market_cap(Some(250_000_000)), "₹25 Cr");
        assert_eq!(format_market_cap(Some(350_000)), "₹3.5 L");
        assert_eq!(format_market_cap(Some(5_000)), "₹5.0K");
    }

    #[test]
    fn price_change_strings() {
        let up = format_price_change(Some(dec!(110)), Some(dec!(100)));
        assert_eq!(up.absolute, "+₹10.00");
        assert_eq!(up.percentage, "+10.00%");

        let down = format_price_change(Some(dec!(90)), Some(dec!(100)));
        assert_eq!(down.absolute, "-₹10.00");
        assert_eq!(down.percentage, "-10.00%");
        assert!(!down.is_positive);

        let missing = format_price_change(None, Some(dec!(100)));
        assert_eq!(missing.absolute, "₹0.00");
        assert_eq!(missing.percentage, "0.00%");
        assert!(missing.is_neutral);
    }

    #[test]
    fn dates() {
        assert_eq!(format_date(Some("2026-10-18"), DateFormat::default()), "18 October 2026");
        assert_eq!(
            format_date(Some("2026-10-18"), DateFormat { short: true, time: false }),
            "18 Oct"
        );
        assert_eq!(
            format_date(Some("2026-10-18T14:30:00"), DateFormat { short: false, time: true }),
            "18 October 2026 at 02:30 pm"
        );
        assert_eq!(format_date(None, DateFormat::default()), "N/A");
        assert_eq!(format_date(Some("  "), DateFormat::default()), "N/A");
        assert_eq!(format_date(Some("yesterday"), DateFormat::default()), "Invalid Date");
        assert_eq!(
            format_naive_date(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(), DateFormat::default()),
            "5 January 2024"
        );
    }

    #[test]
    fn durations() {
        assert_eq!(format_duration(None), "0s");
        assert_eq!(format_duration(Some(-5)), "0s");
        assert_eq!(format_duration(Some(5_400)), "5s");
        assert_eq!(format_duration(Some(61_000)), "1m 1s");
        assert_eq!(format_duration(Some(3_661_000)), "1h 1m");
        assert_eq!(format_duration(Some(90_000_000)), "1d 1h");
    }

    #[test]
    fn statuses_and_exchanges() {
        assert_eq!(format_market_status("OPEN").text, "Market Open");
        assert_eq!(format_market_status("POST_CLOSE").tone, Tone::Info);
        let unknown = format_market_status("HALTED");
        assert_eq!(unknown.text, "HALTED");
        assert_eq!(unknown.tone, Tone::Neutral);

        assert_eq!(format_exchange("NSE"), "National Stock Exchange");
        assert_eq!(format_exchange("NASDAQ"), "NASDAQ");
        // Only exact codes expand.
        assert_eq!(format_exchange("nse"), "nse");
        assert_eq!(format_exchange(" BSE"), " BSE");
    }

    #[test]
    fn sanitizing_numbers() {
        assert_eq!(sanitize_number("45", Decimal::ZERO), dec!(45));
        assert_eq!(sanitize_number(" 12.5kg", Decimal::ZERO), dec!(12.5));
        assert_eq!(sanitize_number("-3.", Decimal::ZERO), dec!(-3));
        assert_eq!(sanitize_number("abc", dec!(7)), dec!(7));
        assert_eq!(sanitize_number("", Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn sanitize_number_reads_exponents() {
        assert_eq!(sanitize_number("1e5", Decimal::ZERO), dec!(100000));
        assert_eq!(sanitize_number("2.5E-3 units", Decimal::ZERO), dec!(0.0025));
        assert_eq!(sanitize_number("-4e+2", Decimal::ZERO), dec!(-400));
        assert_eq!(sanitize_number("2e", Decimal::ZERO), dec!(2));
        assert_eq!(sanitize_number("3.e1", Decimal::ZERO), dec!(30));
        assert_eq!(sanitize_number("1e400", dec!(9)), dec!(9));

        assert_eq!(decimal_from_f64(f64::NAN), None);
        assert_eq!(decimal_from_f64(f64::INFINITY), None);
        assert_eq!(decimal_from_f64(0.1), Some(dec!(0.1)));
    }
}
