// Display strings for money and dates (en_US conventions)
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// How much of a timestamp to spell out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateStyle {
    /// "March 4, 2021 at 3:30 PM"
    Long,
    /// "3/4/21, 3:30 PM"
    Short,
}

pub fn format_date(date: &DateTime<Utc>, style: DateStyle) -> String {
    let pattern = match style {
        DateStyle::Long => "%B %-d, %Y at %-I:%M %p",
        DateStyle::Short => "%-m/%-d/%y, %-I:%M %p",
    };
    date.format(pattern).to_string()
}

fn currency_symbol(code: &str) -> Option<&'static str> {
    match code {
        "USD" => Some("$"),
        "EUR" => Some("€"),
        "GBP" => Some("£"),
        "JPY" => Some("¥"),
        "BRL" => Some("R$"),
        "CAD" => Some("CA$"),
        "AUD" => Some("A$"),
        "INR" => Some("₹"),
        _ => None,
    }
}

fn minor_units(code: &str) -> u32 {
    match code {
        "JPY" | "KRW" | "CLP" | "ISK" => 0,
        _ => 2,
    }
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Currency amount with symbol, grouping and the currency's minor units
///
/// Unknown codes fall back to "CODE 1,234.00".
pub fn format_amount(amount: Decimal, currency_code: &str) -> String {
    let code = currency_code.to_ascii_uppercase();
    let dp = minor_units(&code);

    let rounded = amount.round_dp(dp);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let mut magnitude = rounded.abs();
    magnitude.rescale(dp);

    let text = magnitude.to_string();
    let number = match text.split_once('.') {
        Some((int_part, frac)) => format!("{}.{}", group_thousands(int_part), frac),
        None => group_thousands(&text),
    };

    let body = match currency_symbol(&code) {
        Some(symbol) => format!("{}{}", symbol, number),
        None => format!("{} {}", code, number),
    };

    if negative {
        format!("-{}", body)
    } else {
        body
    }
}
