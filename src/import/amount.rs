//! Amount and date parsing shared by the importers.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::core::ConvertError;

/// Parse a CSV amount as displayed by the billing report into cents.
///
/// The report renders `€ 1.234,56`; currency symbol, thousands and decimal
/// separators and parentheses are all dropped and the remaining digits read
/// as cents. Sign handling for credit notes is up to the caller.
pub fn parse_csv_cents(raw: &str) -> Result<i64, ConvertError> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '€' | ',' | '.' | '(' | ')') && !c.is_whitespace())
        .collect();
    cleaned
        .parse::<i64>()
        .map_err(|_| ConvertError::Parse(format!("invalid amount '{raw}'")))
}

/// `true` when the CSV shows the amount in parentheses, i.e. already negative.
pub fn has_parenthesis(raw: &str) -> bool {
    raw.contains('(') || raw.contains(')')
}

/// Parse an XML decimal attribute, round it to 2 decimals and return cents.
///
/// Rounding is half-to-even on the exact decimal text, so `2.675` gives
/// `268`.
pub fn parse_xml_cents(raw: &str) -> Result<i64, ConvertError> {
    let value = Decimal::from_str(raw.trim())
        .or_else(|_| Decimal::from_scientific(raw.trim()))
        .map_err(|_| ConvertError::Parse(format!("invalid decimal '{raw}'")))?;
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);
    rounded
        .checked_mul(dec!(100))
        .and_then(|cents| cents.to_i64())
        .ok_or_else(|| ConvertError::Parse(format!("amount out of range '{raw}'")))
}

/// Parse a `dd/mm/yyyy` date.
pub fn parse_csv_date(raw: &str) -> Result<NaiveDate, ConvertError> {
    NaiveDate::parse_from_str(raw.trim(), "%d/%m/%Y")
        .map_err(|_| ConvertError::Parse(format!("invalid date '{raw}', expected dd/mm/yyyy")))
}

/// Parse an ISO-8601 date or date-time, keeping the calendar date.
pub fn parse_iso_date(raw: &str) -> Result<NaiveDate, ConvertError> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(dt.date());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| ConvertError::Parse(format!("invalid ISO-8601 date '{raw}'")))
}
