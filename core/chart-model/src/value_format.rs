//! FILENAME: core/chart-model/src/value_format.rs
//! PURPOSE: Number formatting for axis ticks and data labels.
//! CONTEXT: A formatter is built once per axis (or per label set) from the
//! user's value-type, display-unit and decimal preferences plus the measure's
//! source format string. The reference magnitude (largest absolute value in
//! view) picks the automatic unit so every tick on an axis shares a suffix.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::category::number_to_string;

/// Upper bound on explicit decimal places.
pub const MAX_DECIMALS: u8 = 9;

static DECIMAL_RUN: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"\.0+").ok());

#[derive(Debug, Error, PartialEq)]
pub enum FormatError {
    #[error("no symbol known for currency code '{0}'")]
    UnsupportedCurrency(String),
}

// ============================================================================
// OPTIONS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    #[default]
    Auto,
    Number,
    Currency,
    Percent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DisplayUnits {
    #[default]
    Auto,
    None,
    Thousands,
    Millions,
    Billions,
    Trillions,
}

impl DisplayUnits {
    /// Divisor and suffix for this unit. `Auto` picks the largest unit that
    /// does not exceed `reference`.
    pub fn resolve(&self, reference: f64) -> (f64, &'static str) {
        match self {
            DisplayUnits::None => (1.0, ""),
            DisplayUnits::Thousands => (1e3, "K"),
            DisplayUnits::Millions => (1e6, "M"),
            DisplayUnits::Billions => (1e9, "B"),
            DisplayUnits::Trillions => (1e12, "T"),
            DisplayUnits::Auto => {
                let r = reference.abs();
                if r >= 1e12 {
                    (1e12, "T")
                } else if r >= 1e9 {
                    (1e9, "B")
                } else if r >= 1e6 {
                    (1e6, "M")
                } else if r >= 1e3 {
                    (1e3, "K")
                } else {
                    (1.0, "")
                }
            }
        }
    }
}

/// Decimal places: automatic, or a fixed count capped at [`MAX_DECIMALS`].
/// The host sends either `"auto"`, a numeric string, or a bare number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(from = "DecimalsRepr", into = "DecimalsRepr")]
pub enum Decimals {
    #[default]
    Auto,
    Fixed(u8),
}

impl Decimals {
    pub fn fixed(&self) -> Option<usize> {
        match self {
            Decimals::Auto => None,
            Decimals::Fixed(n) => Some((*n).min(MAX_DECIMALS) as usize),
        }
    }

    fn from_number(n: f64) -> Self {
        if n.is_finite() {
            Decimals::Fixed(n.clamp(0.0, MAX_DECIMALS as f64) as u8)
        } else {
            Decimals::Auto
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum DecimalsRepr {
    Number(f64),
    Text(String),
}

impl From<DecimalsRepr> for Decimals {
    fn from(repr: DecimalsRepr) -> Self {
        match repr {
            DecimalsRepr::Number(n) => Decimals::from_number(n),
            DecimalsRepr::Text(s) => match s.trim().parse::<f64>() {
                Ok(n) => Decimals::from_number(n),
                Err(_) => Decimals::Auto,
            },
        }
    }
}

impl From<Decimals> for DecimalsRepr {
    fn from(d: Decimals) -> Self {
        match d {
            Decimals::Auto => DecimalsRepr::Text("auto".to_string()),
            Decimals::Fixed(n) => DecimalsRepr::Number(n as f64),
        }
    }
}

fn default_currency_code() -> String {
    "USD".to_string()
}

/// Everything a formatter needs besides the reference magnitude.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatOptions {
    #[serde(default)]
    pub value_type: ValueType,
    #[serde(default)]
    pub display_units: DisplayUnits,
    #[serde(default)]
    pub decimals: Decimals,
    /// Used when `value_type` is `Currency`.
    #[serde(default = "default_currency_code")]
    pub currency_code: String,
    /// The measure's own format string (e.g. `"$#,0.00"`). Only consulted
    /// when `value_type` is `Auto`.
    #[serde(default)]
    pub source_format: Option<String>,
}

impl Default for FormatOptions {
    fn default() -> Self {
        FormatOptions {
            value_type: ValueType::Auto,
            display_units: DisplayUnits::Auto,
            decimals: Decimals::Auto,
            currency_code: default_currency_code(),
            source_format: None,
        }
    }
}

// ============================================================================
// FORMATTER
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
enum Style<'a> {
    Number,
    Currency(&'a str),
    Percent,
}

/// Formats values against a fixed reference magnitude.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueFormatter {
    options: FormatOptions,
    reference: f64,
}

impl ValueFormatter {
    pub fn new(options: FormatOptions, reference: f64) -> Self {
        let reference = if reference.is_finite() { reference.abs() } else { 0.0 };
        ValueFormatter { options, reference }
    }

    pub fn options(&self) -> &FormatOptions {
        &self.options
    }

    pub fn reference(&self) -> f64 {
        self.reference
    }

    /// Formats a value, falling back to plain fixed decimals if the styled
    /// form cannot be produced. Non-finite input yields an empty string.
    pub fn format(&self, value: f64) -> String {
        match self.try_format(value) {
            Ok(s) => s,
            Err(_) => self.format_fixed(value),
        }
    }

    pub fn try_format(&self, value: f64) -> Result<String, FormatError> {
        if !value.is_finite() {
            return Ok(String::new());
        }

        match (&self.options.value_type, &self.options.source_format) {
            (ValueType::Auto, Some(source)) => self.format_with_source(value, source),
            _ => self.format_explicit(value),
        }
    }

    fn format_explicit(&self, value: f64) -> Result<String, FormatError> {
        let (divisor, suffix) = self.options.display_units.resolve(self.reference);
        let base = value / divisor;
        let decimals = self.options.decimals.fixed();

        let formatted = match self.options.value_type {
            ValueType::Currency => {
                let symbol = currency_symbol(&self.options.currency_code)?;
                format_currency(base, decimals.unwrap_or(2), symbol)
            }
            ValueType::Percent => {
                // Values above 1 are already percentages.
                let fraction = if base.abs() <= 1.0 { base } else { base / 100.0 };
                format_percentage(fraction, decimals.unwrap_or(0))
            }
            ValueType::Auto | ValueType::Number => {
                self.format_number(base, decimals, self.reference / divisor)
            }
        };

        Ok(format!("{}{}", formatted, suffix))
    }

    fn format_with_source(&self, value: f64, source: &str) -> Result<String, FormatError> {
        // Units only apply when pinned; the source format governs otherwise.
        let (divisor, suffix) = match self.options.display_units {
            DisplayUnits::Auto => (1.0, ""),
            units => units.resolve(self.reference),
        };
        let base = value / divisor;
        let decimals = self
            .options
            .decimals
            .fixed()
            .or_else(|| decimals_in_format(source));

        let formatted = match detect_style(source) {
            Style::Currency(code) => {
                let symbol = currency_symbol(code)?;
                format_currency(base, decimals.unwrap_or(2), symbol)
            }
            Style::Percent => format_percentage(base, decimals.unwrap_or(0)),
            Style::Number => self.format_number(base, decimals, self.reference / divisor),
        };

        Ok(format!("{}{}", formatted, suffix))
    }

    fn format_number(&self, value: f64, decimals: Option<usize>, magnitude: f64) -> String {
        match decimals {
            Some(places) => format_decimal(value, places),
            None => {
                let places = auto_decimals(magnitude.max(value.abs()));
                let rounded = format!("{:.prec$}", value, prec = places);
                add_thousands_separator(&trim_fraction(&rounded))
            }
        }
    }

    fn format_fixed(&self, value: f64) -> String {
        if !value.is_finite() {
            return String::new();
        }
        let (divisor, suffix) = self.options.display_units.resolve(self.reference);
        let base = value / divisor;
        let body = match self.options.decimals.fixed() {
            Some(places) => format!("{:.prec$}", base, prec = places),
            None => number_to_string(base),
        };
        format!("{}{}", body, suffix)
    }
}

/// Fraction digits when none were requested, from the unit-adjusted magnitude.
fn auto_decimals(magnitude: f64) -> usize {
    if magnitude >= 100.0 {
        0
    } else if magnitude >= 10.0 {
        1
    } else if magnitude >= 1.0 {
        2
    } else {
        3
    }
}

fn detect_style(format: &str) -> Style<'static> {
    if format.contains('$') {
        Style::Currency("USD")
    } else if format.contains('€') {
        Style::Currency("EUR")
    } else if format.contains('£') {
        Style::Currency("GBP")
    } else if format.contains('%') {
        Style::Percent
    } else {
        Style::Number
    }
}

/// Number of zeros after the decimal point in a format string like `"#,0.00"`.
/// A digit pattern without a fractional run (`"#,0"`) means whole numbers.
fn decimals_in_format(format: &str) -> Option<usize> {
    let re = DECIMAL_RUN.as_ref()?;
    match re.find(format) {
        Some(m) => Some((m.as_str().len() - 1).min(MAX_DECIMALS as usize)),
        None if format.contains('0') || format.contains('#') => Some(0),
        None => None,
    }
}

fn currency_symbol(code: &str) -> Result<&'static str, FormatError> {
    match code.to_ascii_uppercase().as_str() {
        "USD" => Ok("$"),
        "EUR" => Ok("€"),
        "GBP" => Ok("£"),
        "JPY" => Ok("¥"),
        _ => Err(FormatError::UnsupportedCurrency(code.to_string())),
    }
}

fn format_decimal(value: f64, decimal_places: usize) -> String {
    add_thousands_separator(&format!("{:.prec$}", value, prec = decimal_places))
}

/// Removes trailing fractional zeros (and a dangling point).
fn trim_fraction(s: &str) -> String {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s.to_string()
    }
}

/// Add thousands separators to a numeric string.
fn add_thousands_separator(s: &str) -> String {
    let (integer_part, decimal_part) = match s.split_once('.') {
        Some((int, dec)) => (int, Some(dec)),
        None => (s, None),
    };

    let negative = integer_part.starts_with('-');
    let digits: String = integer_part.chars().filter(|c| c.is_ascii_digit()).collect();

    let mut result = String::new();
    let len = digits.len();

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }

    // "-0" after rounding reads as zero
    let nonzero = digits.chars().any(|c| c != '0')
        || decimal_part.is_some_and(|d| d.chars().any(|c| c != '0'));
    if negative && nonzero {
        result.insert(0, '-');
    }

    if let Some(decimal) = decimal_part {
        result.push('.');
        result.push_str(decimal);
    }

    result
}

fn format_currency(value: f64, decimal_places: usize, symbol: &str) -> String {
    let formatted = format_decimal(value.abs(), decimal_places);
    if value < 0.0 && formatted.chars().any(|c| c.is_ascii_digit() && c != '0') {
        format!("-{}{}", symbol, formatted)
    } else {
        format!("{}{}", symbol, formatted)
    }
}

/// `fraction` of 0.25 renders as "25%".
fn format_percentage(fraction: f64, decimal_places: usize) -> String {
    format!("{}%", format_decimal(fraction * 100.0, decimal_places))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn formatter(options: FormatOptions, reference: f64) -> ValueFormatter {
        ValueFormatter::new(options, reference)
    }

    #[test]
    fn test_auto_units_follow_reference() {
        let f = formatter(FormatOptions::default(), 2_500_000.0);
        assert_eq!(f.format(2_500_000.0), "2.5M");
        assert_eq!(f.format(0.0), "0M");

        let small = formatter(FormatOptions::default(), 950.0);
        assert_eq!(small.format(950.0), "950");
    }

    #[test]
    fn test_pinned_units_and_decimals() {
        let options = FormatOptions {
            value_type: ValueType::Number,
            display_units: DisplayUnits::Thousands,
            decimals: Decimals::Fixed(1),
            ..Default::default()
        };
        let f = formatter(options, 10.0);
        assert_eq!(f.format(12_345.0), "12.3K");
        assert_eq!(f.format(1_234_567.0), "1,234.6K");
    }

    #[test]
    fn test_thousands_grouping() {
        let options = FormatOptions {
            display_units: DisplayUnits::None,
            decimals: Decimals::Fixed(2),
            ..Default::default()
        };
        let f = formatter(options, 1e6);
        assert_eq!(f.format(1_234_567.891), "1,234,567.89");
        assert_eq!(f.format(-1_234.5), "-1,234.50");
    }

    #[test]
    fn test_currency() {
        let options = FormatOptions {
            value_type: ValueType::Currency,
            display_units: DisplayUnits::None,
            ..Default::default()
        };
        let f = formatter(options, 5000.0);
        assert_eq!(f.format(1234.5), "$1,234.50");
        assert_eq!(f.format(-20.0), "-$20.00");
    }

    #[test]
    fn test_unsupported_currency_falls_back() {
        let options = FormatOptions {
            value_type: ValueType::Currency,
            display_units: DisplayUnits::None,
            decimals: Decimals::Fixed(1),
            currency_code: "XYZ".to_string(),
            ..Default::default()
        };
        let f = formatter(options, 10.0);
        assert_eq!(
            f.try_format(3.14159),
            Err(FormatError::UnsupportedCurrency("XYZ".to_string()))
        );
        assert_eq!(f.format(3.14159), "3.1");
    }

    #[test]
    fn test_percent_accepts_fractions_and_whole_percentages() {
        let options = FormatOptions {
            value_type: ValueType::Percent,
            display_units: DisplayUnits::None,
            ..Default::default()
        };
        let f = formatter(options, 1.0);
        assert_eq!(f.format(0.25), "25%");
        assert_eq!(f.format(45.0), "45%");
    }

    #[test]
    fn test_source_format_inference() {
        let options = FormatOptions {
            source_format: Some("$#,0.00".to_string()),
            ..Default::default()
        };
        // Auto units are ignored when a source format drives the output.
        let f = formatter(options, 2_000_000.0);
        assert_eq!(f.format(1_500_000.0), "$1,500,000.00");

        let pct = formatter(
            FormatOptions {
                source_format: Some("0.0%".to_string()),
                ..Default::default()
            },
            1.0,
        );
        assert_eq!(pct.format(0.123), "12.3%");
    }

    #[test]
    fn test_source_format_with_pinned_units() {
        let options = FormatOptions {
            display_units: DisplayUnits::Millions,
            source_format: Some("€#,0.0".to_string()),
            ..Default::default()
        };
        let f = formatter(options, 2_000_000.0);
        assert_eq!(f.format(1_500_000.0), "€1.5M");
    }

    #[test]
    fn test_explicit_type_overrides_source_format() {
        let options = FormatOptions {
            value_type: ValueType::Number,
            display_units: DisplayUnits::None,
            decimals: Decimals::Fixed(0),
            source_format: Some("$#,0.00".to_string()),
            ..Default::default()
        };
        assert_eq!(formatter(options, 100.0).format(42.4), "42");
    }

    #[test]
    fn test_non_finite_is_blank() {
        let f = formatter(FormatOptions::default(), 10.0);
        assert_eq!(f.format(f64::NAN), "");
        assert_eq!(f.format(f64::INFINITY), "");
    }

    #[test]
    fn test_decimals_deserialize_from_host_shapes() {
        let a: Decimals = serde_json::from_str(r#""auto""#).unwrap();
        let b: Decimals = serde_json::from_str(r#""2""#).unwrap();
        let c: Decimals = serde_json::from_str("4").unwrap();
        let d: Decimals = serde_json::from_str("42").unwrap();
        assert_eq!(a, Decimals::Auto);
        assert_eq!(b, Decimals::Fixed(2));
        assert_eq!(c, Decimals::Fixed(4));
        assert_eq!(d, Decimals::Fixed(MAX_DECIMALS));
    }

    #[test]
    fn test_options_deserialize_camel_case() {
        let json = r#"{"valueType":"currency","displayUnits":"thousands","decimals":"1"}"#;
        let options: FormatOptions = serde_json::from_str(json).unwrap();
        assert_eq!(options.value_type, ValueType::Currency);
        assert_eq!(options.display_units, DisplayUnits::Thousands);
        assert_eq!(options.decimals, Decimals::Fixed(1));
        assert_eq!(options.currency_code, "USD");
    }
}
