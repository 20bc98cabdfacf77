//! FILENAME: core/chart-model/src/category.rs
//! PURPOSE: Category keys and measure points as the engine sees them.
//! CONTEXT: The host hands us loosely typed cells (strings, numbers, dates,
//! wrapped `{ value }` objects). Everything is resolved into these types once
//! at ingestion so the aggregation code only deals with closed enums.

use serde::{Deserialize, Serialize};

const MILLIS_PER_DAY: i64 = 86_400_000;

// ============================================================================
// CATEGORY VALUE
// ============================================================================

/// One category cell: the key that identifies a bar at some hierarchy level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CategoryValue {
    Empty,
    Number(f64),
    Text(String),
    Boolean(bool),
    /// Milliseconds since the Unix epoch (UTC).
    Date(i64),
}

impl CategoryValue {
    pub fn text(s: impl Into<String>) -> Self {
        CategoryValue::Text(s.into())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CategoryValue::Empty)
    }

    /// Display label used on the category axis and in drill titles.
    pub fn label(&self) -> String {
        match self {
            CategoryValue::Empty => "(Blank)".to_string(),
            CategoryValue::Number(n) => number_to_string(*n),
            CategoryValue::Text(s) => s.clone(),
            CategoryValue::Boolean(b) => b.to_string(),
            CategoryValue::Date(ms) => match civil_date(ms.div_euclid(MILLIS_PER_DAY)) {
                Some((y, m, d)) => format!("{:04}-{:02}-{:02}", y, m, d),
                None => ms.to_string(),
            },
        }
    }

    /// The primitive a boxed host value unwraps to. Dates compare as their
    /// epoch milliseconds; everything else is already primitive.
    fn primitive(&self) -> Primitive<'_> {
        match self {
            CategoryValue::Empty => Primitive::Empty,
            CategoryValue::Number(n) => Primitive::Number(*n),
            CategoryValue::Date(ms) => Primitive::Number(*ms as f64),
            CategoryValue::Text(s) => Primitive::Text(s),
            CategoryValue::Boolean(b) => Primitive::Boolean(*b),
        }
    }
}

impl Default for CategoryValue {
    fn default() -> Self {
        CategoryValue::Empty
    }
}

impl From<&str> for CategoryValue {
    fn from(value: &str) -> Self {
        CategoryValue::Text(value.to_string())
    }
}

impl From<String> for CategoryValue {
    fn from(value: String) -> Self {
        CategoryValue::Text(value)
    }
}

impl From<f64> for CategoryValue {
    fn from(value: f64) -> Self {
        CategoryValue::Number(value)
    }
}

#[derive(Debug, PartialEq)]
enum Primitive<'a> {
    Empty,
    Number(f64),
    Text(&'a str),
    Boolean(bool),
}

impl Primitive<'_> {
    fn coerce_to_string(&self) -> Option<String> {
        match self {
            Primitive::Empty => None,
            Primitive::Number(n) if n.is_nan() => None,
            Primitive::Number(n) => Some(number_to_string(*n)),
            Primitive::Text(s) => Some((*s).to_string()),
            Primitive::Boolean(b) => Some(b.to_string()),
        }
    }
}

/// Compares two category keys the way a click on a bar must be matched back
/// to the rows that produced it.
///
/// Rules, applied in order until one matches:
/// 1. Strict equality: same variant and same payload. `Empty` only ever
///    equals `Empty`, and `NaN` never equals anything.
/// 2. Primitive equality: both sides unwrapped to primitives (a date becomes
///    its epoch milliseconds) and compared strictly.
/// 3. String equality: both primitives rendered as strings and compared.
///    `Empty` has no string form and never matches here.
pub fn category_key_equals(a: &CategoryValue, b: &CategoryValue) -> bool {
    if a == b {
        return true;
    }

    let pa = a.primitive();
    let pb = b.primitive();
    if pa == pb {
        return true;
    }

    match (pa.coerce_to_string(), pb.coerce_to_string()) {
        (Some(sa), Some(sb)) => sa == sb,
        _ => false,
    }
}

/// String form of a number without a trailing `.0` for integral values.
pub fn number_to_string(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{:.0}", n)
    } else {
        format!("{}", n)
    }
}

/// Converts days since 1970-01-01 into (year, month, day).
/// Returns None for dates before the epoch.
fn civil_date(days: i64) -> Option<(i32, u32, u32)> {
    if days < 0 {
        return None;
    }

    let mut remaining = days;
    let mut year = 1970i32;

    loop {
        let days_in_year = if is_leap_year(year) { 366 } else { 365 };
        if remaining < days_in_year {
            break;
        }
        remaining -= days_in_year;
        year += 1;
    }

    let months_days: [i64; 12] = if is_leap_year(year) {
        [31, 29, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31]
    } else {
        [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31]
    };

    let mut month = 1u32;
    for &days_in_month in &months_days {
        if remaining < days_in_month {
            return Some((year, month, remaining as u32 + 1));
        }
        remaining -= days_in_month;
        month += 1;
    }

    None
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

// ============================================================================
// CATEGORY KEY (HASHABLE)
// ============================================================================

/// Wrapper around f64 that implements Eq and Hash for use as map keys.
/// NaN values are treated as equal to each other.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OrderedFloat(pub f64);

impl PartialEq for OrderedFloat {
    fn eq(&self, other: &Self) -> bool {
        if self.0.is_nan() && other.0.is_nan() {
            true
        } else {
            self.0 == other.0
        }
    }
}

impl Eq for OrderedFloat {}

impl std::hash::Hash for OrderedFloat {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        if self.0.is_nan() {
            u64::MAX.hash(state);
        } else if self.0 == 0.0 {
            // 0.0 and -0.0 group together
            0u64.hash(state);
        } else {
            self.0.to_bits().hash(state);
        }
    }
}

/// Exact-identity grouping key. Two rows fall into the same bar only when
/// their keys are identical; the looser [`category_key_equals`] is reserved
/// for matching host clicks against existing keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CategoryKey {
    Empty,
    Number(OrderedFloat),
    Text(String),
    Boolean(bool),
    Date(i64),
}

impl From<&CategoryValue> for CategoryKey {
    fn from(value: &CategoryValue) -> Self {
        match value {
            CategoryValue::Empty => CategoryKey::Empty,
            CategoryValue::Number(n) => CategoryKey::Number(OrderedFloat(*n)),
            CategoryValue::Text(s) => CategoryKey::Text(s.clone()),
            CategoryValue::Boolean(b) => CategoryKey::Boolean(*b),
            CategoryValue::Date(ms) => CategoryKey::Date(*ms),
        }
    }
}

// ============================================================================
// NUMERIC POINT
// ============================================================================

/// A measure cell after ingestion: either a bare number or the host's
/// `{ "value": n }` wrapper.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericPoint {
    Plain(f64),
    Wrapped { value: f64 },
}

impl NumericPoint {
    /// The plain number, with non-finite values collapsed to 0.
    pub fn value(&self) -> f64 {
        let v = match self {
            NumericPoint::Plain(v) => *v,
            NumericPoint::Wrapped { value } => *value,
        };
        if v.is_finite() {
            v
        } else {
            0.0
        }
    }
}

impl From<f64> for NumericPoint {
    fn from(value: f64) -> Self {
        NumericPoint::Plain(value)
    }
}

/// Resolves an optional point to the number that enters a sum.
/// Missing points count as 0.
pub fn point_value(point: Option<NumericPoint>) -> f64 {
    point.map(|p| p.value()).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_equality() {
        assert!(category_key_equals(&"North".into(), &"North".into()));
        assert!(!category_key_equals(&"North".into(), &"South".into()));
        assert!(category_key_equals(&CategoryValue::Empty, &CategoryValue::Empty));
    }

    #[test]
    fn test_date_matches_its_epoch_number() {
        let date = CategoryValue::Date(1_704_067_200_000);
        let number = CategoryValue::Number(1_704_067_200_000.0);
        assert!(category_key_equals(&date, &number));
        assert!(category_key_equals(&number, &date));
    }

    #[test]
    fn test_string_fallback() {
        assert!(category_key_equals(&CategoryValue::Number(2024.0), &"2024".into()));
        assert!(category_key_equals(&CategoryValue::Boolean(true), &"true".into()));
        assert!(!category_key_equals(&CategoryValue::Number(2024.5), &"2024".into()));
    }

    #[test]
    fn test_empty_never_matches_text() {
        assert!(!category_key_equals(&CategoryValue::Empty, &"".into()));
        assert!(!category_key_equals(&CategoryValue::Empty, &"(Blank)".into()));
    }

    #[test]
    fn test_nan_never_equal() {
        let nan = CategoryValue::Number(f64::NAN);
        assert!(!category_key_equals(&nan, &nan.clone()));
    }

    #[test]
    fn test_labels() {
        assert_eq!(CategoryValue::Number(3.0).label(), "3");
        assert_eq!(CategoryValue::Number(3.25).label(), "3.25");
        assert_eq!(CategoryValue::Date(0).label(), "1970-01-01");
        assert_eq!(CategoryValue::Date(1_709_164_800_000).label(), "2024-02-29");
        assert_eq!(CategoryValue::Empty.label(), "(Blank)");
    }

    #[test]
    fn test_grouping_key_identity() {
        let a = CategoryKey::from(&CategoryValue::Number(0.0));
        let b = CategoryKey::from(&CategoryValue::Number(-0.0));
        assert_eq!(a, b);
        let t = CategoryKey::from(&CategoryValue::text("0"));
        assert_ne!(a, t);
    }

    #[test]
    fn test_numeric_point_resolution() {
        assert_eq!(point_value(Some(NumericPoint::Plain(5.0))), 5.0);
        assert_eq!(point_value(Some(NumericPoint::Wrapped { value: 7.5 })), 7.5);
        assert_eq!(point_value(Some(NumericPoint::Plain(f64::NAN))), 0.0);
        assert_eq!(point_value(None), 0.0);
    }

    #[test]
    fn test_numeric_point_deserialize() {
        let plain: NumericPoint = serde_json::from_str("12.5").unwrap();
        let wrapped: NumericPoint = serde_json::from_str(r#"{"value": 3}"#).unwrap();
        assert_eq!(plain, NumericPoint::Plain(12.5));
        assert_eq!(wrapped, NumericPoint::Wrapped { value: 3.0 });
    }
}
