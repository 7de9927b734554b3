//! Field validators for declared values.
//!
//! Each validator takes the attribute path and an optional value. `None`
//! covers both null and not-yet-known values; those are never checked.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ValidationError;

pub const TAX_CATEGORIES: [&str; 8] = [
    "standard",
    "digital-goods",
    "ebooks",
    "implementation-services",
    "professional-services",
    "saas",
    "software-programming-services",
    "training-services",
];

pub const DISCOUNT_TYPES: [&str; 3] = ["percentage", "flat", "flat_per_seat"];

pub const TAX_MODES: [&str; 3] = ["account_setting", "internal", "external"];

pub const INTERVALS: [&str; 4] = ["day", "week", "month", "year"];

static CURRENCY_CODE: Lazy<Regex> = Lazy::new(|| Regex::new("^[A-Z]{3}$").unwrap());
static COUNTRY_CODE: Lazy<Regex> = Lazy::new(|| Regex::new("^[A-Z]{2}$").unwrap());

type Outcome = Result<(), ValidationError>;

fn one_of(path: &str, value: Option<&str>, allowed: &[&str], summary: &'static str) -> Outcome {
    match value {
        Some(v) if !allowed.contains(&v) => Err(ValidationError {
            path: path.to_string(),
            summary,
            expected: format!("one of: {}", allowed.join(", ")),
            value: v.to_string(),
        }),
        _ => Ok(()),
    }
}

fn matches(
    path: &str,
    value: Option<&str>,
    pattern: &Regex,
    description: &str,
    summary: &'static str,
) -> Outcome {
    match value {
        Some(v) if !pattern.is_match(v) => Err(ValidationError {
            path: path.to_string(),
            summary,
            expected: format!("{} ({})", description, pattern.as_str()),
            value: v.to_string(),
        }),
        _ => Ok(()),
    }
}

pub fn tax_category(path: &str, value: Option<&str>) -> Outcome {
    one_of(path, value, &TAX_CATEGORIES, "Invalid Tax Category")
}

pub fn discount_type(path: &str, value: Option<&str>) -> Outcome {
    one_of(path, value, &DISCOUNT_TYPES, "Invalid Discount Type")
}

pub fn tax_mode(path: &str, value: Option<&str>) -> Outcome {
    one_of(path, value, &TAX_MODES, "Invalid Tax Mode")
}

pub fn interval(path: &str, value: Option<&str>) -> Outcome {
    one_of(path, value, &INTERVALS, "Invalid Interval")
}

/// ISO 4217, uppercase.
pub fn currency_code(path: &str, value: Option<&str>) -> Outcome {
    matches(
        path,
        value,
        &CURRENCY_CODE,
        "a three-letter uppercase ISO 4217 code (e.g., USD, EUR, GBP)",
        "Invalid Currency Code",
    )
}

/// ISO 3166-1 alpha-2, uppercase.
pub fn country_code(path: &str, value: Option<&str>) -> Outcome {
    matches(
        path,
        value,
        &COUNTRY_CODE,
        "a two-letter uppercase ISO 3166-1 alpha-2 code (e.g., US, GB, FR)",
        "Invalid Country Code",
    )
}

/// A percentage discount amount between 0.01 and 100.
pub fn percentage_amount(path: &str, value: Option<&str>) -> Outcome {
    let Some(v) = value else {
        return Ok(());
    };
    let fail = |expected: &str| ValidationError {
        path: path.to_string(),
        summary: "Invalid Percentage Amount",
        expected: expected.to_string(),
        value: v.to_string(),
    };
    let amount: f64 = v.parse().map_err(|_| fail("a valid number"))?;
    if !(0.01..=100.0).contains(&amount) {
        return Err(fail("between 0.01 and 100"));
    }
    Ok(())
}
