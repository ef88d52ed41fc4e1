use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

use crate::error::{CatalogError, Result};

/// Trimmed, non-blank text or a Validation error naming the field
pub fn required_text(field: &str, value: Option<String>) -> Result<String> {
    optional_text(value).ok_or_else(|| CatalogError::validation(format!("{} is required", field)))
}

/// Trimmed text, with blank treated as absent
pub fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Price from a JSON number or numeric string. Must be present and non-negative.
pub fn parse_price(value: Option<&Value>) -> Result<Decimal> {
    let text = match value {
        None | Some(Value::Null) => return Err(CatalogError::validation("price is required")),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(_) => return Err(CatalogError::validation("price must be a number")),
    };

    // Sign is read from the text; values below Decimal precision round to -0
    if is_negative_number(&text) {
        return Err(CatalogError::validation("price must not be negative"));
    }

    let price = parse_decimal(&text)
        .ok_or_else(|| CatalogError::validation("price must be a number"))?;
    if price.is_sign_negative() && !price.is_zero() {
        return Err(CatalogError::validation("price must not be negative"));
    }
    Ok(price.normalize())
}

/// Numeric-looking text with a leading minus and a non-zero mantissa digit
fn is_negative_number(text: &str) -> bool {
    let Some(unsigned) = text.strip_prefix('-') else {
        return false;
    };
    if !unsigned.chars().all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-')) {
        return false;
    }
    let mantissa = unsigned.split(['e', 'E']).next().unwrap_or_default();
    mantissa.chars().any(|c| matches!(c, '1'..='9'))
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

pub fn parse_units_in_stock(value: Option<i64>) -> Result<Option<u32>> {
    value
        .map(|units| {
            u32::try_from(units)
                .map_err(|_| CatalogError::validation("unitsInStock must be a non-negative integer"))
        })
        .transpose()
}
