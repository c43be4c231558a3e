//! Field-level validation rules for customer and product input.

use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use thiserror::Error;

/// Accepts `+` followed by 10–15 digits, or the `555-123-4567` form.
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\+[0-9]{10,15}|[0-9]{3}-[0-9]{3}-[0-9]{4})$").expect("valid phone regex")
});

/// Largest number of fractional digits a stored price may carry (`NUMERIC(10,2)`).
pub const PRICE_MAX_SCALE: u32 = 2;

/// Largest storable price in cents; `NUMERIC(10,2)` holds at most eight
/// integer digits.
const PRICE_MAX_CENTS: i64 = 9_999_999_999;

/// A business-rule violation. The `Display` text is returned verbatim to API
/// clients.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Email already exists")]
    DuplicateEmail,
    #[error("Invalid phone number format")]
    InvalidPhone,
    #[error("Price must be positive")]
    NonPositivePrice,
    #[error("Price cannot have more than 2 decimal places")]
    PriceTooPrecise,
    #[error("Price cannot exceed 99999999.99")]
    PriceTooLarge,
    #[error("Stock cannot be negative")]
    NegativeStock,
    #[error("Invalid customer ID")]
    InvalidCustomerId,
    #[error("No valid products found")]
    NoValidProducts,
    #[error("Some product IDs are invalid")]
    InvalidProductIds,
}

#[must_use]
pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_RE.is_match(phone)
}

/// # Errors
///
/// Returns [`ValidationError::InvalidPhone`] if `phone` matches neither
/// accepted format.
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if is_valid_phone(phone) {
        Ok(())
    } else {
        Err(ValidationError::InvalidPhone)
    }
}

/// Checks that a price is strictly positive and fits two decimal places.
///
/// # Errors
///
/// Returns [`ValidationError::NonPositivePrice`] for zero or negative prices,
/// [`ValidationError::PriceTooPrecise`] when the value would be rounded on
/// storage, or [`ValidationError::PriceTooLarge`] when it overflows the column.
pub fn validate_price(price: Decimal) -> Result<(), ValidationError> {
    if price <= Decimal::ZERO {
        return Err(ValidationError::NonPositivePrice);
    }
    if price.normalize().scale() > PRICE_MAX_SCALE {
        return Err(ValidationError::PriceTooPrecise);
    }
    if price > Decimal::new(PRICE_MAX_CENTS, PRICE_MAX_SCALE) {
        return Err(ValidationError::PriceTooLarge);
    }
    Ok(())
}

/// # Errors
///
/// Returns [`ValidationError::NegativeStock`] if `stock` is below zero.
pub fn validate_stock(stock: i32) -> Result<(), ValidationError> {
    if stock < 0 {
        Err(ValidationError::NegativeStock)
    } else {
        Ok(())
    }
}
