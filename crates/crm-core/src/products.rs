use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::validation::{validate_price, validate_stock, ValidationError};

/// Product fields accepted by `createProduct`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub price: Decimal,
    /// Units on hand; `0` when the caller omits it.
    #[serde(default)]
    pub stock: i32,
}

impl NewProduct {
    /// # Errors
    ///
    /// Returns the first failing rule: price positivity, price precision,
    /// then stock non-negativity.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_price(self.price)?;
        validate_stock(self.stock)
    }
}
