use serde::{Deserialize, Serialize};

use crate::validation::{validate_phone, ValidationError};

/// Customer fields accepted by the create mutations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCustomer {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

impl NewCustomer {
    #[must_use]
    pub fn new(name: impl Into<String>, email: impl Into<String>, phone: Option<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone,
        }
    }

    /// The phone number to store. An empty string means "no phone".
    #[must_use]
    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref().filter(|p| !p.is_empty())
    }

    /// Runs the format checks that do not need the database.
    ///
    /// Email uniqueness is decided by the caller, which owns the store.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidPhone`] if a non-empty phone is
    /// malformed.
    pub fn validate_format(&self) -> Result<(), ValidationError> {
        match self.phone() {
            Some(phone) => validate_phone(phone),
            None => Ok(()),
        }
    }
}

/// Why a single item of a bulk customer import was skipped.
///
/// The `Display` text is what clients see in the `errors` list.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BulkRejection {
    #[error("Email already exists: {0}")]
    DuplicateEmail(String),
    #[error("Invalid phone: {0}")]
    InvalidPhone(String),
    /// The insert itself failed; carries the store's error text.
    #[error("{0}")]
    Store(String),
}

impl BulkRejection {
    /// Checks one bulk item given whether its email is already taken.
    ///
    /// Mirrors the single-create ordering: uniqueness first, then format.
    ///
    /// # Errors
    ///
    /// Returns the rejection to record for this item.
    pub fn check(item: &NewCustomer, email_taken: bool) -> Result<(), BulkRejection> {
        if email_taken {
            return Err(Self::DuplicateEmail(item.email.clone()));
        }
        if let Some(phone) = item.phone() {
            if validate_phone(phone).is_err() {
                return Err(Self::InvalidPhone(phone.to_owned()));
            }
        }
        Ok(())
    }
}
