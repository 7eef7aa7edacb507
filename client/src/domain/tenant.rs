//! Tenant scope identifiers.
//!
//! Every district-scoped operation takes a [`DistrictId`]. The client never
//! remembers a "current" district; callers pass one on each call.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::ApiError;

/// Identifier of the district (tenant) a request is scoped to.
///
/// ## Invariants
/// - Non-empty and free of surrounding whitespace.
///
/// # Examples
/// ```
/// use precheck_client::domain::DistrictId;
///
/// let id = DistrictId::new("11111111-1111-1111-1111-111111111111").expect("valid id");
/// assert_eq!(id.as_str(), "11111111-1111-1111-1111-111111111111");
/// assert!(DistrictId::new("  ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DistrictId(String);

impl DistrictId {
    /// Validate and wrap a raw identifier.
    pub fn new(value: impl Into<String>) -> Result<Self, DistrictIdValidationError> {
        let raw = value.into();
        if raw.trim().is_empty() {
            return Err(DistrictIdValidationError::Empty);
        }
        if raw.trim() != raw {
            return Err(DistrictIdValidationError::ContainsWhitespace);
        }
        Ok(Self(raw))
    }

    /// Borrow the identifier.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for DistrictId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for DistrictId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl FromStr for DistrictId {
    type Err = DistrictIdValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::new(value)
    }
}

impl TryFrom<String> for DistrictId {
    type Error = DistrictIdValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DistrictId> for String {
    fn from(value: DistrictId) -> Self {
        value.0
    }
}

/// Validation errors returned when constructing [`DistrictId`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DistrictIdValidationError {
    /// Identifier is empty after trimming whitespace.
    #[error("district id must not be empty")]
    Empty,
    /// Identifier has leading or trailing whitespace.
    #[error("district id must not contain surrounding whitespace")]
    ContainsWhitespace,
}

impl From<DistrictIdValidationError> for ApiError {
    fn from(error: DistrictIdValidationError) -> Self {
        Self::invalid_request(error.to_string())
    }
}
