//! Input validation for caller-supplied operation arguments.
//!
//! Used at the contract boundary before any ledger access. CSO identifiers
//! become the single attribute of the entity's composite ledger key, so the
//! NUL byte the key format reserves as a separator is rejected here.

use std::fmt;

/// Validation error with structured context.
///
/// Contains the field name and the specific constraint that was violated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The field that failed validation.
    pub field: String,
    /// Description of the violated constraint.
    pub constraint: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.constraint)
    }
}

impl std::error::Error for ValidationError {}

/// Validates a CSO identifier.
///
/// CSO identifiers must be non-empty and must not contain `\u{0}`, which
/// the composite-key format uses as its attribute separator.
///
/// # Errors
///
/// Returns [`ValidationError`] if the identifier is empty or contains a
/// NUL character.
pub fn validate_cso_id(cso_id: &str) -> Result<(), ValidationError> {
    if cso_id.is_empty() {
        return Err(ValidationError {
            field: "cso_id".to_string(),
            constraint: "must not be empty".to_string(),
        });
    }
    if cso_id.contains('\u{0}') {
        return Err(ValidationError {
            field: "cso_id".to_string(),
            constraint: "must not contain the NUL key separator".to_string(),
        });
    }
    Ok(())
}

/// Validates a charger count for CSO creation.
///
/// A CSO owns a fixed, non-empty set of chargers; a count of zero would
/// create an entity no transfer can ever address.
///
/// # Errors
///
/// Returns [`ValidationError`] if the count is zero.
pub fn validate_charger_count(charger_count: u32) -> Result<(), ValidationError> {
    if charger_count == 0 {
        return Err(ValidationError {
            field: "charger_count".to_string(),
            constraint: "must be at least 1".to_string(),
        });
    }
    Ok(())
}
