//! Composite-key derivation for CSO entities.
//!
//! A CSO is addressed on the ledger by a composite key built from the
//! fixed entity-type tag and the operator's identity as its single
//! attribute. Key construction is delegated to the engine so the format
//! stays compatible with any range or prefix queries the engine performs.
//!
//! Save, load, existence checks, and deletion all derive their key through
//! [`cso_key`]; there is no second derivation path.

use crate::engine::{LedgerEngine, LedgerError};

/// Entity-type tag for CSO composite keys.
pub const CS_OPERATOR_TYPE: &str = "CS-Operator";

/// Derives the ledger key for the CSO with the given identity.
///
/// Two entities with equal `cso_id` derive the same key; the key is the
/// uniqueness mechanism.
///
/// # Errors
///
/// Returns [`LedgerError::InvalidKey`] if the engine rejects the identity
/// as a key attribute.
pub fn cso_key<L: LedgerEngine + ?Sized>(engine: &L, cso_id: &str) -> Result<String, LedgerError> {
    engine.create_composite_key(CS_OPERATOR_TYPE, &[cso_id])
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::disallowed_methods)]
mod tests {
    use super::*;
    use crate::engine::InMemoryLedger;

    #[test]
    fn test_key_is_deterministic() {
        let ledger = InMemoryLedger::new();

        let first = cso_key(&ledger, "CSO1").expect("derive key");
        let second = cso_key(&ledger, "CSO1").expect("derive key");
        assert_eq!(first, second);
    }

    #[test]
    fn test_distinct_ids_distinct_keys() {
        let ledger = InMemoryLedger::new();

        let a = cso_key(&ledger, "CSO1").expect("derive key");
        let b = cso_key(&ledger, "CSO2").expect("derive key");
        assert_ne!(a, b);
    }

    #[test]
    fn test_key_carries_entity_type_tag() {
        let ledger = InMemoryLedger::new();

        let key = cso_key(&ledger, "CSO1").expect("derive key");
        assert!(key.contains(CS_OPERATOR_TYPE));
        assert!(key.contains("CSO1"));
    }

    #[test]
    fn test_separator_in_id_rejected() {
        let ledger = InMemoryLedger::new();
        assert!(cso_key(&ledger, "bad\u{0}id").is_err());
    }
}
