//! CSO entity persistence.
//!
//! Owns the load-modify-save lifecycle against any [`LedgerEngine`]. Every
//! operation performs whole-entity reads and writes; the unit of
//! consistency is the entity. An absent entity is a normal outcome
//! (`Ok(None)` / `Ok(false)`), never an error; a present value that fails
//! to decode is always an error.

use snafu::{ResultExt, Snafu};
use voltgrid_ledger_types::{CodecError, Cso, decode, encode};

use crate::engine::{LedgerEngine, LedgerError};
use crate::keys::cso_key;

/// Errors returned by [`CsoStore`] operations.
#[derive(Debug, Snafu)]
pub enum StoreError {
    /// Composite-key derivation failed.
    #[snafu(display("Unable to derive a composite key for CSO '{cso_id}': {source}"))]
    Key {
        /// The identity whose key could not be derived.
        cso_id: String,
        /// The underlying engine error.
        source: LedgerError,
    },

    /// The underlying ledger read, write, or delete failed.
    #[snafu(display("Ledger access failed for CSO '{cso_id}': {source}"))]
    Ledger {
        /// The identity being accessed.
        cso_id: String,
        /// The underlying engine error.
        source: LedgerError,
    },

    /// Serialization of the entity, or deserialization of present ledger
    /// data, failed.
    #[snafu(display("Stored value for CSO '{cso_id}' is not a valid entity: {source}"))]
    Codec {
        /// The identity whose value failed to code.
        cso_id: String,
        /// The underlying codec error.
        source: CodecError,
    },
}

/// Result type for entity-store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// CSO persistence operations.
pub struct CsoStore;

impl CsoStore {
    /// Saves an entity, overwriting any existing value at its key.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Key` if key derivation fails,
    /// `StoreError::Codec` if serialization fails, and
    /// `StoreError::Ledger` if the write fails.
    pub fn save<L: LedgerEngine + ?Sized>(engine: &L, cso: &Cso) -> Result<()> {
        let key = cso_key(engine, &cso.cso_id).context(KeySnafu { cso_id: &cso.cso_id })?;
        let value = encode(cso).context(CodecSnafu { cso_id: &cso.cso_id })?;
        engine
            .put_state(&key, &value)
            .context(LedgerSnafu { cso_id: &cso.cso_id })
    }

    /// Loads the entity with the given identity.
    ///
    /// Returns `Ok(None)` when no entity exists at the derived key; this
    /// is an expected outcome, not a failure.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Key` if key derivation fails,
    /// `StoreError::Ledger` if the read fails, and `StoreError::Codec` if
    /// present data does not decode.
    pub fn load<L: LedgerEngine + ?Sized>(engine: &L, cso_id: &str) -> Result<Option<Cso>> {
        let key = cso_key(engine, cso_id).context(KeySnafu { cso_id })?;
        match engine.get_state(&key).context(LedgerSnafu { cso_id })? {
            Some(value) => {
                let cso = decode(&value).context(CodecSnafu { cso_id })?;
                Ok(Some(cso))
            }
            None => Ok(None),
        }
    }

    /// Checks whether an entity exists at the derived key.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Key` if key derivation fails and
    /// `StoreError::Ledger` if the read fails.
    pub fn exists<L: LedgerEngine + ?Sized>(engine: &L, cso_id: &str) -> Result<bool> {
        let key = cso_key(engine, cso_id).context(KeySnafu { cso_id })?;
        Ok(engine
            .get_state(&key)
            .context(LedgerSnafu { cso_id })?
            .is_some())
    }

    /// Deletes the entity's current value, returning whether it existed.
    ///
    /// The deletion key is derived identically to the save key. History at
    /// the key is left intact by the engine.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Key` if key derivation fails and
    /// `StoreError::Ledger` if the read or delete fails.
    pub fn delete<L: LedgerEngine + ?Sized>(engine: &L, cso_id: &str) -> Result<bool> {
        let key = cso_key(engine, cso_id).context(KeySnafu { cso_id })?;
        let existed = engine
            .get_state(&key)
            .context(LedgerSnafu { cso_id })?
            .is_some();
        if existed {
            engine.del_state(&key).context(LedgerSnafu { cso_id })?;
        }
        Ok(existed)
    }
}
