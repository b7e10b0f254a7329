//! Ledger-engine abstraction and the in-memory reference engine.
//!
//! The contract layer never talks to a concrete ledger directly; it is
//! constructed with any [`LedgerEngine`] implementation. The trait covers
//! exactly the engine capabilities this component consumes: composite-key
//! construction, whole-value key-value access, and per-key commit history.
//!
//! [`InMemoryLedger`] is the reference implementation used by tests and
//! local development. It keeps an append-only modification log per key,
//! stamping each commit with a fresh transaction id and wall-clock time,
//! and records tombstones for deletes so history survives removal of the
//! current value.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use parking_lot::RwLock;
use snafu::Snafu;

/// Separator used by the composite-key format.
///
/// The NUL prefix keeps composite keys out of the simple-key namespace and
/// makes `{object_type}` prefix scans unambiguous.
const COMPOSITE_KEY_SEPARATOR: char = '\u{0}';

/// Errors surfaced by a ledger engine.
#[derive(Debug, Snafu)]
pub enum LedgerError {
    /// Composite-key input the engine cannot encode.
    #[snafu(display("Invalid composite key: {reason}"))]
    InvalidKey {
        /// What the engine rejected about the input.
        reason: String,
    },

    /// The engine failed the read, write, or history operation.
    #[snafu(display("Ledger engine failure: {message}"))]
    Engine {
        /// Engine-reported failure description.
        message: String,
    },
}

/// Engine-native wall-clock representation: seconds and nanoseconds since
/// the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerTimestamp {
    /// Whole seconds since the Unix epoch.
    pub seconds: i64,
    /// Nanosecond remainder, `0..1_000_000_000`.
    pub nanos: u32,
}

impl LedgerTimestamp {
    /// Converts to a UTC datetime.
    ///
    /// Returns `None` if the pair falls outside chrono's representable
    /// range or the nanosecond part is out of bounds.
    pub fn to_utc(self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.seconds, self.nanos).single()
    }

    fn now() -> Self {
        let now = Utc::now();
        Self {
            seconds: now.timestamp(),
            nanos: now.timestamp_subsec_nanos(),
        }
    }
}

/// One committed modification of a ledger key.
#[derive(Debug, Clone)]
pub struct KeyModification {
    /// Identifier of the transaction that committed this modification.
    pub tx_id: String,
    /// Commit time, in the engine's native representation.
    pub timestamp: LedgerTimestamp,
    /// The value written; empty for deletes.
    pub value: Vec<u8>,
    /// Whether this modification removed the key.
    pub is_delete: bool,
}

/// Cursor over a key's committed modification history, oldest first.
///
/// Finite and consumed once. Dropping the cursor releases whatever engine
/// resource backs it, on normal completion and early abort alike.
pub trait HistoryCursor {
    /// Returns the next modification, or `None` when the history is
    /// exhausted.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Engine`] if the engine fails to produce the
    /// next record.
    fn next(&mut self) -> Result<Option<KeyModification>, LedgerError>;
}

/// The ledger-engine capabilities this component consumes.
///
/// Consensus, block production, and conflict detection all live behind
/// this trait; every operation here is a synchronous call into the engine.
pub trait LedgerEngine {
    /// Builds a composite key from an entity-type tag and its attributes.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidKey`] if the tag or an attribute
    /// cannot be encoded in the engine's key format.
    fn create_composite_key(
        &self,
        object_type: &str,
        attributes: &[&str],
    ) -> Result<String, LedgerError>;

    /// Reads the current value at `key`; `Ok(None)` if the key is absent.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Engine`] if the read fails.
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, LedgerError>;

    /// Writes `value` at `key`, replacing any existing value.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Engine`] if the write fails.
    fn put_state(&self, key: &str, value: &[u8]) -> Result<(), LedgerError>;

    /// Removes the current value at `key`. Removing an absent key is not
    /// an error.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Engine`] if the delete fails.
    fn del_state(&self, key: &str) -> Result<(), LedgerError>;

    /// Opens a cursor over the commit history of `key`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Engine`] if the history query fails.
    fn get_history_for_key(&self, key: &str) -> Result<Box<dyn HistoryCursor>, LedgerError>;
}

fn encode_composite_key(object_type: &str, attributes: &[&str]) -> Result<String, LedgerError> {
    if object_type.is_empty() {
        return Err(LedgerError::InvalidKey {
            reason: "object type must not be empty".to_string(),
        });
    }
    if object_type.contains(COMPOSITE_KEY_SEPARATOR) {
        return Err(LedgerError::InvalidKey {
            reason: format!("object type {object_type:?} contains the key separator"),
        });
    }

    let mut key = String::new();
    key.push(COMPOSITE_KEY_SEPARATOR);
    key.push_str(object_type);
    key.push(COMPOSITE_KEY_SEPARATOR);
    for attribute in attributes {
        if attribute.contains(COMPOSITE_KEY_SEPARATOR) {
            return Err(LedgerError::InvalidKey {
                reason: format!("attribute {attribute:?} contains the key separator"),
            });
        }
        key.push_str(attribute);
        key.push(COMPOSITE_KEY_SEPARATOR);
    }
    Ok(key)
}

#[derive(Default)]
struct LedgerState {
    /// Current world state: key -> value.
    world: HashMap<String, Vec<u8>>,
    /// Append-only modification log per key, commit order.
    history: HashMap<String, Vec<KeyModification>>,
}

impl LedgerState {
    fn record(&mut self, key: &str, value: Vec<u8>, is_delete: bool) {
        self.history
            .entry(key.to_string())
            .or_default()
            .push(KeyModification {
                tx_id: uuid::Uuid::new_v4().to_string(),
                timestamp: LedgerTimestamp::now(),
                value,
                is_delete,
            });
    }
}

/// In-memory ledger engine for tests and local development.
///
/// Every write commits immediately under a distinct transaction id; the
/// per-key history log is append-only and survives `del_state`.
pub struct InMemoryLedger {
    state: Arc<RwLock<LedgerState>>,
}

impl InMemoryLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(LedgerState::default())),
        }
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for InMemoryLedger {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl LedgerEngine for InMemoryLedger {
    fn create_composite_key(
        &self,
        object_type: &str,
        attributes: &[&str],
    ) -> Result<String, LedgerError> {
        encode_composite_key(object_type, attributes)
    }

    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, LedgerError> {
        Ok(self.state.read().world.get(key).cloned())
    }

    fn put_state(&self, key: &str, value: &[u8]) -> Result<(), LedgerError> {
        let mut state = self.state.write();
        state.world.insert(key.to_string(), value.to_vec());
        state.record(key, value.to_vec(), false);
        Ok(())
    }

    fn del_state(&self, key: &str) -> Result<(), LedgerError> {
        let mut state = self.state.write();
        if state.world.remove(key).is_some() {
            state.record(key, Vec::new(), true);
        }
        Ok(())
    }

    fn get_history_for_key(&self, key: &str) -> Result<Box<dyn HistoryCursor>, LedgerError> {
        let entries = self
            .state
            .read()
            .history
            .get(key)
            .cloned()
            .unwrap_or_default();
        Ok(Box::new(InMemoryHistoryCursor {
            entries: entries.into_iter(),
        }))
    }
}

/// Cursor over a snapshot of one key's in-memory history.
struct InMemoryHistoryCursor {
    entries: std::vec::IntoIter<KeyModification>,
}

impl HistoryCursor for InMemoryHistoryCursor {
    fn next(&mut self) -> Result<Option<KeyModification>, LedgerError> {
        Ok(self.entries.next())
    }
}
