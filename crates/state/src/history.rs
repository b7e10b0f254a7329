//! Historical revision reads for CSO entities.
//!
//! Reconstructs the ordered sequence of past versions of an entity from
//! the engine's per-key commit history, pairing each decoded snapshot with
//! its transaction id and commit time. Deleted entities keep their full
//! history; delete markers carry no value and yield no revision.

use chrono::{DateTime, Utc};
use serde::Serialize;
use snafu::{ResultExt, Snafu};
use voltgrid_ledger_types::{CodecError, Cso, decode};

use crate::engine::{HistoryCursor, LedgerEngine, LedgerError};
use crate::keys::cso_key;

/// Errors returned by history queries.
#[derive(Debug, Snafu)]
pub enum HistoryError {
    /// Composite-key derivation failed.
    #[snafu(display("Unable to derive a composite key for CSO '{cso_id}': {source}"))]
    Key {
        /// The identity whose key could not be derived.
        cso_id: String,
        /// The underlying engine error.
        source: LedgerError,
    },

    /// The engine failed to open or advance the history cursor.
    #[snafu(display("History query failed for CSO '{cso_id}': {source}"))]
    Ledger {
        /// The identity being queried.
        cso_id: String,
        /// The underlying engine error.
        source: LedgerError,
    },

    /// A historical value did not decode as a CSO entity.
    #[snafu(display(
        "Historical value for CSO '{cso_id}' in transaction {tx_id} is not a valid entity: {source}"
    ))]
    Codec {
        /// The identity being queried.
        cso_id: String,
        /// The transaction whose value failed to decode.
        tx_id: String,
        /// The underlying codec error.
        source: CodecError,
    },

    /// A commit timestamp fell outside the representable datetime range.
    #[snafu(display(
        "Commit timestamp ({seconds}s, {nanos}ns) in transaction {tx_id} is not representable"
    ))]
    Timestamp {
        /// The transaction carrying the timestamp.
        tx_id: String,
        /// Whole seconds since the Unix epoch.
        seconds: i64,
        /// Nanosecond remainder.
        nanos: u32,
    },
}

/// Result type for history operations.
pub type Result<T> = std::result::Result<T, HistoryError>;

/// One committed revision of a CSO entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CsoRevision {
    /// The entity snapshot committed by the transaction.
    #[serde(rename = "Record")]
    pub record: Cso,

    /// Identifier of the committing transaction.
    #[serde(rename = "txId")]
    pub tx_id: String,

    /// Commit time, converted from the engine's native representation.
    pub timestamp: DateTime<Utc>,
}

/// Lazy scan over an entity's committed revisions, oldest first.
///
/// Finite and consumed once; the scan cannot be restarted. The first error
/// fuses the iterator, so a decode failure yields no further revisions.
/// The underlying engine cursor is released when the scan is dropped,
/// whether it ran to completion or was abandoned early.
pub struct HistoryScan {
    cso_id: String,
    cursor: Box<dyn HistoryCursor>,
    done: bool,
}

impl HistoryScan {
    /// Opens a scan over the revision history of the given identity.
    ///
    /// An identity with no history yields an empty scan.
    ///
    /// # Errors
    ///
    /// Returns `HistoryError::Key` if key derivation fails and
    /// `HistoryError::Ledger` if the engine cannot open the cursor.
    pub fn open<L: LedgerEngine + ?Sized>(engine: &L, cso_id: &str) -> Result<Self> {
        let key = cso_key(engine, cso_id).context(KeySnafu { cso_id })?;
        let cursor = engine
            .get_history_for_key(&key)
            .context(LedgerSnafu { cso_id })?;
        Ok(Self {
            cso_id: cso_id.to_string(),
            cursor,
            done: false,
        })
    }
}

impl Iterator for HistoryScan {
    type Item = Result<CsoRevision>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            let modification = match self.cursor.next() {
                Ok(Some(modification)) => modification,
                Ok(None) => {
                    self.done = true;
                    return None;
                }
                Err(source) => {
                    self.done = true;
                    return Some(Err(HistoryError::Ledger {
                        cso_id: self.cso_id.clone(),
                        source,
                    }));
                }
            };

            // Delete markers carry no value; skip to the next commit.
            if modification.is_delete {
                continue;
            }

            let record: Cso = match decode(&modification.value) {
                Ok(record) => record,
                Err(source) => {
                    self.done = true;
                    return Some(Err(HistoryError::Codec {
                        cso_id: self.cso_id.clone(),
                        tx_id: modification.tx_id,
                        source,
                    }));
                }
            };

            let timestamp = match modification.timestamp.to_utc() {
                Some(timestamp) => timestamp,
                None => {
                    self.done = true;
                    return Some(Err(HistoryError::Timestamp {
                        tx_id: modification.tx_id,
                        seconds: modification.timestamp.seconds,
                        nanos: modification.timestamp.nanos,
                    }));
                }
            };

            return Some(Ok(CsoRevision {
                record,
                tx_id: modification.tx_id,
                timestamp,
            }));
        }
    }
}
