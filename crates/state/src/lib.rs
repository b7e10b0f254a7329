//! Ledger access layer for the VoltGrid CSO ledger.
//!
//! This crate sits between the core entity types (`voltgrid-ledger-types`)
//! and the contract layer (`voltgrid-ledger-contract`), providing:
//!
//! - The [`LedgerEngine`] trait: the narrow key-value, history, and
//!   composite-key API this component consumes from the ledger engine
//! - Composite-key derivation for CSO entities
//! - [`CsoStore`]: the load/save/exists/delete lifecycle with the
//!   "absent is not an error" contract
//! - [`HistoryScan`]: lazy reconstruction of an entity's committed
//!   revisions from the engine's per-key history
//! - [`InMemoryLedger`]: an in-memory engine for tests and local runs

#![deny(unsafe_code)]

mod engine;
mod entity;
mod history;
mod keys;

pub use engine::{
    HistoryCursor, InMemoryLedger, KeyModification, LedgerEngine, LedgerError, LedgerTimestamp,
};
pub use entity::{CsoStore, StoreError};
pub use history::{CsoRevision, HistoryError, HistoryScan};
pub use keys::{CS_OPERATOR_TYPE, cso_key};
