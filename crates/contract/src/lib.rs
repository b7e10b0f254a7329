//! Contract layer for the VoltGrid CSO ledger.
//!
//! [`CsoContract`] orchestrates the multi-step business operations
//! (create, read, delete, energy transfer, and historical audit) over an
//! injected [`LedgerEngine`](voltgrid_ledger_state::LedgerEngine) handle
//! and an injected cross-entity invocation client. It owns validation
//! ordering and the partial-failure semantics of the transfer protocol.
//!
//! The [`mock`] module ships a scriptable EV contract stand-in for tests.

#![deny(unsafe_code)]

mod config;
mod contract;
mod invoke;
pub mod mock;

pub use config::ContractConfig;
pub use contract::{ContractError, CsoContract};
pub use invoke::{
    ContractInvoker, EvClient, InvokeError, InvokeResponse, STATUS_SUCCESS, UPDATE_EV_DATA,
};
