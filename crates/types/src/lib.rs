//! Core type definitions for the VoltGrid CSO ledger.
//!
//! This crate holds everything the upper layers share without doing I/O:
//! - The CSO/Charger entity model and the energy-transfer parameter set
//! - Centralized serialization and deserialization (JSON wire format)
//! - Input validation for caller-supplied identifiers and counts

#![deny(unsafe_code)]

mod codec;
mod types;
mod validation;

pub use codec::{CodecError, decode, encode};
pub use types::{Charger, Cso, EnergyTransfer};
pub use validation::{ValidationError, validate_charger_count, validate_cso_id};
