//! Entity model for charging-station operators and their chargers.
//!
//! Wire format note: serde rename attributes pin the persisted JSON field
//! names (`ID`, `charger`, `EVID`, `charger_ID`) so that stored entities
//! stay readable by the other participants in the ledger application.

use serde::{Deserialize, Serialize};

/// A physical charging point belonging to a CSO.
///
/// `power_flow` must equal the connected vehicle's own recorded power flow
/// while a vehicle is connected; the contract layer keeps the two in step
/// during energy transfers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Charger {
    /// Identifier of the connected EV; empty while no vehicle is connected.
    #[serde(rename = "EVID")]
    pub ev_id: String,

    /// Position of this charger within its owning CSO, 1-based.
    #[serde(rename = "charger_ID")]
    pub charger_id: u32,

    /// Power currently flowing through this charger.
    #[serde(rename = "power_flow")]
    pub power_flow: f64,
}

impl Charger {
    /// Returns whether an EV is currently connected.
    pub fn has_ev(&self) -> bool {
        !self.ev_id.is_empty()
    }
}

/// A charging-station operator: the root entity persisted on the ledger.
///
/// Owns a fixed-size ordered collection of [`Charger`]s; the collection
/// length never changes after creation. Chargers are addressed by their
/// 1-based `charger_id` through the bounds-checked accessors, never by raw
/// index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cso {
    /// Globally unique identity, chosen by the caller at creation time.
    #[serde(rename = "ID")]
    pub cso_id: String,

    /// Sum of all charger power flows. Recomputed by
    /// [`refresh_aggregates`](Self::refresh_aggregates) before every
    /// transfer commit.
    pub total_power_flow: f64,

    /// Number of chargers with a connected EV. Recomputed alongside
    /// `total_power_flow`.
    pub ev_count: u32,

    /// Fixed-size charger collection, ordered by `charger_id` (1..=N).
    #[serde(rename = "charger")]
    pub chargers: Vec<Charger>,
}

impl Cso {
    /// Builds a new CSO with `charger_count` vacant chargers.
    ///
    /// Charger ids are assigned sequentially from 1; every charger starts
    /// with no connected EV and zero power flow.
    pub fn new(cso_id: impl Into<String>, charger_count: u32) -> Self {
        let chargers = (1..=charger_count)
            .map(|charger_id| Charger {
                ev_id: String::new(),
                charger_id,
                power_flow: 0.0,
            })
            .collect();

        Self {
            cso_id: cso_id.into(),
            total_power_flow: 0.0,
            ev_count: 0,
            chargers,
        }
    }

    /// Number of chargers owned by this CSO.
    pub fn charger_count(&self) -> u32 {
        self.chargers.len() as u32
    }

    /// Returns the charger with the given 1-based id, if it exists.
    pub fn charger(&self, charger_id: u32) -> Option<&Charger> {
        if charger_id == 0 {
            return None;
        }
        self.chargers.get(charger_id as usize - 1)
    }

    /// Mutable variant of [`charger`](Self::charger).
    pub fn charger_mut(&mut self, charger_id: u32) -> Option<&mut Charger> {
        if charger_id == 0 {
            return None;
        }
        self.chargers.get_mut(charger_id as usize - 1)
    }

    /// Recomputes the aggregate fields from the charger collection.
    ///
    /// `total_power_flow` becomes the sum of all charger power flows and
    /// `ev_count` the number of chargers with a connected EV. Callers that
    /// mutate chargers must invoke this before persisting the entity.
    pub fn refresh_aggregates(&mut self) {
        self.total_power_flow = self.chargers.iter().map(|c| c.power_flow).sum();
        self.ev_count = self.chargers.iter().filter(|c| c.has_ev()).count() as u32;
    }
}

/// Parameter set for a single energy-transfer transaction.
///
/// Everything the EV contract's `UpdateEVData` operation expects besides
/// the calling CSO's own identity.
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyTransfer {
    /// The EV taking part in the transfer.
    pub ev_id: String,
    /// The addressed charger on the CSO side, 1-based.
    pub charger_id: u32,
    /// Power flowing for the duration of the transfer.
    pub power_flow: f64,
    /// Settlement amount for the transfer.
    pub money: f64,
    /// Battery temperature reported by the vehicle.
    pub temperature: f64,
    /// Battery state of charge reported by the vehicle.
    pub state_of_charge: f64,
    /// Battery state of health reported by the vehicle.
    pub state_of_health: f64,
}
