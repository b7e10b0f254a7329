//! Contract configuration.
//!
//! Identifies the EV collaborator: the name its contract is registered
//! under and the channel it is reachable on. Defaults match the values the
//! ledger application deploys with.

use serde::Deserialize;

/// Configuration for the CSO contract's cross-entity calls.
#[derive(Debug, Clone, Deserialize)]
pub struct ContractConfig {
    /// Name the EV contract is registered under.
    #[serde(default = "default_ev_contract")]
    pub ev_contract: String,

    /// Channel the EV contract is invoked on.
    #[serde(default = "default_channel")]
    pub channel: String,
}

fn default_ev_contract() -> String {
    "EV".to_string()
}

fn default_channel() -> String {
    "default-channel".to_string()
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            ev_contract: default_ev_contract(),
            channel: default_channel(),
        }
    }
}
