//! Cross-entity invocation.
//!
//! A [`ContractInvoker`] is the synchronous call path into another
//! contract on the ledger engine: positional byte-encoded arguments in,
//! status plus payload out. [`EvClient`] wraps an invoker with the EV
//! contract's `UpdateEVData` calling convention.

use snafu::Snafu;
use voltgrid_ledger_types::EnergyTransfer;

use crate::config::ContractConfig;

/// Operation invoked on the EV contract during an energy transfer.
pub const UPDATE_EV_DATA: &str = "UpdateEVData";

/// Status code signaling a successful invocation.
pub const STATUS_SUCCESS: i32 = 200;

/// Response from a cross-contract invocation.
#[derive(Debug, Clone)]
pub struct InvokeResponse {
    /// Target-reported status; [`STATUS_SUCCESS`] on success.
    pub status: i32,
    /// Target-produced payload, returned verbatim to the caller.
    pub payload: Vec<u8>,
    /// Target-reported message; describes the failure on non-success.
    pub message: String,
}

/// Errors from the cross-entity invocation path.
#[derive(Debug, Snafu)]
pub enum InvokeError {
    /// The call never produced a response from the target.
    #[snafu(display("Invocation transport failure: {message}"))]
    Transport {
        /// Engine-reported failure description.
        message: String,
    },

    /// The target contract answered with a non-success status.
    #[snafu(display("Target contract returned status {status}: {message}"))]
    Rejected {
        /// The non-success status code.
        status: i32,
        /// The target's failure message.
        message: String,
    },
}

/// Synchronous cross-contract invocation, as exposed by the ledger engine.
pub trait ContractInvoker {
    /// Invokes `target` on `channel` with positional byte arguments.
    ///
    /// A returned response may still carry a non-success status; the
    /// error path is reserved for calls that produced no response at all.
    ///
    /// # Errors
    ///
    /// Returns [`InvokeError::Transport`] if the call fails before the
    /// target answers.
    fn invoke(
        &self,
        target: &str,
        args: &[Vec<u8>],
        channel: &str,
    ) -> Result<InvokeResponse, InvokeError>;
}

/// Client for the EV contract's `UpdateEVData` operation.
pub struct EvClient<C> {
    invoker: C,
    config: ContractConfig,
}

impl<C: ContractInvoker> EvClient<C> {
    /// Creates a client that invokes the EV contract named by `config`.
    pub fn new(invoker: C, config: ContractConfig) -> Self {
        Self { invoker, config }
    }

    /// Pushes one transfer's parameters to the EV contract.
    ///
    /// Arguments are positional and byte-encoded:
    /// `[UpdateEVData, evID, csoID, chargerID, powerFlow, money,
    /// temperature, stateOfCharge, stateOfHealth]`.
    ///
    /// Returns the EV contract's response payload verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`InvokeError::Transport`] if the call produced no
    /// response and [`InvokeError::Rejected`] if the EV contract answered
    /// with a non-success status.
    pub fn update_ev_data(
        &self,
        cso_id: &str,
        transfer: &EnergyTransfer,
    ) -> Result<Vec<u8>, InvokeError> {
        let args: Vec<Vec<u8>> = [
            UPDATE_EV_DATA.to_string(),
            transfer.ev_id.clone(),
            cso_id.to_string(),
            transfer.charger_id.to_string(),
            transfer.power_flow.to_string(),
            transfer.money.to_string(),
            transfer.temperature.to_string(),
            transfer.state_of_charge.to_string(),
            transfer.state_of_health.to_string(),
        ]
        .into_iter()
        .map(String::into_bytes)
        .collect();

        tracing::debug!(
            target_contract = %self.config.ev_contract,
            channel = %self.config.channel,
            ev_id = %transfer.ev_id,
            "invoking EV contract"
        );

        let response = self
            .invoker
            .invoke(&self.config.ev_contract, &args, &self.config.channel)?;

        if response.status != STATUS_SUCCESS {
            return Err(InvokeError::Rejected {
                status: response.status,
                message: response.message,
            });
        }
        Ok(response.payload)
    }
}
