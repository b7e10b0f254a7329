//! Transaction coordinator for CSO ledger operations.
//!
//! Each public operation executes as a single synchronous unit of work
//! inside the engine's transaction framework: validate, optionally invoke
//! the EV contract, then commit local state through the entity store.
//! Failures surface immediately with the offending identifier; nothing is
//! retried here.

use snafu::{OptionExt, ResultExt, Snafu, ensure};
use voltgrid_ledger_state::{
    CsoRevision, CsoStore, HistoryError, HistoryScan, LedgerEngine, StoreError,
};
use voltgrid_ledger_types::{
    Cso, EnergyTransfer, ValidationError, validate_charger_count, validate_cso_id,
};

use crate::config::ContractConfig;
use crate::invoke::{ContractInvoker, EvClient, InvokeError};

/// Errors returned by [`CsoContract`] operations.
#[derive(Debug, Snafu)]
pub enum ContractError {
    /// An argument failed validation before any ledger access.
    #[snafu(display("Invalid argument: {source}"))]
    Validation {
        /// The violated constraint.
        source: ValidationError,
    },

    /// The addressed charger does not exist on the CSO.
    #[snafu(display(
        "Invalid charger ID {charger_id}: CSO '{cso_id}' has {charger_count} chargers"
    ))]
    InvalidChargerId {
        /// The CSO being addressed.
        cso_id: String,
        /// The out-of-range charger id.
        charger_id: u32,
        /// How many chargers the CSO actually has.
        charger_count: u32,
    },

    /// No entity exists at the identity's key.
    #[snafu(display("The CSO '{cso_id}' does not exist"))]
    NotFound {
        /// The absent identity.
        cso_id: String,
    },

    /// An entity already exists at the identity's key.
    #[snafu(display("The CSO '{cso_id}' already exists"))]
    AlreadyExists {
        /// The occupied identity.
        cso_id: String,
    },

    /// The entity store failed; decode failures of stored data surface
    /// here as the store's codec variant.
    #[snafu(display("Entity store failure: {source}"))]
    Store {
        /// The underlying store error.
        source: StoreError,
    },

    /// The history query failed or a historical record did not decode.
    #[snafu(display("History query failure: {source}"))]
    History {
        /// The underlying history error.
        source: HistoryError,
    },

    /// The EV contract rejected the transfer or was unreachable.
    #[snafu(display("EV invocation failed: {source}"))]
    Remote {
        /// The underlying invocation error.
        source: InvokeError,
    },
}

/// Result type for contract operations.
pub type Result<T> = std::result::Result<T, ContractError>;

/// Transaction coordinator for CSO accounts.
///
/// Constructed with an injected ledger-engine handle and an injected
/// cross-entity invocation client; holds no other state and caches nothing
/// between operations.
pub struct CsoContract<L, C> {
    ledger: L,
    ev: EvClient<C>,
}

impl<L: LedgerEngine, C: ContractInvoker> CsoContract<L, C> {
    /// Creates a coordinator over the given engine and invoker.
    pub fn new(ledger: L, invoker: C, config: ContractConfig) -> Self {
        Self {
            ledger,
            ev: EvClient::new(invoker, config),
        }
    }

    /// Creates a new CSO account with `charger_count` vacant chargers.
    ///
    /// Charger ids are assigned 1..=N in order; every charger starts with
    /// no connected EV and zero power flow.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for an empty identity or a zero charger
    /// count, `AlreadyExists` if the identity's key is occupied, and
    /// `Store` if the ledger write fails.
    pub fn create_cso_user(&self, cso_id: &str, charger_count: u32) -> Result<()> {
        validate_cso_id(cso_id).context(ValidationSnafu)?;
        validate_charger_count(charger_count).context(ValidationSnafu)?;

        ensure!(
            !CsoStore::exists(&self.ledger, cso_id).context(StoreSnafu)?,
            AlreadyExistsSnafu { cso_id }
        );

        CsoStore::save(&self.ledger, &Cso::new(cso_id, charger_count)).context(StoreSnafu)?;
        tracing::info!(cso_id, charger_count, "CSO created");
        Ok(())
    }

    /// Reads a CSO account from current world state.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no entity exists at the identity's key and
    /// `Store` if the read or decode fails.
    pub fn read_cso_data(&self, cso_id: &str) -> Result<Cso> {
        self.load_existing(cso_id)
    }

    /// Deletes a CSO account from current world state.
    ///
    /// The deletion targets the same composite key the entity was saved
    /// under. The key's revision history remains readable afterwards.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no entity exists at the identity's key and
    /// `Store` if the read or delete fails.
    pub fn delete_cso_user(&self, cso_id: &str) -> Result<()> {
        self.load_existing(cso_id)?;
        CsoStore::delete(&self.ledger, cso_id).context(StoreSnafu)?;
        tracing::info!(cso_id, "CSO deleted");
        Ok(())
    }

    /// Executes one energy transfer against the addressed charger.
    ///
    /// Ordering: the charger id is bounds-checked before anything leaves
    /// this contract, and the EV contract commits its side before any
    /// local mutation, so a remote rejection leaves local state untouched.
    /// A failing local save after remote success leaves the two contracts
    /// inconsistent until the enclosing engine transaction is discarded;
    /// that save error is surfaced, never retried.
    ///
    /// Returns the EV contract's response payload verbatim.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the CSO does not exist, `InvalidChargerId`
    /// for an out-of-range charger, `Remote` if the EV invocation fails
    /// or is rejected, and `Store` if the final save fails.
    pub fn transact_energy(&self, cso_id: &str, transfer: &EnergyTransfer) -> Result<Vec<u8>> {
        let mut cso = self.load_existing(cso_id)?;

        ensure!(
            cso.charger(transfer.charger_id).is_some(),
            InvalidChargerIdSnafu {
                cso_id,
                charger_id: transfer.charger_id,
                charger_count: cso.charger_count(),
            }
        );

        let payload = self
            .ev
            .update_ev_data(cso_id, transfer)
            .context(RemoteSnafu)?;

        // The EV side has accepted the transfer; commit the local half.
        if let Some(charger) = cso.charger_mut(transfer.charger_id) {
            charger.ev_id = transfer.ev_id.clone();
            charger.power_flow = transfer.power_flow;
        }
        cso.refresh_aggregates();
        CsoStore::save(&self.ledger, &cso).context(StoreSnafu)?;

        tracing::info!(
            cso_id,
            ev_id = %transfer.ev_id,
            charger_id = transfer.charger_id,
            power_flow = transfer.power_flow,
            "energy transfer committed"
        );
        Ok(payload)
    }

    /// Returns the committed revisions of a CSO account, oldest first.
    ///
    /// Each entry pairs the decoded snapshot with its transaction id and
    /// commit time. An identity with no history yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns `History` if the cursor cannot be opened or any historical
    /// record fails to decode; no partial results are returned.
    pub fn query_asset_history(&self, cso_id: &str) -> Result<Vec<CsoRevision>> {
        let scan = HistoryScan::open(&self.ledger, cso_id).context(HistorySnafu)?;
        let revisions = scan
            .collect::<std::result::Result<Vec<_>, _>>()
            .context(HistorySnafu)?;
        tracing::debug!(cso_id, revisions = revisions.len(), "history query served");
        Ok(revisions)
    }

    fn load_existing(&self, cso_id: &str) -> Result<Cso> {
        CsoStore::load(&self.ledger, cso_id)
            .context(StoreSnafu)?
            .context(NotFoundSnafu { cso_id })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::disallowed_methods)]
mod tests {
    use voltgrid_ledger_state::InMemoryLedger;

    use super::*;
    use crate::invoke::STATUS_SUCCESS;
    use crate::mock::MockEvContract;

    struct Harness {
        ledger: InMemoryLedger,
        ev: MockEvContract,
        contract: CsoContract<InMemoryLedger, MockEvContract>,
    }

    fn harness() -> Harness {
        let ledger = InMemoryLedger::new();
        let ev = MockEvContract::new();
        let contract = CsoContract::new(ledger.clone(), ev.clone(), ContractConfig::default());
        Harness {
            ledger,
            ev,
            contract,
        }
    }

    fn transfer_to(charger_id: u32) -> EnergyTransfer {
        EnergyTransfer {
            ev_id: "EV9".to_string(),
            charger_id,
            power_flow: 50.0,
            money: 3.75,
            temperature: 20.5,
            state_of_charge: 0.6,
            state_of_health: 0.99,
        }
    }

    #[test]
    fn test_create_then_read() {
        let h = harness();

        h.contract
            .create_cso_user("CSO1", 3)
            .expect("create succeeds");

        let cso = h.contract.read_cso_data("CSO1").expect("read succeeds");
        assert_eq!(cso.cso_id, "CSO1");
        assert_eq!(cso.charger_count(), 3);
        for (i, charger) in cso.chargers.iter().enumerate() {
            assert_eq!(charger.charger_id, i as u32 + 1);
            assert!(!charger.has_ev());
            assert_eq!(charger.power_flow, 0.0);
        }
    }

    #[test]
    fn test_create_existing_fails_and_preserves_stored_value() {
        let h = harness();

        h.contract.create_cso_user("CSO1", 2).expect("create");

        let err = h
            .contract
            .create_cso_user("CSO1", 5)
            .expect_err("duplicate create fails");
        assert!(matches!(err, ContractError::AlreadyExists { .. }));
        assert!(err.to_string().contains("CSO1"));

        // The stored entity is untouched by the failed create.
        let cso = h.contract.read_cso_data("CSO1").expect("read");
        assert_eq!(cso.charger_count(), 2);
    }

    #[test]
    fn test_create_rejects_zero_chargers() {
        let h = harness();

        let err = h
            .contract
            .create_cso_user("CSO1", 0)
            .expect_err("zero chargers rejected");
        assert!(matches!(err, ContractError::Validation { .. }));

        // Nothing was written.
        assert!(matches!(
            h.contract.read_cso_data("CSO1"),
            Err(ContractError::NotFound { .. })
        ));
    }

    #[test]
    fn test_create_rejects_empty_id() {
        let h = harness();
        let err = h
            .contract
            .create_cso_user("", 2)
            .expect_err("empty id rejected");
        assert!(matches!(err, ContractError::Validation { .. }));
    }

    #[test]
    fn test_read_missing_is_not_found() {
        let h = harness();
        let err = h.contract.read_cso_data("ghost").expect_err("read fails");
        assert!(matches!(err, ContractError::NotFound { .. }));
        assert!(err.to_string().contains("ghost"));
    }

    #[test]
    fn test_delete_missing_is_not_found() {
        let h = harness();
        let err = h
            .contract
            .delete_cso_user("ghost")
            .expect_err("delete fails");
        assert!(matches!(err, ContractError::NotFound { .. }));
    }

    #[test]
    fn test_delete_removes_the_stored_key() {
        let h = harness();

        h.contract.create_cso_user("CSO1", 2).expect("create");
        h.contract.delete_cso_user("CSO1").expect("delete");

        assert!(matches!(
            h.contract.read_cso_data("CSO1"),
            Err(ContractError::NotFound { .. })
        ));

        // Deletion targeted the derived key, so the identity can be
        // re-created cleanly.
        h.contract.create_cso_user("CSO1", 4).expect("re-create");
        let cso = h.contract.read_cso_data("CSO1").expect("read");
        assert_eq!(cso.charger_count(), 4);
    }

    #[test]
    fn test_transact_energy_success_updates_only_addressed_charger() {
        let h = harness();
        h.ev.respond_with(STATUS_SUCCESS, b"ev-ack", "");

        h.contract.create_cso_user("CSO1", 2).expect("create");
        let payload = h
            .contract
            .transact_energy("CSO1", &transfer_to(2))
            .expect("transfer succeeds");
        assert_eq!(payload, b"ev-ack");

        let cso = h.contract.read_cso_data("CSO1").expect("read");

        let untouched = cso.charger(1).expect("charger 1");
        assert!(!untouched.has_ev());
        assert_eq!(untouched.power_flow, 0.0);

        let updated = cso.charger(2).expect("charger 2");
        assert_eq!(updated.ev_id, "EV9");
        assert_eq!(updated.power_flow, 50.0);

        // Aggregates follow the recomputation rule.
        assert_eq!(cso.total_power_flow, 50.0);
        assert_eq!(cso.ev_count, 1);
    }

    #[test]
    fn test_transact_energy_missing_cso() {
        let h = harness();
        let err = h
            .contract
            .transact_energy("ghost", &transfer_to(1))
            .expect_err("transfer fails");
        assert!(matches!(err, ContractError::NotFound { .. }));
        assert_eq!(h.ev.invocation_count(), 0);
    }

    #[test]
    fn test_transact_energy_invalid_charger_skips_remote_and_save() {
        let h = harness();
        h.contract.create_cso_user("CSO1", 2).expect("create");

        for bad_id in [0, 3, 100] {
            let err = h
                .contract
                .transact_energy("CSO1", &transfer_to(bad_id))
                .expect_err("out-of-range charger");
            assert!(matches!(err, ContractError::InvalidChargerId { .. }));
            assert!(err.to_string().contains("CSO1"));
        }

        // No remote invocation happened.
        assert_eq!(h.ev.invocation_count(), 0);

        // No save happened: history still holds only the creation commit.
        let history = h.contract.query_asset_history("CSO1").expect("history");
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_transact_energy_remote_rejection_leaves_local_state_unchanged() {
        let h = harness();
        h.contract.create_cso_user("CSO1", 2).expect("create");
        h.ev.respond_with(500, b"", "EV refused the transfer");

        let before = h.contract.read_cso_data("CSO1").expect("read");

        let err = h
            .contract
            .transact_energy("CSO1", &transfer_to(1))
            .expect_err("remote rejection fails the transfer");
        assert!(matches!(err, ContractError::Remote { .. }));
        assert!(err.to_string().contains("EV refused the transfer"));

        let after = h.contract.read_cso_data("CSO1").expect("read");
        assert_eq!(before, after);

        // The rejection reached the EV contract but nothing was saved.
        assert_eq!(h.ev.invocation_count(), 1);
        let history = h.contract.query_asset_history("CSO1").expect("history");
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_transact_energy_transport_failure_leaves_local_state_unchanged() {
        let h = harness();
        h.contract.create_cso_user("CSO1", 1).expect("create");
        h.ev.fail_next(1);

        let err = h
            .contract
            .transact_energy("CSO1", &transfer_to(1))
            .expect_err("transport failure fails the transfer");
        assert!(matches!(err, ContractError::Remote { .. }));

        let cso = h.contract.read_cso_data("CSO1").expect("read");
        assert!(!cso.charger(1).expect("charger 1").has_ev());
    }

    #[test]
    fn test_query_asset_history_orders_revisions() {
        let h = harness();
        h.contract.create_cso_user("CSO1", 2).expect("create");

        h.contract
            .transact_energy("CSO1", &transfer_to(1))
            .expect("first transfer");
        h.contract
            .transact_energy("CSO1", &transfer_to(2))
            .expect("second transfer");

        let history = h.contract.query_asset_history("CSO1").expect("history");
        assert_eq!(history.len(), 3);

        assert_eq!(history[0].record.ev_count, 0);
        assert_eq!(history[1].record.ev_count, 1);
        assert_eq!(history[2].record.ev_count, 2);

        let mut tx_ids: Vec<&str> = history.iter().map(|r| r.tx_id.as_str()).collect();
        tx_ids.sort_unstable();
        tx_ids.dedup();
        assert_eq!(tx_ids.len(), 3, "transaction ids are distinct");
    }

    #[test]
    fn test_query_asset_history_survives_deletion() {
        let h = harness();
        h.contract.create_cso_user("CSO1", 1).expect("create");
        h.contract.delete_cso_user("CSO1").expect("delete");

        let history = h.contract.query_asset_history("CSO1").expect("history");
        assert_eq!(history.len(), 1, "creation commit remains readable");
        assert_eq!(history[0].record.charger_count(), 1);
    }

    #[test]
    fn test_query_asset_history_unknown_id_is_empty() {
        let h = harness();
        let history = h.contract.query_asset_history("ghost").expect("history");
        assert!(history.is_empty());
    }

    #[test]
    fn test_corrupt_stored_value_is_store_error() {
        let h = harness();

        // A raw engine write that bypasses the store plants junk at the
        // entity's derived key.
        let key = voltgrid_ledger_state::cso_key(&h.ledger, "CSO1").expect("derive key");
        h.ledger.put_state(&key, b"junk").expect("put");

        let err = h.contract.read_cso_data("CSO1").expect_err("read fails");
        assert!(matches!(err, ContractError::Store { .. }));
    }
}
