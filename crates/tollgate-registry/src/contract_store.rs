//! Contract reference data cache.
//!
//! Caches contracts pushed by gateways and detects changes to the fields
//! risk rules depend on (tick size, multiplier, volume bounds).

use crate::error::{RegistryError, RegistryResult};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tollgate_core::ContractData;
use tracing::{debug, error};

/// Source of contract reference data.
///
/// Lookups must be in-memory: they run on the order-submission path.
pub trait ContractProvider: Send + Sync {
    fn get_contract(&self, vt_symbol: &str) -> Option<ContractData>;
}

/// Cache entry with change tracking.
#[derive(Debug, Clone)]
struct ContractEntry {
    contract: ContractData,
    last_update: DateTime<Utc>,
    version: u64,
}

/// Concurrent contract cache keyed by `vt_symbol`.
#[derive(Default)]
pub struct ContractStore {
    contracts: DashMap<String, ContractEntry>,
}

impl ContractStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from an initial contract list.
    ///
    /// Later entries for the same `vt_symbol` replace earlier ones.
    pub fn from_contracts(contracts: impl IntoIterator<Item = ContractData>) -> Self {
        let store = Self::new();
        for contract in contracts {
            store.replace(contract);
        }
        store
    }

    /// Insert or refresh a contract.
    ///
    /// Returns `Err(SpecChange)` and keeps the cached contract if a field
    /// used by risk checks changed. Use [`ContractStore::replace`] to accept
    /// the change deliberately.
    pub fn update(&self, contract: ContractData) -> RegistryResult<()> {
        let vt_symbol = contract.vt_symbol();

        if let Some(existing) = self.contracts.get(&vt_symbol) {
            if has_material_change(&existing.contract, &contract) {
                let msg = format!(
                    "{}: pricetick {}->{}, size {}->{}, min_volume {}->{}",
                    vt_symbol,
                    existing.contract.pricetick,
                    contract.pricetick,
                    existing.contract.size,
                    contract.size,
                    existing.contract.min_volume,
                    contract.min_volume,
                );
                error!(%msg, "CONTRACT SPEC CHANGE DETECTED");
                return Err(RegistryError::SpecChange(msg));
            }
        }

        self.replace(contract);
        Ok(())
    }

    /// Insert or overwrite a contract without change detection.
    pub fn replace(&self, contract: ContractData) {
        let vt_symbol = contract.vt_symbol();
        let version = self
            .contracts
            .get(&vt_symbol)
            .map(|e| e.version + 1)
            .unwrap_or(1);

        debug!(vt_symbol = %vt_symbol, version, "Contract cached");
        self.contracts.insert(
            vt_symbol,
            ContractEntry {
                contract,
                last_update: Utc::now(),
                version,
            },
        );
    }

    pub fn get(&self, vt_symbol: &str) -> Option<ContractData> {
        self.contracts.get(vt_symbol).map(|e| e.contract.clone())
    }

    /// Like [`ContractStore::get`] but treats a miss as an error.
    pub fn require(&self, vt_symbol: &str) -> RegistryResult<ContractData> {
        self.get(vt_symbol)
            .ok_or_else(|| RegistryError::ContractNotFound(vt_symbol.to_string()))
    }

    /// Number of times the contract has been written, 0 if unknown.
    pub fn version(&self, vt_symbol: &str) -> u64 {
        self.contracts.get(vt_symbol).map(|e| e.version).unwrap_or(0)
    }

    pub fn last_update(&self, vt_symbol: &str) -> Option<DateTime<Utc>> {
        self.contracts.get(vt_symbol).map(|e| e.last_update)
    }

    pub fn vt_symbols(&self) -> Vec<String> {
        self.contracts.iter().map(|e| e.key().clone()).collect()
    }

    pub fn contains(&self, vt_symbol: &str) -> bool {
        self.contracts.contains_key(vt_symbol)
    }

    pub fn remove(&self, vt_symbol: &str) -> Option<ContractData> {
        self.contracts.remove(vt_symbol).map(|(_, e)| e.contract)
    }

    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }
}

impl ContractProvider for ContractStore {
    fn get_contract(&self, vt_symbol: &str) -> Option<ContractData> {
        self.get(vt_symbol)
    }
}

fn has_material_change(old: &ContractData, new: &ContractData) -> bool {
    old.pricetick != new.pricetick
        || old.size != new.size
        || old.min_volume != new.min_volume
        || old.max_volume_limit() != new.max_volume_limit()
}
