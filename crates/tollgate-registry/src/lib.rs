//! Contract reference data for the tollgate risk engine.
//!
//! Rules resolve a `vt_symbol` to its contract (tick size, volume bounds,
//! multiplier) through the [`ContractProvider`] seam. [`ContractStore`] is
//! the in-memory implementation, safe to share between the market-data and
//! order-submission paths.

pub mod contract_store;
pub mod error;

pub use contract_store::{ContractProvider, ContractStore};
pub use error::{RegistryError, RegistryResult};
