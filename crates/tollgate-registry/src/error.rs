//! Registry error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Contract not found: {0}")]
    ContractNotFound(String),

    #[error("Contract spec change detected: {0}")]
    SpecChange(String),
}

pub type RegistryResult<T> = Result<T, RegistryError>;
