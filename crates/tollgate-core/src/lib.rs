//! Core trading objects for the tollgate risk engine.
//!
//! This crate provides the types every other crate speaks:
//! - `Price`, `Size`: precision-safe numeric types
//! - `OrderRequest`, `OrderData`, `TradeData`, `TickData`, `ContractData`
//! - `Direction`, `Offset`, `OrderType`, `Status`, `Exchange`

pub mod constant;
pub mod decimal;
pub mod error;
pub mod object;

pub use constant::{Direction, Exchange, Offset, OrderType, Status};
pub use decimal::{Price, Size};
pub use error::{CoreError, Result};
pub use object::{
    split_vt_symbol, ContractData, OrderData, OrderRequest, TickData, TradeData,
};
