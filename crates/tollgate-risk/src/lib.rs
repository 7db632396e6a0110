//! Pre-trade risk rules for tollgate.
//!
//! A [`RiskEngine`] holds an ordered chain of [`RiskRule`]s. Order, trade,
//! tick and timer events keep each rule's counters current; every outbound
//! [`OrderRequest`](tollgate_core::OrderRequest) must pass every active
//! rule's `check_allowed` before it may be routed.
//!
//! Built-in rules:
//! - `ActiveOrderRule`: ceiling on working orders
//! - `DailyLimitRule`: daily order/cancel/trade ceilings, global and per contract
//! - `DuplicateOrderRule`: throttle on identical requests
//! - `OrderSizeRule`: per-order volume and notional ceilings
//! - `OrderValidityRule`: tick grid and exchange volume bounds

pub mod engine;
pub mod error;
pub mod event;
pub mod registry;
pub mod rule;
pub mod rules;
pub mod setting;
pub mod template;

#[cfg(test)]
mod testing;

pub use engine::{OrderRouter, RiskEngine, RiskEngineConfig, INTERCEPT_PREFIX};
pub use error::{RiskError, RiskResult};
pub use event::{LogData, RiskEvent};
pub use registry::RuleRegistry;
pub use rule::{RuleData, RuleInstance, ACTIVE_PARAMETER};
pub use setting::{SettingStore, SETTING_FILENAME};
pub use template::{RiskHost, RiskRule, RuleContext, RuleDescriptor, RuleHooks, RuleSetting};
