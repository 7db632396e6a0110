//! Rule contract.
//!
//! A risk rule is a stateful check with a static [`RuleDescriptor`], a typed
//! parameter struct exposed through `serde_json` maps, event hooks that keep
//! its state in step with the order/trade/tick stream, and a synchronous
//! `check_allowed` decision.
//!
//! Rules never hold a reference to the engine. Every hook receives a
//! [`RuleContext`] that borrows the host for the duration of the call.

use std::cell::Cell;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tollgate_core::{ContractData, OrderData, OrderRequest, TickData, TradeData};

use crate::error::{RiskError, RiskResult};
use crate::rule::RuleData;

/// Parameter values keyed by parameter name, in declaration order.
///
/// Also the persisted settings shape for one rule.
pub type RuleSetting = serde_json::Map<String, Value>;

/// Static metadata for one rule type.
///
/// `parameters` and `variables` pair each field name with its display label.
#[derive(Debug)]
pub struct RuleDescriptor {
    /// Display name, also the key in the settings file.
    pub name: &'static str,
    pub class_name: &'static str,
    pub parameters: &'static [(&'static str, &'static str)],
    pub variables: &'static [(&'static str, &'static str)],
}

/// Event hooks a rule wants delivered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuleHooks {
    pub tick: bool,
    pub order: bool,
    pub trade: bool,
    pub timer: bool,
}

impl RuleHooks {
    pub const NONE: Self = Self {
        tick: false,
        order: false,
        trade: false,
        timer: false,
    };

    pub const fn with_tick(mut self) -> Self {
        self.tick = true;
        self
    }

    pub const fn with_order(mut self) -> Self {
        self.order = true;
        self
    }

    pub const fn with_trade(mut self) -> Self {
        self.trade = true;
        self
    }

    pub const fn with_timer(mut self) -> Self {
        self.timer = true;
        self
    }
}

/// Services the hosting engine provides to rules.
///
/// All methods are fire-and-forget: a failing sink must not change a
/// rule's decision.
pub trait RiskHost {
    /// Record a denial or other rule message.
    fn write_log(&self, rule: &str, msg: &str);

    /// Resolve contract reference data by `vt_symbol`.
    fn get_contract(&self, vt_symbol: &str) -> Option<ContractData>;

    /// Publish a rule's observable state.
    fn put_rule_event(&self, data: RuleData);
}

/// Per-call view of the host handed to rule hooks.
pub struct RuleContext<'a> {
    host: &'a dyn RiskHost,
    rule_name: &'static str,
    updated: Cell<bool>,
}

impl<'a> RuleContext<'a> {
    pub fn new(host: &'a dyn RiskHost, rule_name: &'static str) -> Self {
        Self {
            host,
            rule_name,
            updated: Cell::new(false),
        }
    }

    pub fn write_log(&self, msg: &str) {
        self.host.write_log(self.rule_name, msg);
    }

    pub fn get_contract(&self, vt_symbol: &str) -> Option<ContractData> {
        self.host.get_contract(vt_symbol)
    }

    /// Mark the rule's observable state as changed.
    ///
    /// The snapshot is published once the hook returns.
    pub fn put_event(&self) {
        self.updated.set(true);
    }

    pub(crate) fn host(&self) -> &'a dyn RiskHost {
        self.host
    }

    pub(crate) fn take_updated(&self) -> bool {
        self.updated.replace(false)
    }
}

/// A pre-trade risk rule.
///
/// `Default` construction of an implementor is its initial state: every
/// declared parameter at its default value and all counters empty.
pub trait RiskRule: Send {
    fn descriptor(&self) -> &'static RuleDescriptor;

    /// Hooks the engine should deliver to this rule.
    fn hooks(&self) -> RuleHooks {
        RuleHooks::NONE
    }

    /// Current parameter values, keyed by declared parameter name.
    fn parameter_values(&self) -> RiskResult<RuleSetting> {
        Ok(RuleSetting::new())
    }

    /// Replace all parameters from a complete value map.
    ///
    /// Must leave the rule untouched when any value has the wrong type.
    fn apply_parameters(&mut self, _values: RuleSetting) -> RiskResult<()> {
        Ok(())
    }

    /// Current variable values, keyed by declared variable name.
    fn variable_values(&self) -> RiskResult<RuleSetting> {
        Ok(RuleSetting::new())
    }

    /// Decide whether `req` may be sent through `gateway_name`.
    fn check_allowed(
        &mut self,
        _ctx: &RuleContext<'_>,
        _req: &OrderRequest,
        _gateway_name: &str,
    ) -> bool {
        true
    }

    fn on_tick(&mut self, _ctx: &RuleContext<'_>, _tick: &TickData) {}

    fn on_order(&mut self, _ctx: &RuleContext<'_>, _order: &OrderData) {}

    fn on_trade(&mut self, _ctx: &RuleContext<'_>, _trade: &TradeData) {}

    /// Called once per second.
    fn on_timer(&mut self, _ctx: &RuleContext<'_>) {}
}

/// Serialize a parameter or variable struct into a field map.
pub fn to_object<T: Serialize>(value: &T) -> RiskResult<RuleSetting> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(RiskError::InvalidSetting {
            rule: std::any::type_name::<T>().to_string(),
            reason: format!("expected a struct, serialized to {other}"),
        }),
    }
}

/// Deserialize a typed parameter struct from a field map.
pub fn from_object<T: DeserializeOwned>(map: RuleSetting) -> RiskResult<T> {
    Ok(serde_json::from_value(Value::Object(map))?)
}
