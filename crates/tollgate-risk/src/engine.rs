//! Risk gate.
//!
//! Owns the configured rules, fans market and execution events out to the
//! rules that subscribed to them, and runs every active rule's
//! `check_allowed` before an order request may reach a gateway. The first
//! denial wins.
//!
//! Each rule sits behind its own mutex, so the engine can be shared between
//! a market-data task and an order-submission task.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tollgate_core::{ContractData, OrderData, OrderRequest, TickData, TradeData};
use tollgate_registry::ContractProvider;
use tollgate_telemetry::Metrics;
use tracing::{debug, error, info, trace, warn};

use crate::error::{RiskError, RiskResult};
use crate::event::{LogData, RiskEvent};
use crate::registry::RuleRegistry;
use crate::rule::{RuleData, RuleInstance};
use crate::setting::{SettingStore, SETTING_FILENAME};
use crate::template::{RiskHost, RiskRule, RuleSetting};

/// Prefix for every rule message published as a log event.
pub const INTERCEPT_PREFIX: &str = "Order intercepted, ";

/// Engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskEngineConfig {
    /// Rule settings file.
    #[serde(default = "default_setting_path")]
    pub setting_path: PathBuf,
    /// Rule class names to load. Empty loads every registered class.
    #[serde(default)]
    pub rules: Vec<String>,
}

fn default_setting_path() -> PathBuf {
    PathBuf::from(SETTING_FILENAME)
}

impl Default for RiskEngineConfig {
    fn default() -> Self {
        Self {
            setting_path: default_setting_path(),
            rules: Vec::new(),
        }
    }
}

/// Outbound order path to a gateway.
pub trait OrderRouter {
    /// Send `req` and return its `vt_orderid`, or `None` if the gateway
    /// refused it.
    fn send_order(&self, req: &OrderRequest, gateway_name: &str) -> Option<String>;
}

/// Rule indices subscribed to each event type.
#[derive(Debug, Default)]
struct Subscriptions {
    tick: Vec<usize>,
    order: Vec<usize>,
    trade: Vec<usize>,
    timer: Vec<usize>,
}

pub struct RiskEngine {
    rules: Vec<Mutex<RuleInstance>>,
    names: Vec<&'static str>,
    index: HashMap<&'static str, usize>,
    subscriptions: Subscriptions,
    field_names: HashMap<&'static str, &'static str>,
    settings: Mutex<SettingStore>,
    contracts: Arc<dyn ContractProvider>,
    event_tx: mpsc::UnboundedSender<RiskEvent>,
}

impl RiskEngine {
    /// Build an engine with the configured rule classes.
    pub fn new(
        config: &RiskEngineConfig,
        registry: &RuleRegistry,
        contracts: Arc<dyn ContractProvider>,
        event_tx: mpsc::UnboundedSender<RiskEvent>,
    ) -> RiskResult<Self> {
        let settings = SettingStore::load(&config.setting_path)?;
        let mut engine = Self::with_settings(settings, contracts, event_tx);

        let class_names: Vec<String> = if config.rules.is_empty() {
            registry.class_names().into_iter().map(String::from).collect()
        } else {
            config.rules.clone()
        };

        for class_name in &class_names {
            engine.add_rule(registry.create(class_name)?)?;
        }

        info!(
            rules = engine.rules.len(),
            setting_path = %config.setting_path.display(),
            "Risk engine started"
        );
        Ok(engine)
    }

    /// Build an engine with no rules.
    pub fn with_settings(
        settings: SettingStore,
        contracts: Arc<dyn ContractProvider>,
        event_tx: mpsc::UnboundedSender<RiskEvent>,
    ) -> Self {
        Self {
            rules: Vec::new(),
            names: Vec::new(),
            index: HashMap::new(),
            subscriptions: Subscriptions::default(),
            field_names: HashMap::new(),
            settings: Mutex::new(settings),
            contracts,
            event_tx,
        }
    }

    /// Configure `rule` from the stored settings and append it to the chain.
    pub fn add_rule(&mut self, rule: Box<dyn RiskRule>) -> RiskResult<()> {
        let name = rule.descriptor().name;
        if self.index.contains_key(name) {
            return Err(RiskError::DuplicateRule(name.to_string()));
        }

        let setting = self.settings.lock().get(name);
        let instance = RuleInstance::new(rule, &setting)?;

        let idx = self.rules.len();
        let hooks = instance.hooks();
        if hooks.tick {
            self.subscriptions.tick.push(idx);
        }
        if hooks.order {
            self.subscriptions.order.push(idx);
        }
        if hooks.trade {
            self.subscriptions.trade.push(idx);
        }
        if hooks.timer {
            self.subscriptions.timer.push(idx);
        }

        for &(field, label) in instance.parameters().iter().chain(instance.variables()) {
            self.field_names.insert(field, label);
        }

        debug!(
            rule = name,
            class_name = instance.class_name(),
            active = instance.is_active(),
            ?hooks,
            "Risk rule loaded"
        );

        self.index.insert(name, idx);
        self.names.push(name);
        self.rules.push(Mutex::new(instance));
        Ok(())
    }

    pub fn process_tick(&self, tick: &TickData) {
        for &idx in &self.subscriptions.tick {
            let mut rule = self.rules[idx].lock();
            if rule.is_active() {
                rule.on_tick(self, tick);
            }
        }
    }

    pub fn process_order(&self, order: &OrderData) {
        for &idx in &self.subscriptions.order {
            let mut rule = self.rules[idx].lock();
            if rule.is_active() {
                rule.on_order(self, order);
            }
        }
    }

    pub fn process_trade(&self, trade: &TradeData) {
        for &idx in &self.subscriptions.trade {
            let mut rule = self.rules[idx].lock();
            if rule.is_active() {
                rule.on_trade(self, trade);
            }
        }
    }

    /// Drive the once-per-second rule hook.
    pub fn process_timer(&self) {
        for &idx in &self.subscriptions.timer {
            let mut rule = self.rules[idx].lock();
            if rule.is_active() {
                rule.on_timer(self);
            }
        }
    }

    /// Run the rule chain. Stops at the first active rule that denies.
    pub fn check_allowed(&self, req: &OrderRequest, gateway_name: &str) -> bool {
        Metrics::order_checked();

        for slot in &self.rules {
            let mut rule = slot.lock();
            if !rule.is_active() {
                continue;
            }
            if !rule.check_allowed(self, req, gateway_name) {
                Metrics::order_denied(rule.name());
                debug!(rule = rule.name(), gateway = gateway_name, %req, "Order request denied");
                return false;
            }
        }

        trace!(gateway = gateway_name, %req, "Order request allowed");
        true
    }

    /// Check `req` and, if allowed, route it. `None` when vetoed or refused.
    pub fn send_order<R>(&self, router: &R, req: &OrderRequest, gateway_name: &str) -> Option<String>
    where
        R: OrderRouter + ?Sized,
    {
        if !self.check_allowed(req, gateway_name) {
            return None;
        }

        let vt_orderid = router.send_order(req, gateway_name)?;
        Metrics::order_routed(gateway_name);
        Some(vt_orderid)
    }

    /// Apply, persist and publish a new setting for `rule_name`.
    ///
    /// A rejected setting or a failed save leaves the rule, the stored
    /// settings and the event stream untouched.
    pub fn update_rule_setting(&self, rule_name: &str, setting: RuleSetting) -> RiskResult<()> {
        let idx = self.rule_index(rule_name)?;

        let data = {
            let mut rule = self.rules[idx].lock();
            let previous = rule.snapshot().parameters;
            rule.update_setting(&setting)?;

            let mut settings = self.settings.lock();
            let mut staged = settings.clone();
            staged.set(rule_name, setting);
            if let Err(e) = staged.save() {
                if let Err(restore) = rule.update_setting(&previous) {
                    error!(rule = rule_name, error = %restore, "Failed to restore rule setting");
                }
                return Err(e);
            }
            *settings = staged;

            rule.snapshot()
        };
        self.put_rule_event(data);

        info!(rule = rule_name, "Risk rule setting updated");
        Ok(())
    }

    /// Rule names in chain order.
    pub fn get_all_rule_names(&self) -> Vec<String> {
        self.names.iter().map(|name| name.to_string()).collect()
    }

    pub fn get_rule_data(&self, rule_name: &str) -> RiskResult<RuleData> {
        let idx = self.rule_index(rule_name)?;
        let data = self.rules[idx].lock().snapshot();
        Ok(data)
    }

    /// Display label for a parameter or variable name.
    pub fn get_field_name(&self, field: &str) -> String {
        self.field_names
            .get(field)
            .copied()
            .unwrap_or(field)
            .to_string()
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    fn rule_index(&self, rule_name: &str) -> RiskResult<usize> {
        self.index
            .get(rule_name)
            .copied()
            .ok_or_else(|| RiskError::UnknownRule(rule_name.to_string()))
    }

    fn publish(&self, event: RiskEvent) {
        // A closed receiver only means nobody is listening.
        let _ = self.event_tx.send(event);
    }
}

impl RiskHost for RiskEngine {
    fn write_log(&self, rule: &str, msg: &str) {
        let log_msg = format!("{INTERCEPT_PREFIX}{msg}");
        warn!(rule, "{}", log_msg);

        self.publish(RiskEvent::Log(LogData::new(rule, log_msg)));
        self.publish(RiskEvent::Notify(msg.to_string()));
    }

    fn get_contract(&self, vt_symbol: &str) -> Option<ContractData> {
        self.contracts.get_contract(vt_symbol)
    }

    fn put_rule_event(&self, data: RuleData) {
        Metrics::rule_updated(&data.name);
        self.publish(RiskEvent::Rule(data));
    }
}

impl std::fmt::Debug for RiskEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RiskEngine")
            .field("rules", &self.names)
            .finish()
    }
}
