//! Rule instances.
//!
//! [`RuleInstance`] wraps a concrete [`RiskRule`] with the parts every rule
//! shares: the `active` flag, the merged parameter table and snapshots.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tollgate_core::{OrderData, OrderRequest, TickData, TradeData};
use tracing::warn;

use crate::error::{RiskError, RiskResult};
use crate::template::{RiskHost, RiskRule, RuleContext, RuleDescriptor, RuleHooks, RuleSetting};

/// Name of the parameter every rule carries.
pub const ACTIVE_PARAMETER: &str = "active";

const ACTIVE_LABEL: &str = "Activate Rule";

/// Observable state of one rule, published on every update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleData {
    pub name: String,
    pub class_name: String,
    pub parameters: RuleSetting,
    pub variables: RuleSetting,
}

/// A configured rule owned by the engine.
pub struct RuleInstance {
    rule: Box<dyn RiskRule>,
    descriptor: &'static RuleDescriptor,
    active: bool,
    /// `active` first, then the rule's declared parameters.
    parameters: Vec<(&'static str, &'static str)>,
}

impl RuleInstance {
    /// Wrap a freshly constructed rule and apply its settings.
    pub fn new(rule: Box<dyn RiskRule>, setting: &RuleSetting) -> RiskResult<Self> {
        let descriptor = rule.descriptor();

        let mut parameters = Vec::with_capacity(descriptor.parameters.len() + 1);
        parameters.push((ACTIVE_PARAMETER, ACTIVE_LABEL));
        parameters.extend(
            descriptor
                .parameters
                .iter()
                .filter(|(name, _)| *name != ACTIVE_PARAMETER),
        );

        let mut instance = Self {
            rule,
            descriptor,
            active: true,
            parameters,
        };
        instance.update_setting(setting)?;
        Ok(instance)
    }

    pub fn name(&self) -> &'static str {
        self.descriptor.name
    }

    pub fn class_name(&self) -> &'static str {
        self.descriptor.class_name
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn hooks(&self) -> RuleHooks {
        self.rule.hooks()
    }

    /// Parameter names and labels, `active` first.
    pub fn parameters(&self) -> &[(&'static str, &'static str)] {
        &self.parameters
    }

    pub fn variables(&self) -> &'static [(&'static str, &'static str)] {
        self.descriptor.variables
    }

    /// Overwrite the declared parameters present in `setting`.
    ///
    /// Keys that are not declared parameters are ignored. A value of the
    /// wrong type fails the whole update and leaves the rule unchanged.
    pub fn update_setting(&mut self, setting: &RuleSetting) -> RiskResult<()> {
        let mut values = self.rule.parameter_values()?;
        let mut active = self.active;
        let mut changed = false;

        for (name, _) in &self.parameters {
            let Some(value) = setting.get(*name) else {
                continue;
            };

            if *name == ACTIVE_PARAMETER {
                active = value.as_bool().ok_or_else(|| RiskError::InvalidSetting {
                    rule: self.descriptor.name.to_string(),
                    reason: format!("active must be a boolean, got {value}"),
                })?;
            } else {
                values.insert((*name).to_string(), value.clone());
                changed = true;
            }
        }

        if changed {
            self.rule
                .apply_parameters(values)
                .map_err(|e| RiskError::InvalidSetting {
                    rule: self.descriptor.name.to_string(),
                    reason: e.to_string(),
                })?;
        }
        self.active = active;
        Ok(())
    }

    /// Current parameters and variables.
    ///
    /// Declared fields the rule does not report snapshot as `null`.
    pub fn snapshot(&self) -> RuleData {
        let values = self.rule.parameter_values().unwrap_or_else(|e| {
            warn!(rule = self.descriptor.name, error = %e, "Failed to read rule parameters");
            RuleSetting::new()
        });
        let mut parameters = RuleSetting::new();
        for (name, _) in &self.parameters {
            let value = if *name == ACTIVE_PARAMETER {
                Value::Bool(self.active)
            } else {
                values.get(*name).cloned().unwrap_or(Value::Null)
            };
            parameters.insert((*name).to_string(), value);
        }

        let values = self.rule.variable_values().unwrap_or_else(|e| {
            warn!(rule = self.descriptor.name, error = %e, "Failed to read rule variables");
            RuleSetting::new()
        });
        let mut variables = RuleSetting::new();
        for (name, _) in self.descriptor.variables {
            let value = values.get(*name).cloned().unwrap_or(Value::Null);
            variables.insert((*name).to_string(), value);
        }

        RuleData {
            name: self.descriptor.name.to_string(),
            class_name: self.descriptor.class_name.to_string(),
            parameters,
            variables,
        }
    }

    pub fn check_allowed(
        &mut self,
        host: &dyn RiskHost,
        req: &OrderRequest,
        gateway_name: &str,
    ) -> bool {
        let ctx = RuleContext::new(host, self.descriptor.name);
        let allowed = self.rule.check_allowed(&ctx, req, gateway_name);
        self.publish_if_updated(&ctx);
        allowed
    }

    pub fn on_tick(&mut self, host: &dyn RiskHost, tick: &TickData) {
        let ctx = RuleContext::new(host, self.descriptor.name);
        self.rule.on_tick(&ctx, tick);
        self.publish_if_updated(&ctx);
    }

    pub fn on_order(&mut self, host: &dyn RiskHost, order: &OrderData) {
        let ctx = RuleContext::new(host, self.descriptor.name);
        self.rule.on_order(&ctx, order);
        self.publish_if_updated(&ctx);
    }

    pub fn on_trade(&mut self, host: &dyn RiskHost, trade: &TradeData) {
        let ctx = RuleContext::new(host, self.descriptor.name);
        self.rule.on_trade(&ctx, trade);
        self.publish_if_updated(&ctx);
    }

    pub fn on_timer(&mut self, host: &dyn RiskHost) {
        let ctx = RuleContext::new(host, self.descriptor.name);
        self.rule.on_timer(&ctx);
        self.publish_if_updated(&ctx);
    }

    fn publish_if_updated(&self, ctx: &RuleContext<'_>) {
        if ctx.take_updated() {
            ctx.host().put_rule_event(self.snapshot());
        }
    }
}

impl std::fmt::Debug for RuleInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleInstance")
            .field("name", &self.descriptor.name)
            .field("active", &self.active)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::{from_object, to_object};
    use crate::testing::TestHost;
    use serde_json::json;

    static COUNTER_DESCRIPTOR: RuleDescriptor = RuleDescriptor {
        name: "Counter Check",
        class_name: "CounterRule",
        parameters: &[("limit", "Limit"), ("label", "Label")],
        variables: &[("seen", "Seen"), ("missing", "Missing")],
    };

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct CounterParams {
        limit: u64,
        label: String,
    }

    #[derive(Serialize)]
    struct CounterVariables {
        seen: u64,
    }

    struct CounterRule {
        params: CounterParams,
        seen: u64,
    }

    impl Default for CounterRule {
        fn default() -> Self {
            Self {
                params: CounterParams {
                    limit: 3,
                    label: "default".to_string(),
                },
                seen: 0,
            }
        }
    }

    impl RiskRule for CounterRule {
        fn descriptor(&self) -> &'static RuleDescriptor {
            &COUNTER_DESCRIPTOR
        }

        fn hooks(&self) -> RuleHooks {
            RuleHooks::NONE.with_timer()
        }

        fn parameter_values(&self) -> RiskResult<RuleSetting> {
            to_object(&self.params)
        }

        fn apply_parameters(&mut self, values: RuleSetting) -> RiskResult<()> {
            self.params = from_object(values)?;
            Ok(())
        }

        fn variable_values(&self) -> RiskResult<RuleSetting> {
            to_object(&CounterVariables { seen: self.seen })
        }

        fn on_timer(&mut self, ctx: &RuleContext<'_>) {
            self.seen += 1;
            ctx.put_event();
        }
    }

    fn instance(setting: RuleSetting) -> RuleInstance {
        RuleInstance::new(Box::<CounterRule>::default(), &setting).unwrap()
    }

    fn setting(value: Value) -> RuleSetting {
        match value {
            Value::Object(map) => map,
            _ => panic!("setting must be an object"),
        }
    }

    #[test]
    fn test_active_listed_first() {
        let rule = instance(RuleSetting::new());
        let names: Vec<_> = rule.parameters().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["active", "limit", "label"]);
        assert!(rule.is_active());
    }

    #[test]
    fn test_snapshot_defaults_and_missing_variable() {
        let data = instance(RuleSetting::new()).snapshot();
        assert_eq!(data.name, "Counter Check");
        assert_eq!(data.class_name, "CounterRule");
        assert_eq!(
            Value::Object(data.parameters),
            json!({"active": true, "limit": 3, "label": "default"})
        );
        assert_eq!(
            Value::Object(data.variables),
            json!({"seen": 0, "missing": null})
        );
    }

    #[test]
    fn test_update_setting_round_trip() {
        let mut rule = instance(RuleSetting::new());
        rule.update_setting(&setting(json!({"limit": 5}))).unwrap();
        assert_eq!(rule.snapshot().parameters.get("limit"), Some(&json!(5)));

        rule.update_setting(&setting(json!({"active": false})))
            .unwrap();
        assert!(!rule.is_active());
        assert_eq!(rule.snapshot().parameters.get("limit"), Some(&json!(5)));
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let mut rule = instance(RuleSetting::new());
        let before = rule.snapshot();
        rule.update_setting(&setting(json!({"not_a_param": 1})))
            .unwrap();
        assert_eq!(rule.snapshot(), before);
    }

    #[test]
    fn test_wrong_type_rejects_whole_update() {
        let mut rule = instance(RuleSetting::new());
        let before = rule.snapshot();

        let result = rule.update_setting(&setting(json!({"limit": "lots", "label": "x"})));
        assert!(matches!(result, Err(RiskError::InvalidSetting { .. })));

        let result = rule.update_setting(&setting(json!({"active": "yes", "limit": 9})));
        assert!(matches!(result, Err(RiskError::InvalidSetting { .. })));

        assert_eq!(rule.snapshot(), before);
    }

    #[test]
    fn test_construction_applies_setting() {
        let rule = instance(setting(json!({"active": false, "label": "night"})));
        assert!(!rule.is_active());
        assert_eq!(
            rule.snapshot().parameters.get("label"),
            Some(&json!("night"))
        );
    }

    #[test]
    fn test_put_event_publishes_snapshot() {
        let host = TestHost::new();
        let mut rule = instance(RuleSetting::new());

        rule.on_timer(&host);
        rule.on_timer(&host);

        let events = host.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].variables.get("seen"), Some(&json!(2)));
    }

    #[test]
    fn test_no_event_without_put_event() {
        let host = TestHost::new();
        let mut rule = instance(RuleSetting::new());
        let req = crate::testing::limit_request("rb2410.SHFE", "3650", "1");

        assert!(rule.check_allowed(&host, &req, "CTP"));
        assert!(host.events().is_empty());
    }
}
