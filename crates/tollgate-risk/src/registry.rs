//! Rule factories by class name.

use tracing::debug;

use crate::error::{RiskError, RiskResult};
use crate::rules::{
    ActiveOrderRule, DailyLimitRule, DuplicateOrderRule, OrderSizeRule, OrderValidityRule,
};
use crate::template::RiskRule;

type RuleFactory = Box<dyn Fn() -> Box<dyn RiskRule> + Send + Sync>;

/// Ordered map of rule class name to constructor.
///
/// Class names stay sorted so the engine loads rules in a stable order.
#[derive(Default)]
pub struct RuleRegistry {
    factories: Vec<(&'static str, RuleFactory)>,
}

impl RuleRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the five built-in rules.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register_rule::<ActiveOrderRule>();
        registry.register_rule::<DailyLimitRule>();
        registry.register_rule::<DuplicateOrderRule>();
        registry.register_rule::<OrderSizeRule>();
        registry.register_rule::<OrderValidityRule>();
        registry
    }

    /// Register a rule type under its descriptor's class name.
    pub fn register_rule<R>(&mut self)
    where
        R: RiskRule + Default + 'static,
    {
        let class_name = R::default().descriptor().class_name;
        self.register(class_name, || -> Box<dyn RiskRule> { Box::new(R::default()) });
    }

    /// Register a factory, replacing any previous one for `class_name`.
    pub fn register<F>(&mut self, class_name: &'static str, factory: F)
    where
        F: Fn() -> Box<dyn RiskRule> + Send + Sync + 'static,
    {
        debug!(class_name, "Rule class registered");
        match self
            .factories
            .binary_search_by(|(name, _)| name.cmp(&class_name))
        {
            Ok(idx) => self.factories[idx].1 = Box::new(factory),
            Err(idx) => self
                .factories
                .insert(idx, (class_name, Box::new(factory))),
        }
    }

    /// Construct a fresh rule of `class_name`.
    pub fn create(&self, class_name: &str) -> RiskResult<Box<dyn RiskRule>> {
        self.factories
            .iter()
            .find(|(name, _)| *name == class_name)
            .map(|(_, factory)| factory())
            .ok_or_else(|| RiskError::UnknownRuleClass(class_name.to_string()))
    }

    pub fn class_names(&self) -> Vec<&'static str> {
        self.factories.iter().map(|(name, _)| *name).collect()
    }

    pub fn contains(&self, class_name: &str) -> bool {
        self.factories.iter().any(|(name, _)| *name == class_name)
    }
}
