//! Prometheus metrics for the risk engine.
//!
//! # Panics
//!
//! Metric registration uses `unwrap()`: a failure means duplicate metric
//! names, which is a startup bug. It only runs during lazy static
//! initialization.

use crate::error::{TelemetryError, TelemetryResult};
use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_int_counter, CounterVec, Encoder, IntCounter, TextEncoder,
};

/// Order requests evaluated by the rule chain.
pub static ORDERS_CHECKED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "tollgate_orders_checked_total",
        "Total order requests evaluated by the risk engine"
    )
    .unwrap()
});

/// Order requests vetoed, by the rule that denied them.
pub static ORDERS_DENIED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "tollgate_orders_denied_total",
        "Total order requests denied by a risk rule",
        &["rule"]
    )
    .unwrap()
});

/// Order requests forwarded to a gateway after passing every rule.
pub static ORDERS_ROUTED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "tollgate_orders_routed_total",
        "Total order requests routed to a gateway",
        &["gateway"]
    )
    .unwrap()
});

/// Rule state update events published.
pub static RULE_UPDATES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "tollgate_rule_updates_total",
        "Total rule state update events",
        &["rule"]
    )
    .unwrap()
});

/// Metrics facade.
pub struct Metrics;

impl Metrics {
    /// Record an order request entering the rule chain.
    pub fn order_checked() {
        ORDERS_CHECKED_TOTAL.inc();
    }

    /// Record a denial by `rule`.
    pub fn order_denied(rule: &str) {
        ORDERS_DENIED_TOTAL.with_label_values(&[rule]).inc();
    }

    /// Record an order forwarded to `gateway`.
    pub fn order_routed(gateway: &str) {
        ORDERS_ROUTED_TOTAL.with_label_values(&[gateway]).inc();
    }

    /// Record a rule state update event.
    pub fn rule_updated(rule: &str) {
        RULE_UPDATES_TOTAL.with_label_values(&[rule]).inc();
    }

    /// Render every registered metric in the Prometheus text format.
    pub fn gather_text() -> TelemetryResult<String> {
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&prometheus::gather(), &mut buffer)
            .map_err(|e| TelemetryError::Metrics(e.to_string()))?;
        String::from_utf8(buffer).map_err(|e| TelemetryError::Metrics(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_denied_counter_increments_per_rule() {
        let before = ORDERS_DENIED_TOTAL
            .with_label_values(&["Metrics Test Rule"])
            .get();
        Metrics::order_denied("Metrics Test Rule");
        Metrics::order_denied("Metrics Test Rule");
        let after = ORDERS_DENIED_TOTAL
            .with_label_values(&["Metrics Test Rule"])
            .get();
        assert_eq!(after - before, 2.0);
    }

    #[test]
    fn test_gather_text_contains_registered_metrics() {
        Metrics::order_checked();
        let text = Metrics::gather_text().unwrap();
        assert!(text.contains("tollgate_orders_checked_total"));
    }
}
