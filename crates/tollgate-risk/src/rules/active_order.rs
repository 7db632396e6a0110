//! Active order ceiling.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tollgate_core::{OrderData, OrderRequest};

use crate::error::RiskResult;
use crate::template::{
    from_object, to_object, RiskRule, RuleContext, RuleDescriptor, RuleHooks, RuleSetting,
};

pub static ACTIVE_ORDER_DESCRIPTOR: RuleDescriptor = RuleDescriptor {
    name: "Active Order Check",
    class_name: "ActiveOrderRule",
    parameters: &[("active_order_limit", "Active Order Limit")],
    variables: &[("active_order_count", "Active Order Count")],
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveOrderParams {
    pub active_order_limit: usize,
}

impl Default for ActiveOrderParams {
    fn default() -> Self {
        Self {
            active_order_limit: 50,
        }
    }
}

#[derive(Serialize)]
struct ActiveOrderVariables {
    active_order_count: usize,
}

/// Tracks working orders by `vt_orderid` and caps how many may be open.
#[derive(Debug, Default)]
pub struct ActiveOrderRule {
    params: ActiveOrderParams,
    active_orders: HashMap<String, OrderData>,
}

impl ActiveOrderRule {
    pub fn new(params: ActiveOrderParams) -> Self {
        Self {
            params,
            ..Self::default()
        }
    }

    pub fn active_order_count(&self) -> usize {
        self.active_orders.len()
    }

    pub fn is_tracking(&self, vt_orderid: &str) -> bool {
        self.active_orders.contains_key(vt_orderid)
    }
}

impl RiskRule for ActiveOrderRule {
    fn descriptor(&self) -> &'static RuleDescriptor {
        &ACTIVE_ORDER_DESCRIPTOR
    }

    fn hooks(&self) -> RuleHooks {
        RuleHooks::NONE.with_order()
    }

    fn parameter_values(&self) -> RiskResult<RuleSetting> {
        to_object(&self.params)
    }

    fn apply_parameters(&mut self, values: RuleSetting) -> RiskResult<()> {
        self.params = from_object(values)?;
        Ok(())
    }

    fn variable_values(&self) -> RiskResult<RuleSetting> {
        to_object(&ActiveOrderVariables {
            active_order_count: self.active_orders.len(),
        })
    }

    fn check_allowed(
        &mut self,
        ctx: &RuleContext<'_>,
        req: &OrderRequest,
        _gateway_name: &str,
    ) -> bool {
        let count = self.active_orders.len();
        if count >= self.params.active_order_limit {
            ctx.write_log(&format!(
                "Active Order Count {} reached limit {}: {}",
                count, self.params.active_order_limit, req
            ));
            return false;
        }
        true
    }

    fn on_order(&mut self, ctx: &RuleContext<'_>, order: &OrderData) {
        if order.is_active() {
            self.active_orders.insert(order.vt_orderid(), order.clone());
        } else {
            self.active_orders.remove(&order.vt_orderid());
        }
        ctx.put_event();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::RuleInstance;
    use crate::testing::{limit_request, order, TestHost};
    use serde_json::json;
    use tollgate_core::Status;

    const RB: &str = "rb2410.SHFE";

    #[test]
    fn test_count_tracks_distinct_active_ids() {
        let host = TestHost::new();
        let ctx = RuleContext::new(&host, ACTIVE_ORDER_DESCRIPTOR.name);
        let mut rule = ActiveOrderRule::default();

        rule.on_order(&ctx, &order("1", RB, Status::Submitting));
        rule.on_order(&ctx, &order("1", RB, Status::NotTraded));
        rule.on_order(&ctx, &order("2", RB, Status::PartTraded));
        assert_eq!(rule.active_order_count(), 2);

        rule.on_order(&ctx, &order("1", RB, Status::AllTraded));
        assert_eq!(rule.active_order_count(), 1);
        assert!(!rule.is_tracking("CTP.1"));
        assert!(rule.is_tracking("CTP.2"));

        // Unknown inactive order is a no-op removal
        rule.on_order(&ctx, &order("9", RB, Status::Rejected));
        assert_eq!(rule.active_order_count(), 1);
    }

    #[test]
    fn test_reactivated_order_counted_again() {
        let host = TestHost::new();
        let mut rule =
            RuleInstance::new(Box::<ActiveOrderRule>::default(), &RuleSetting::new()).unwrap();

        rule.on_order(&host, &order("1", RB, Status::NotTraded));
        rule.on_order(&host, &order("1", RB, Status::Cancelled));
        rule.on_order(&host, &order("1", RB, Status::NotTraded));

        let counts: Vec<_> = host
            .events()
            .iter()
            .map(|e| e.variables["active_order_count"].clone())
            .collect();
        assert_eq!(counts, vec![json!(1), json!(0), json!(1)]);
    }

    #[test]
    fn test_limit_denies() {
        let host = TestHost::new();
        let ctx = RuleContext::new(&host, ACTIVE_ORDER_DESCRIPTOR.name);
        let mut rule = ActiveOrderRule::new(ActiveOrderParams {
            active_order_limit: 2,
        });
        let req = limit_request(RB, "3650", "1");

        rule.on_order(&ctx, &order("1", RB, Status::NotTraded));
        assert!(rule.check_allowed(&ctx, &req, "CTP"));

        rule.on_order(&ctx, &order("2", RB, Status::NotTraded));
        assert!(!rule.check_allowed(&ctx, &req, "CTP"));
        assert!(host.logs()[0].starts_with("Active Order Count 2 reached limit 2"));
    }
}
