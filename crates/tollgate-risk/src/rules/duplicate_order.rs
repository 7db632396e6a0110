//! Duplicate order throttle.
//!
//! Counts identical requests by fingerprint and vetoes once a fingerprint
//! has been submitted `duplicate_order_limit` times.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tollgate_core::OrderRequest;

use crate::error::RiskResult;
use crate::template::{from_object, to_object, RiskRule, RuleContext, RuleDescriptor, RuleSetting};

pub static DUPLICATE_ORDER_DESCRIPTOR: RuleDescriptor = RuleDescriptor {
    name: "Duplicate Order Check",
    class_name: "DuplicateOrderRule",
    parameters: &[("duplicate_order_limit", "Duplicate Order Limit")],
    variables: &[("duplicate_order_count", "Duplicate Order Count")],
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateOrderParams {
    pub duplicate_order_limit: u64,
}

impl Default for DuplicateOrderParams {
    fn default() -> Self {
        Self {
            duplicate_order_limit: 10,
        }
    }
}

#[derive(Serialize)]
struct DuplicateOrderVariables<'a> {
    duplicate_order_count: &'a BTreeMap<String, u64>,
}

#[derive(Debug, Default)]
pub struct DuplicateOrderRule {
    params: DuplicateOrderParams,
    duplicate_order_count: BTreeMap<String, u64>,
}

impl DuplicateOrderRule {
    pub fn new(params: DuplicateOrderParams) -> Self {
        Self {
            params,
            ..Self::default()
        }
    }

    pub fn params(&self) -> &DuplicateOrderParams {
        &self.params
    }

    /// Times a request with the same fingerprint as `req` has been checked.
    pub fn count_for(&self, req: &OrderRequest) -> u64 {
        self.duplicate_order_count
            .get(&fingerprint(req))
            .copied()
            .unwrap_or(0)
    }
}

/// Identity of a request: two requests match iff every field in it does.
///
/// Decimals are normalized so `10.50` and `10.5` collide.
pub fn fingerprint(req: &OrderRequest) -> String {
    format!(
        "{}|{}|{}|{}|{}@{}",
        req.vt_symbol(),
        req.order_type,
        req.direction,
        req.offset,
        req.volume.normalized(),
        req.price.normalized()
    )
}

impl RiskRule for DuplicateOrderRule {
    fn descriptor(&self) -> &'static RuleDescriptor {
        &DUPLICATE_ORDER_DESCRIPTOR
    }

    fn parameter_values(&self) -> RiskResult<RuleSetting> {
        to_object(&self.params)
    }

    fn apply_parameters(&mut self, values: RuleSetting) -> RiskResult<()> {
        self.params = from_object(values)?;
        Ok(())
    }

    fn variable_values(&self) -> RiskResult<RuleSetting> {
        to_object(&DuplicateOrderVariables {
            duplicate_order_count: &self.duplicate_order_count,
        })
    }

    /// Counting happens here, on every check, whether or not the request is
    /// eventually routed.
    fn check_allowed(
        &mut self,
        ctx: &RuleContext<'_>,
        req: &OrderRequest,
        _gateway_name: &str,
    ) -> bool {
        let count = self.duplicate_order_count.entry(fingerprint(req)).or_insert(0);
        *count += 1;
        let count = *count;
        ctx.put_event();

        if count >= self.params.duplicate_order_limit {
            ctx.write_log(&format!(
                "Duplicate Order Count {} reached limit {}: {}",
                count, self.params.duplicate_order_limit, req
            ));
            return false;
        }

        true
    }
}
