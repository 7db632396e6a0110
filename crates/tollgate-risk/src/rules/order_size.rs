//! Per-order volume and notional ceilings.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tollgate_core::{OrderRequest, Size};

use crate::error::RiskResult;
use crate::template::{from_object, to_object, RiskRule, RuleContext, RuleDescriptor, RuleSetting};

pub static ORDER_SIZE_DESCRIPTOR: RuleDescriptor = RuleDescriptor {
    name: "Order Size Check",
    class_name: "OrderSizeRule",
    parameters: &[
        ("order_volume_limit", "Order Volume Limit"),
        ("order_value_limit", "Order Value Limit"),
    ],
    variables: &[],
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSizeParams {
    pub order_volume_limit: Size,
    /// Notional ceiling: volume * price * contract multiplier.
    pub order_value_limit: Decimal,
}

impl Default for OrderSizeParams {
    fn default() -> Self {
        Self {
            order_volume_limit: Size::new(dec!(500)),
            order_value_limit: dec!(1000000),
        }
    }
}

/// Stateless. The notional check is skipped for market orders (zero price)
/// and for contracts the host cannot resolve.
#[derive(Debug, Default)]
pub struct OrderSizeRule {
    params: OrderSizeParams,
}

impl OrderSizeRule {
    pub fn new(params: OrderSizeParams) -> Self {
        Self { params }
    }
}

impl RiskRule for OrderSizeRule {
    fn descriptor(&self) -> &'static RuleDescriptor {
        &ORDER_SIZE_DESCRIPTOR
    }

    fn parameter_values(&self) -> RiskResult<RuleSetting> {
        to_object(&self.params)
    }

    fn apply_parameters(&mut self, values: RuleSetting) -> RiskResult<()> {
        self.params = from_object(values)?;
        Ok(())
    }

    fn check_allowed(
        &mut self,
        ctx: &RuleContext<'_>,
        req: &OrderRequest,
        _gateway_name: &str,
    ) -> bool {
        if req.volume > self.params.order_volume_limit {
            ctx.write_log(&format!(
                "Order Volume {} exceeded limit {}: {}",
                req.volume, self.params.order_volume_limit, req
            ));
            return false;
        }

        if req.price.is_zero() {
            return true;
        }

        if let Some(contract) = ctx.get_contract(&req.vt_symbol()) {
            let Some(order_value) = req.volume.notional(req.price, contract.size) else {
                ctx.write_log(&format!(
                    "Order Value overflowed, exceeded limit {}: {}",
                    self.params.order_value_limit, req
                ));
                return false;
            };
            if order_value > self.params.order_value_limit {
                ctx.write_log(&format!(
                    "Order Value {} exceeded limit {}: {}",
                    order_value.normalize(),
                    self.params.order_value_limit,
                    req
                ));
                return false;
            }
        }

        true
    }
}
