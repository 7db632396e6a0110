//! Contract conformance: known instrument, price on the tick grid, volume
//! within the exchange bounds.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tollgate_core::OrderRequest;

use crate::template::{RiskRule, RuleContext, RuleDescriptor};

pub static ORDER_VALIDITY_DESCRIPTOR: RuleDescriptor = RuleDescriptor {
    name: "Order Validity Check",
    class_name: "OrderValidityRule",
    parameters: &[],
    variables: &[],
};

/// Slack allowed when comparing a price remainder against the tick grid.
pub const PRICE_TOLERANCE: Decimal = dec!(0.000001);

#[derive(Debug, Default)]
pub struct OrderValidityRule;

/// Whether `remainder` (price floor-mod tick) puts the price on the grid.
///
/// A remainder within tolerance of either zero or a full tick counts.
fn on_tick_grid(remainder: Decimal, pricetick: Decimal) -> bool {
    remainder.abs() <= PRICE_TOLERANCE || (remainder - pricetick).abs() <= PRICE_TOLERANCE
}

impl RiskRule for OrderValidityRule {
    fn descriptor(&self) -> &'static RuleDescriptor {
        &ORDER_VALIDITY_DESCRIPTOR
    }

    fn check_allowed(
        &mut self,
        ctx: &RuleContext<'_>,
        req: &OrderRequest,
        _gateway_name: &str,
    ) -> bool {
        let vt_symbol = req.vt_symbol();
        let Some(contract) = ctx.get_contract(&vt_symbol) else {
            ctx.write_log(&format!("Contract {vt_symbol} not found: {req}"));
            return false;
        };

        if contract.pricetick.is_positive() {
            let on_grid = req
                .price
                .remainder(contract.pricetick)
                .map(|rem| on_tick_grid(rem, contract.pricetick.inner()))
                .unwrap_or(false);

            if !on_grid {
                ctx.write_log(&format!(
                    "Price {} is not a multiple of price tick {}: {}",
                    req.price, contract.pricetick, req
                ));
                return false;
            }
        }

        if let Some(max_volume) = contract.max_volume_limit() {
            if req.volume > max_volume {
                ctx.write_log(&format!(
                    "Order volume {} exceeds max limit {}: {}",
                    req.volume, max_volume, req
                ));
                return false;
            }
        }

        if req.volume < contract.min_volume {
            ctx.write_log(&format!(
                "Order volume {} below min limit {}: {}",
                req.volume, contract.min_volume, req
            ));
            return false;
        }

        true
    }
}
