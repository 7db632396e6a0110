//! Built-in risk rules.

mod active_order;
mod daily_limit;
mod duplicate_order;
mod order_size;
mod order_validity;

pub use active_order::{ActiveOrderParams, ActiveOrderRule, ACTIVE_ORDER_DESCRIPTOR};
pub use daily_limit::{DailyLimitParams, DailyLimitRule, DAILY_LIMIT_DESCRIPTOR};
pub use duplicate_order::{
    fingerprint, DuplicateOrderParams, DuplicateOrderRule, DUPLICATE_ORDER_DESCRIPTOR,
};
pub use order_size::{OrderSizeParams, OrderSizeRule, ORDER_SIZE_DESCRIPTOR};
pub use order_validity::{OrderValidityRule, ORDER_VALIDITY_DESCRIPTOR, PRICE_TOLERANCE};
