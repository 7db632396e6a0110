//! Trading objects exchanged between gateways, the risk engine and strategies.
//!
//! Instruments are addressed by `vt_symbol` (`"{symbol}.{exchange}"`), orders
//! and trades by gateway-scoped ids (`"{gateway_name}.{id}"`).

use crate::constant::{Direction, Exchange, Offset, OrderType, Status};
use crate::decimal::{Price, Size};
use crate::error::{CoreError, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

fn vt_symbol(symbol: &str, exchange: &Exchange) -> String {
    format!("{symbol}.{exchange}")
}

/// Split a `vt_symbol` into symbol and exchange at the last `.`.
pub fn split_vt_symbol(vt_symbol: &str) -> Result<(String, Exchange)> {
    match vt_symbol.rsplit_once('.') {
        Some((symbol, exchange)) if !symbol.is_empty() && !exchange.is_empty() => {
            Ok((symbol.to_string(), Exchange::new(exchange)))
        }
        _ => Err(CoreError::InvalidSymbol(vt_symbol.to_string())),
    }
}

/// Outbound order request, before it reaches a gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub symbol: String,
    pub exchange: Exchange,
    pub direction: Direction,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    pub volume: Size,
    /// Zero for market orders.
    #[serde(default)]
    pub price: Price,
    #[serde(default)]
    pub offset: Offset,
    #[serde(default)]
    pub reference: String,
}

impl OrderRequest {
    pub fn vt_symbol(&self) -> String {
        vt_symbol(&self.symbol, &self.exchange)
    }

    /// Build the order object a gateway reports right after accepting this request.
    pub fn create_order_data(&self, orderid: &str, gateway_name: &str) -> OrderData {
        OrderData {
            gateway_name: gateway_name.to_string(),
            symbol: self.symbol.clone(),
            exchange: self.exchange.clone(),
            orderid: orderid.to_string(),
            order_type: self.order_type,
            direction: self.direction,
            offset: self.offset,
            price: self.price,
            volume: self.volume,
            traded: Size::ZERO,
            status: Status::Submitting,
            datetime: Some(Utc::now()),
            reference: self.reference.clone(),
        }
    }
}

impl fmt::Display for OrderRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "OrderRequest({} {} {} {} {}@{})",
            self.vt_symbol(),
            self.order_type,
            self.direction,
            self.offset,
            self.volume,
            self.price
        )
    }
}

/// Order state update pushed by a gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderData {
    pub gateway_name: String,
    pub symbol: String,
    pub exchange: Exchange,
    pub orderid: String,
    #[serde(rename = "type", default = "default_order_type")]
    pub order_type: OrderType,
    pub direction: Direction,
    #[serde(default)]
    pub offset: Offset,
    #[serde(default)]
    pub price: Price,
    #[serde(default)]
    pub volume: Size,
    #[serde(default)]
    pub traded: Size,
    pub status: Status,
    #[serde(default)]
    pub datetime: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reference: String,
}

fn default_order_type() -> OrderType {
    OrderType::Limit
}

impl OrderData {
    pub fn vt_symbol(&self) -> String {
        vt_symbol(&self.symbol, &self.exchange)
    }

    pub fn vt_orderid(&self) -> String {
        format!("{}.{}", self.gateway_name, self.orderid)
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

/// Fill report pushed by a gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeData {
    pub gateway_name: String,
    pub symbol: String,
    pub exchange: Exchange,
    pub orderid: String,
    pub tradeid: String,
    pub direction: Direction,
    #[serde(default)]
    pub offset: Offset,
    pub price: Price,
    pub volume: Size,
    #[serde(default)]
    pub datetime: Option<DateTime<Utc>>,
}

impl TradeData {
    pub fn vt_symbol(&self) -> String {
        vt_symbol(&self.symbol, &self.exchange)
    }

    pub fn vt_orderid(&self) -> String {
        format!("{}.{}", self.gateway_name, self.orderid)
    }

    pub fn vt_tradeid(&self) -> String {
        format!("{}.{}", self.gateway_name, self.tradeid)
    }
}

/// Top-of-book market data snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickData {
    pub gateway_name: String,
    pub symbol: String,
    pub exchange: Exchange,
    pub datetime: DateTime<Utc>,
    #[serde(default)]
    pub last_price: Price,
    #[serde(default)]
    pub volume: Size,
    #[serde(default)]
    pub bid_price_1: Price,
    #[serde(default)]
    pub ask_price_1: Price,
}

impl TickData {
    pub fn vt_symbol(&self) -> String {
        vt_symbol(&self.symbol, &self.exchange)
    }
}

/// Contract reference data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractData {
    pub gateway_name: String,
    pub symbol: String,
    pub exchange: Exchange,
    #[serde(default)]
    pub name: String,
    /// Contract multiplier.
    pub size: Decimal,
    /// Minimum price increment.
    pub pricetick: Price,
    #[serde(default = "default_min_volume")]
    pub min_volume: Size,
    /// `None` or zero means no maximum.
    #[serde(default)]
    pub max_volume: Option<Size>,
}

fn default_min_volume() -> Size {
    Size::new(Decimal::ONE)
}

impl ContractData {
    pub fn vt_symbol(&self) -> String {
        vt_symbol(&self.symbol, &self.exchange)
    }

    /// Maximum order volume, if the exchange declares a positive one.
    pub fn max_volume_limit(&self) -> Option<Size> {
        self.max_volume.filter(|v| v.is_positive())
    }
}
