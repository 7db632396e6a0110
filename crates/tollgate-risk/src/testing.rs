//! Test fixtures shared by the rule unit tests.

use std::collections::HashMap;
use std::str::FromStr;

use parking_lot::Mutex;
use rust_decimal::Decimal;
use tollgate_core::{
    split_vt_symbol, ContractData, Direction, Offset, OrderData, OrderRequest, OrderType, Price,
    Size, Status, TradeData,
};

use crate::rule::RuleData;
use crate::template::RiskHost;

/// Host that records logs and rule events.
#[derive(Default)]
pub struct TestHost {
    contracts: HashMap<String, ContractData>,
    logs: Mutex<Vec<String>>,
    events: Mutex<Vec<RuleData>>,
}

impl TestHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contract(mut self, contract: ContractData) -> Self {
        self.contracts.insert(contract.vt_symbol(), contract);
        self
    }

    pub fn logs(&self) -> Vec<String> {
        self.logs.lock().clone()
    }

    pub fn events(&self) -> Vec<RuleData> {
        self.events.lock().clone()
    }
}

impl RiskHost for TestHost {
    fn write_log(&self, _rule: &str, msg: &str) {
        self.logs.lock().push(msg.to_string());
    }

    fn get_contract(&self, vt_symbol: &str) -> Option<ContractData> {
        self.contracts.get(vt_symbol).cloned()
    }

    fn put_rule_event(&self, data: RuleData) {
        self.events.lock().push(data);
    }
}

pub fn limit_request(vt_symbol: &str, price: &str, volume: &str) -> OrderRequest {
    let (symbol, exchange) = split_vt_symbol(vt_symbol).unwrap();
    OrderRequest {
        symbol,
        exchange,
        direction: Direction::Long,
        order_type: OrderType::Limit,
        volume: Size::from_str(volume).unwrap(),
        price: Price::from_str(price).unwrap(),
        offset: Offset::Open,
        reference: String::new(),
    }
}

pub fn market_request(vt_symbol: &str, volume: &str) -> OrderRequest {
    OrderRequest {
        order_type: OrderType::Market,
        price: Price::ZERO,
        ..limit_request(vt_symbol, "0", volume)
    }
}

pub fn contract(vt_symbol: &str, pricetick: &str, size: &str) -> ContractData {
    let (symbol, exchange) = split_vt_symbol(vt_symbol).unwrap();
    ContractData {
        gateway_name: "CTP".to_string(),
        symbol,
        exchange,
        name: String::new(),
        size: Decimal::from_str(size).unwrap(),
        pricetick: Price::from_str(pricetick).unwrap(),
        min_volume: Size::new(Decimal::ONE),
        max_volume: None,
    }
}

pub fn order(orderid: &str, vt_symbol: &str, status: Status) -> OrderData {
    let mut order = limit_request(vt_symbol, "3650", "1").create_order_data(orderid, "CTP");
    order.status = status;
    order
}

pub fn trade(tradeid: &str, orderid: &str, vt_symbol: &str) -> TradeData {
    let (symbol, exchange) = split_vt_symbol(vt_symbol).unwrap();
    TradeData {
        gateway_name: "CTP".to_string(),
        symbol,
        exchange,
        orderid: orderid.to_string(),
        tradeid: tradeid.to_string(),
        direction: Direction::Long,
        offset: Offset::Open,
        price: Price::from_str("3650").unwrap(),
        volume: Size::new(Decimal::ONE),
        datetime: None,
    }
}
