//! Daily order, cancel and trade ceilings.
//!
//! Counts are kept globally and per `vt_symbol`. Order and trade ids are
//! de-duplicated so repeated status updates for one order count once.
//! Nothing is reset during a session; counts start from zero on each
//! process start.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use tollgate_core::{OrderData, OrderRequest, Status, TradeData};

use crate::error::RiskResult;
use crate::template::{
    from_object, to_object, RiskRule, RuleContext, RuleDescriptor, RuleHooks, RuleSetting,
};

pub static DAILY_LIMIT_DESCRIPTOR: RuleDescriptor = RuleDescriptor {
    name: "Daily Limit Check",
    class_name: "DailyLimitRule",
    parameters: &[
        ("total_order_limit", "Total Order Limit"),
        ("total_cancel_limit", "Total Cancel Limit"),
        ("total_trade_limit", "Total Trade Limit"),
        ("contract_order_limit", "Contract Order Limit"),
        ("contract_cancel_limit", "Contract Cancel Limit"),
        ("contract_trade_limit", "Contract Trade Limit"),
    ],
    variables: &[
        ("total_order_count", "Total Order Count"),
        ("total_cancel_count", "Total Cancel Count"),
        ("total_trade_count", "Total Trade Count"),
        ("contract_order_count", "Contract Order Count"),
        ("contract_cancel_count", "Contract Cancel Count"),
        ("contract_trade_count", "Contract Trade Count"),
    ],
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyLimitParams {
    pub total_order_limit: u64,
    pub total_cancel_limit: u64,
    pub total_trade_limit: u64,
    pub contract_order_limit: u64,
    pub contract_cancel_limit: u64,
    pub contract_trade_limit: u64,
}

impl Default for DailyLimitParams {
    fn default() -> Self {
        Self {
            total_order_limit: 20_000,
            total_cancel_limit: 10_000,
            total_trade_limit: 10_000,
            contract_order_limit: 2_000,
            contract_cancel_limit: 1_000,
            contract_trade_limit: 1_000,
        }
    }
}

#[derive(Serialize)]
struct DailyLimitVariables<'a> {
    total_order_count: u64,
    total_cancel_count: u64,
    total_trade_count: u64,
    contract_order_count: &'a BTreeMap<String, u64>,
    contract_cancel_count: &'a BTreeMap<String, u64>,
    contract_trade_count: &'a BTreeMap<String, u64>,
}

#[derive(Debug, Default)]
pub struct DailyLimitRule {
    params: DailyLimitParams,

    total_order_count: u64,
    total_cancel_count: u64,
    total_trade_count: u64,
    contract_order_count: BTreeMap<String, u64>,
    contract_cancel_count: BTreeMap<String, u64>,
    contract_trade_count: BTreeMap<String, u64>,

    all_orderids: HashSet<String>,
    cancel_orderids: HashSet<String>,
    all_tradeids: HashSet<String>,
}

impl DailyLimitRule {
    pub fn new(params: DailyLimitParams) -> Self {
        Self {
            params,
            ..Self::default()
        }
    }

    pub fn params(&self) -> &DailyLimitParams {
        &self.params
    }

    pub fn total_order_count(&self) -> u64 {
        self.total_order_count
    }

    pub fn total_cancel_count(&self) -> u64 {
        self.total_cancel_count
    }

    pub fn total_trade_count(&self) -> u64 {
        self.total_trade_count
    }

    pub fn contract_order_count(&self, vt_symbol: &str) -> u64 {
        lookup(&self.contract_order_count, vt_symbol)
    }

    pub fn contract_cancel_count(&self, vt_symbol: &str) -> u64 {
        lookup(&self.contract_cancel_count, vt_symbol)
    }

    pub fn contract_trade_count(&self, vt_symbol: &str) -> u64 {
        lookup(&self.contract_trade_count, vt_symbol)
    }
}

fn lookup(counts: &BTreeMap<String, u64>, vt_symbol: &str) -> u64 {
    counts.get(vt_symbol).copied().unwrap_or(0)
}

fn increment(counts: &mut BTreeMap<String, u64>, vt_symbol: String) {
    *counts.entry(vt_symbol).or_insert(0) += 1;
}

impl RiskRule for DailyLimitRule {
    fn descriptor(&self) -> &'static RuleDescriptor {
        &DAILY_LIMIT_DESCRIPTOR
    }

    fn hooks(&self) -> RuleHooks {
        RuleHooks::NONE.with_order().with_trade()
    }

    fn parameter_values(&self) -> RiskResult<RuleSetting> {
        to_object(&self.params)
    }

    fn apply_parameters(&mut self, values: RuleSetting) -> RiskResult<()> {
        self.params = from_object(values)?;
        Ok(())
    }

    fn variable_values(&self) -> RiskResult<RuleSetting> {
        to_object(&DailyLimitVariables {
            total_order_count: self.total_order_count,
            total_cancel_count: self.total_cancel_count,
            total_trade_count: self.total_trade_count,
            contract_order_count: &self.contract_order_count,
            contract_cancel_count: &self.contract_cancel_count,
            contract_trade_count: &self.contract_trade_count,
        })
    }

    fn check_allowed(
        &mut self,
        ctx: &RuleContext<'_>,
        req: &OrderRequest,
        _gateway_name: &str,
    ) -> bool {
        let vt_symbol = req.vt_symbol();
        let p = &self.params;

        // Per-contract ceilings first, then the session totals.
        let checks = [
            (
                "Contract Order Count",
                lookup(&self.contract_order_count, &vt_symbol),
                p.contract_order_limit,
            ),
            (
                "Contract Cancel Count",
                lookup(&self.contract_cancel_count, &vt_symbol),
                p.contract_cancel_limit,
            ),
            (
                "Contract Trade Count",
                lookup(&self.contract_trade_count, &vt_symbol),
                p.contract_trade_limit,
            ),
            ("Total Order Count", self.total_order_count, p.total_order_limit),
            ("Total Cancel Count", self.total_cancel_count, p.total_cancel_limit),
            ("Total Trade Count", self.total_trade_count, p.total_trade_limit),
        ];

        for (label, count, limit) in checks {
            if count >= limit {
                ctx.write_log(&format!("{label} {count} reached limit {limit}: {req}"));
                return false;
            }
        }

        true
    }

    fn on_order(&mut self, ctx: &RuleContext<'_>, order: &OrderData) {
        let vt_orderid = order.vt_orderid();

        if !self.all_orderids.contains(&vt_orderid) {
            self.all_orderids.insert(vt_orderid);
            self.total_order_count += 1;
            increment(&mut self.contract_order_count, order.vt_symbol());
            ctx.put_event();
        } else if order.status == Status::Cancelled && !self.cancel_orderids.contains(&vt_orderid)
        {
            self.cancel_orderids.insert(vt_orderid);
            self.total_cancel_count += 1;
            increment(&mut self.contract_cancel_count, order.vt_symbol());
            ctx.put_event();
        }
    }

    fn on_trade(&mut self, ctx: &RuleContext<'_>, trade: &TradeData) {
        if self.all_tradeids.insert(trade.vt_tradeid()) {
            self.total_trade_count += 1;
            increment(&mut self.contract_trade_count, trade.vt_symbol());
            ctx.put_event();
        }
    }
}
