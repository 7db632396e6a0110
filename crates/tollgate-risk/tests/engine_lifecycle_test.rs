//! Risk engine lifecycle integration tests.
//!
//! Tests the full gate:
//! - Loading built-in rules with persisted settings
//! - Order event fan-out and the order-submission path
//! - Sharing one engine between tasks

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use rust_decimal_macros::dec;
use serde_json::json;
use tempfile::TempDir;
use tokio::sync::mpsc;
use tollgate_core::{
    ContractData, Direction, Exchange, Offset, OrderData, OrderRequest, OrderType, Price, Size,
    Status, TradeData,
};
use tollgate_registry::ContractStore;
use tollgate_risk::{
    OrderRouter, RiskEngine, RiskEngineConfig, RiskEvent, RuleRegistry, RuleSetting,
    SETTING_FILENAME,
};

const GATEWAY: &str = "CTP";

fn rebar() -> ContractData {
    ContractData {
        gateway_name: GATEWAY.to_string(),
        symbol: "rb2410".to_string(),
        exchange: Exchange::new("SHFE"),
        name: "rebar 2410".to_string(),
        size: dec!(10),
        pricetick: Price::new(dec!(1)),
        min_volume: Size::new(dec!(1)),
        max_volume: Some(Size::new(dec!(1000))),
    }
}

fn request(price: Price, volume: Size) -> OrderRequest {
    OrderRequest {
        symbol: "rb2410".to_string(),
        exchange: Exchange::new("SHFE"),
        direction: Direction::Long,
        order_type: OrderType::Limit,
        volume,
        price,
        offset: Offset::Open,
        reference: "integration".to_string(),
    }
}

fn setting(value: serde_json::Value) -> RuleSetting {
    value.as_object().cloned().expect("setting must be an object")
}

/// Router that acknowledges every order with a sequential id.
#[derive(Default)]
struct SequentialRouter {
    next_id: AtomicU64,
}

impl OrderRouter for SequentialRouter {
    fn send_order(&self, _req: &OrderRequest, gateway_name: &str) -> Option<String> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        Some(format!("{gateway_name}.{id}"))
    }
}

fn build_engine(dir: &TempDir) -> (RiskEngine, mpsc::UnboundedReceiver<RiskEvent>) {
    let config = RiskEngineConfig {
        setting_path: dir.path().join(SETTING_FILENAME),
        rules: Vec::new(),
    };
    let contracts = Arc::new(ContractStore::from_contracts(vec![rebar()]));
    let (tx, rx) = mpsc::unbounded_channel();
    let engine = RiskEngine::new(&config, &RuleRegistry::builtin(), contracts, tx)
        .expect("engine should build");
    (engine, rx)
}

#[test]
fn test_builtin_rules_loaded_in_class_order() {
    let dir = TempDir::new().unwrap();
    let (engine, _rx) = build_engine(&dir);

    assert_eq!(
        engine.get_all_rule_names(),
        vec![
            "Active Order Check",
            "Daily Limit Check",
            "Duplicate Order Check",
            "Order Size Check",
            "Order Validity Check",
        ]
    );

    let data = engine.get_rule_data("Daily Limit Check").unwrap();
    assert_eq!(data.class_name, "DailyLimitRule");
    let keys: Vec<_> = data.parameters.keys().cloned().collect();
    assert_eq!(keys[0], "active");
    assert_eq!(data.parameters["total_order_limit"], json!(20000));
}

#[test]
fn test_persisted_settings_applied_on_start() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join(SETTING_FILENAME),
        r#"{
            "Order Size Check": {"order_volume_limit": 3},
            "Duplicate Order Check": {"active": false},
            "Removed Rule": {"limit": 1}
        }"#,
    )
    .unwrap();

    let (engine, _rx) = build_engine(&dir);
    let router = SequentialRouter::default();

    assert!(engine
        .send_order(&router, &request(Price::new(dec!(3650)), Size::new(dec!(4))), GATEWAY)
        .is_none());

    // Duplicate throttle is inactive, so identical requests keep passing
    let req = request(Price::new(dec!(3650)), Size::new(dec!(1)));
    for _ in 0..20 {
        assert!(engine.check_allowed(&req, GATEWAY));
    }
}

#[test]
fn test_send_order_routes_and_tracks_active_orders() {
    let dir = TempDir::new().unwrap();
    let (engine, _rx) = build_engine(&dir);
    engine
        .update_rule_setting("Active Order Check", setting(json!({"active_order_limit": 2})))
        .unwrap();
    let router = SequentialRouter::default();

    for (i, price) in [dec!(3650), dec!(3651)].into_iter().enumerate() {
        let req = request(Price::new(price), Size::new(dec!(1)));
        let vt_orderid = engine.send_order(&router, &req, GATEWAY).unwrap();
        assert_eq!(vt_orderid, format!("CTP.{}", i + 1));

        let orderid = vt_orderid.trim_start_matches("CTP.");
        engine.process_order(&req.create_order_data(orderid, GATEWAY));
    }

    // Two working orders hit the ceiling
    let third = request(Price::new(dec!(3652)), Size::new(dec!(1)));
    assert!(engine.send_order(&router, &third, GATEWAY).is_none());

    // A fill frees a slot
    let mut filled: OrderData = request(Price::new(dec!(3650)), Size::new(dec!(1)))
        .create_order_data("1", GATEWAY);
    filled.status = Status::AllTraded;
    filled.traded = Size::new(dec!(1));
    engine.process_order(&filled);
    engine.process_trade(&TradeData {
        gateway_name: GATEWAY.to_string(),
        symbol: "rb2410".to_string(),
        exchange: Exchange::new("SHFE"),
        orderid: "1".to_string(),
        tradeid: "t1".to_string(),
        direction: Direction::Long,
        offset: Offset::Open,
        price: Price::new(dec!(3650)),
        volume: Size::new(dec!(1)),
        datetime: None,
    });

    assert_eq!(engine.send_order(&router, &third, GATEWAY).as_deref(), Some("CTP.3"));

    let daily = engine.get_rule_data("Daily Limit Check").unwrap();
    assert_eq!(daily.variables["total_order_count"], json!(2));
    assert_eq!(daily.variables["total_trade_count"], json!(1));
    assert_eq!(daily.variables["contract_trade_count"], json!({"rb2410.SHFE": 1}));
}

#[test]
fn test_validity_denial_reports_reason() {
    let dir = TempDir::new().unwrap();
    let (engine, mut rx) = build_engine(&dir);

    let off_grid = request(Price::new(dec!(3650.5)), Size::new(dec!(1)));
    assert!(!engine.check_allowed(&off_grid, GATEWAY));

    let mut notices = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let RiskEvent::Notify(msg) = event {
            notices.push(msg);
        }
    }
    assert_eq!(notices.len(), 1);
    assert!(notices[0].starts_with("Price 3650.5 is not a multiple of price tick 1"));
}

#[tokio::test]
async fn test_engine_shared_between_tasks() {
    let dir = TempDir::new().unwrap();
    let (engine, mut rx) = build_engine(&dir);
    let engine = Arc::new(engine);

    let feed = {
        let engine = Arc::clone(&engine);
        tokio::spawn(async move {
            for i in 0..100 {
                let order = request(Price::new(dec!(3650)), Size::new(dec!(1)))
                    .create_order_data(&format!("feed-{i}"), GATEWAY);
                engine.process_order(&order);
                tokio::task::yield_now().await;
            }
        })
    };

    let submit = {
        let engine = Arc::clone(&engine);
        tokio::spawn(async move {
            let mut allowed = 0;
            for i in 0..100 {
                let req = request(Price::new(dec!(3000) + rust_decimal::Decimal::from(i)), Size::new(dec!(1)));
                if engine.check_allowed(&req, GATEWAY) {
                    allowed += 1;
                }
                tokio::task::yield_now().await;
            }
            allowed
        })
    };

    feed.await.unwrap();
    let allowed = submit.await.unwrap();
    assert!(allowed > 0);

    // Feed orders stay active, so the ceiling of 50 ends up binding
    let active = engine.get_rule_data("Active Order Check").unwrap();
    assert_eq!(active.variables["active_order_count"], json!(100));
    assert!(!engine.check_allowed(&request(Price::new(dec!(4000)), Size::new(dec!(1))), GATEWAY));

    let mut rule_events = 0;
    while let Ok(event) = rx.try_recv() {
        if matches!(event, RiskEvent::Rule(_)) {
            rule_events += 1;
        }
    }
    assert!(rule_events >= 200);
}
