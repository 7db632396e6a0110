//! Replay feed format.
//!
//! One JSON object per line, tagged by `event`:
//!
//! ```text
//! {"event":"contract", ...ContractData}
//! {"event":"tick", ...TickData}
//! {"event":"order", ...OrderData}
//! {"event":"trade", ...TradeData}
//! {"event":"timer"}
//! {"event":"request", ...OrderRequest}
//! ```
//!
//! Blank lines and lines starting with `#` are skipped.

use serde::{Deserialize, Serialize};
use tollgate_core::{ContractData, OrderData, OrderRequest, TickData, TradeData};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum FeedEvent {
    Contract(ContractData),
    Tick(TickData),
    Order(OrderData),
    Trade(TradeData),
    Timer,
    /// Outbound order request to run through the risk engine.
    Request(OrderRequest),
}

/// Parse one feed line. `None` for blank and comment lines.
pub fn parse_line(line: &str) -> Option<serde_json::Result<FeedEvent>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    Some(serde_json::from_str(line))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tollgate_core::{OrderType, Status};

    #[test]
    fn test_parse_request() {
        let line = r#"{"event":"request","symbol":"rb2410","exchange":"SHFE","direction":"long","type":"limit","volume":"2","price":"3650","offset":"open"}"#;
        match parse_line(line) {
            Some(Ok(FeedEvent::Request(req))) => {
                assert_eq!(req.vt_symbol(), "rb2410.SHFE");
                assert_eq!(req.order_type, OrderType::Limit);
            }
            other => panic!("unexpected parse result: {other:?}"),
        }
    }

    #[test]
    fn test_parse_order_and_timer() {
        let line = r#"{"event":"order","gateway_name":"CTP","symbol":"rb2410","exchange":"SHFE","orderid":"7","direction":"short","status":"cancelled"}"#;
        match parse_line(line) {
            Some(Ok(FeedEvent::Order(order))) => {
                assert_eq!(order.vt_orderid(), "CTP.7");
                assert_eq!(order.status, Status::Cancelled);
            }
            other => panic!("unexpected parse result: {other:?}"),
        }

        assert!(matches!(
            parse_line(r#"{"event":"timer"}"#),
            Some(Ok(FeedEvent::Timer))
        ));
    }

    #[test]
    fn test_skip_and_reject() {
        assert!(parse_line("").is_none());
        assert!(parse_line("   # comment").is_none());
        assert!(matches!(parse_line(r#"{"event":"quote"}"#), Some(Err(_))));
    }
}
