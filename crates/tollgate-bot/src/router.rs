//! Paper order router.
//!
//! Accepts every order, assigns it an id and queues the `Submitting`
//! acknowledgement a real gateway would push back.

use parking_lot::Mutex;
use tollgate_core::{OrderData, OrderRequest};
use tollgate_risk::OrderRouter;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct PaperRouter {
    acks: Mutex<Vec<OrderData>>,
}

impl PaperRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the acknowledgements queued since the last call.
    pub fn take_acks(&self) -> Vec<OrderData> {
        std::mem::take(&mut *self.acks.lock())
    }
}

impl OrderRouter for PaperRouter {
    fn send_order(&self, req: &OrderRequest, gateway_name: &str) -> Option<String> {
        let orderid = Uuid::new_v4().simple().to_string();
        let order = req.create_order_data(&orderid, gateway_name);
        let vt_orderid = order.vt_orderid();

        debug!(%vt_orderid, %req, "Paper order accepted");
        self.acks.lock().push(order);
        Some(vt_orderid)
    }
}
