//! Main application orchestration.
//!
//! Coordinates:
//! - Contract reference data
//! - The risk engine and its event stream
//! - Feed replay and paper order routing

use crate::config::AppConfig;
use crate::error::AppResult;
use crate::feed::{parse_line, FeedEvent};
use crate::router::PaperRouter;
use serde::Serialize;
use std::sync::Arc;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tollgate_registry::ContractStore;
use tollgate_risk::{RiskEngine, RiskEvent, RuleData, RuleRegistry};
use tollgate_telemetry::Metrics;
use tracing::{debug, error, info, warn};

/// Counters for one replay run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReplaySummary {
    pub lines: u64,
    pub malformed: u64,
    pub requests: u64,
    pub routed: u64,
    pub denied: u64,
    pub rule_updates: u64,
    pub notifications: u64,
}

/// Counts collected by the event drain task.
#[derive(Debug, Default)]
struct DrainStats {
    rule_updates: u64,
    notifications: u64,
}

/// Main application.
pub struct Application {
    config: AppConfig,
    contracts: Arc<ContractStore>,
    engine: RiskEngine,
    router: PaperRouter,
    event_rx: mpsc::UnboundedReceiver<RiskEvent>,
}

impl Application {
    /// Create a new application.
    pub fn new(config: AppConfig) -> AppResult<Self> {
        Self::with_registry(config, &RuleRegistry::builtin())
    }

    /// Create a new application with a custom rule registry.
    pub fn with_registry(config: AppConfig, registry: &RuleRegistry) -> AppResult<Self> {
        let contracts = Arc::new(ContractStore::from_contracts(config.contracts.clone()));
        info!(contracts = contracts.len(), "Contracts loaded");

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let engine = RiskEngine::new(&config.risk, registry, contracts.clone(), event_tx)?;

        Ok(Self {
            config,
            contracts,
            engine,
            router: PaperRouter::new(),
            event_rx,
        })
    }

    /// Replay the configured feed and return the run summary.
    pub async fn run(self) -> AppResult<ReplaySummary> {
        let Self {
            config,
            contracts,
            engine,
            router,
            event_rx,
        } = self;

        info!(
            replay_file = %config.replay_file.display(),
            gateway = %config.gateway_name,
            rules = ?engine.get_all_rule_names(),
            "Starting replay"
        );

        let drain = spawn_event_drain(event_rx);

        let file = File::open(&config.replay_file).await?;
        let mut lines = BufReader::new(file).lines();
        let mut summary = ReplaySummary::default();

        while let Some(line) = lines.next_line().await? {
            summary.lines += 1;

            let event = match parse_line(&line) {
                None => continue,
                Some(Ok(event)) => event,
                Some(Err(e)) => {
                    warn!(line = summary.lines, error = %e, "Skipping malformed feed line");
                    summary.malformed += 1;
                    continue;
                }
            };

            handle_event(&engine, &contracts, &router, &config.gateway_name, event, &mut summary);
        }

        let snapshots = collect_snapshots(&engine);
        for data in &snapshots {
            info!(
                rule = %data.name,
                parameters = %serde_json::Value::Object(data.parameters.clone()),
                variables = %serde_json::Value::Object(data.variables.clone()),
                "Final rule state"
            );
        }

        // Dropping the engine closes the event channel and ends the drain task.
        drop(engine);
        match drain.await {
            Ok(stats) => {
                summary.rule_updates = stats.rule_updates;
                summary.notifications = stats.notifications;
            }
            Err(e) => error!(?e, "Event drain task failed"),
        }

        println!("{}", serde_json::to_string_pretty(&snapshots)?);
        println!("{}", serde_json::to_string_pretty(&summary)?);
        if config.print_metrics {
            println!("{}", Metrics::gather_text()?);
        }

        info!(
            requests = summary.requests,
            routed = summary.routed,
            denied = summary.denied,
            malformed = summary.malformed,
            "Replay complete"
        );
        Ok(summary)
    }
}

fn handle_event(
    engine: &RiskEngine,
    contracts: &ContractStore,
    router: &PaperRouter,
    gateway_name: &str,
    event: FeedEvent,
    summary: &mut ReplaySummary,
) {
    match event {
        FeedEvent::Contract(contract) => {
            if let Err(e) = contracts.update(contract) {
                warn!(error = %e, "Contract update rejected");
            }
        }
        FeedEvent::Tick(tick) => engine.process_tick(&tick),
        FeedEvent::Order(order) => engine.process_order(&order),
        FeedEvent::Trade(trade) => engine.process_trade(&trade),
        FeedEvent::Timer => engine.process_timer(),
        FeedEvent::Request(req) => {
            summary.requests += 1;
            match engine.send_order(router, &req, gateway_name) {
                Some(vt_orderid) => {
                    summary.routed += 1;
                    debug!(%vt_orderid, "Order routed");
                    for ack in router.take_acks() {
                        engine.process_order(&ack);
                    }
                }
                None => summary.denied += 1,
            }
        }
    }
}

fn collect_snapshots(engine: &RiskEngine) -> Vec<RuleData> {
    engine
        .get_all_rule_names()
        .iter()
        .filter_map(|name| match engine.get_rule_data(name) {
            Ok(data) => Some(data),
            Err(e) => {
                warn!(rule = %name, error = %e, "Failed to read rule state");
                None
            }
        })
        .collect()
}

fn spawn_event_drain(mut event_rx: mpsc::UnboundedReceiver<RiskEvent>) -> JoinHandle<DrainStats> {
    tokio::spawn(async move {
        let mut stats = DrainStats::default();
        while let Some(event) = event_rx.recv().await {
            match event {
                RiskEvent::Rule(data) => {
                    stats.rule_updates += 1;
                    debug!(rule = %data.name, "Rule state updated");
                }
                RiskEvent::Notify(msg) => {
                    stats.notifications += 1;
                    info!(%msg, "Risk notification");
                }
                RiskEvent::Log(log) => {
                    debug!(rule = %log.rule, source = %log.source, time = %log.time, msg = %log.msg, "Risk log");
                }
            }
        }
        stats
    })
}
