use std::collections::HashMap;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use fleetscope_api::Backends;
use fleetscope_query::{build_table, normalize_logs};
use fleetscope_tui::{Effect, Fetch, FetchOutcome, LabelKind, Mutation};
use fleetscope_types::Robot;

/// Results flowing back from spawned backend calls
pub enum InternalAction {
    Fetched { generation: u64, outcome: FetchOutcome },
    Mutated { form: u64, result: Result<Robot, String> },
}

/// Query key a fetch is superseded on
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum FetchKey {
    Robots,
    LogLabels,
    LabelValues(LabelKind),
    Logs,
    MetricNames,
    MetricRange,
}

impl From<&Fetch> for FetchKey {
    fn from(fetch: &Fetch) -> Self {
        match fetch {
            Fetch::Robots => Self::Robots,
            Fetch::LogLabels => Self::LogLabels,
            Fetch::LabelValues(kind) => Self::LabelValues(*kind),
            Fetch::Logs(_) => Self::Logs,
            Fetch::MetricNames => Self::MetricNames,
            Fetch::MetricRange(_) => Self::MetricRange,
        }
    }
}

/// Runs effects against the backends, one task per request.
///
/// At most one fetch per key is in flight; dispatching a newer one aborts
/// the older. Mutations always run to completion.
pub struct Dispatcher {
    backends: Backends,
    tx: mpsc::UnboundedSender<InternalAction>,
    fetches: HashMap<FetchKey, JoinHandle<()>>,
    mutations: Vec<JoinHandle<()>>,
}

impl Dispatcher {
    pub fn new(backends: Backends, tx: mpsc::UnboundedSender<InternalAction>) -> Self {
        Self {
            backends,
            tx,
            fetches: HashMap::new(),
            mutations: Vec::new(),
        }
    }

    pub fn run(&mut self, effects: Vec<Effect>) {
        if effects.is_empty() {
            return;
        }
        self.fetches.retain(|_, task| !task.is_finished());
        self.mutations.retain(|task| !task.is_finished());

        for effect in effects {
            let backends = self.backends.clone();
            let tx = self.tx.clone();
            match effect {
                Effect::Fetch { generation, fetch } => {
                    let key = FetchKey::from(&fetch);
                    let task = tokio::spawn(async move {
                        let outcome = fetch_one(&backends, fetch).await;
                        let _ = tx.send(InternalAction::Fetched {
                            generation,
                            outcome,
                        });
                    });
                    if let Some(previous) = self.fetches.insert(key, task) {
                        if !previous.is_finished() {
                            tracing::debug!(?key, "aborting superseded fetch");
                            previous.abort();
                        }
                    }
                }
                Effect::Mutate { form, mutation } => {
                    self.mutations.push(tokio::spawn(async move {
                        let result = mutate(&backends, mutation).await;
                        let _ = tx.send(InternalAction::Mutated { form, result });
                    }));
                }
            }
        }
    }

    /// Abort everything still in flight
    pub fn shutdown(&mut self) {
        for (_, task) in self.fetches.drain() {
            task.abort();
        }
        for task in self.mutations.drain(..) {
            task.abort();
        }
    }
}

fn describe<E: std::fmt::Display>(what: &str, err: E) -> String {
    tracing::error!(error = %err, "failed to load {what}");
    format!("Failed to load {what}: {err}")
}

async fn fetch_one(backends: &Backends, fetch: Fetch) -> FetchOutcome {
    tracing::debug!(?fetch, "fetching");
    match fetch {
        Fetch::Robots => FetchOutcome::Robots(
            backends
                .robots
                .list()
                .await
                .map_err(|e| describe("robots", e)),
        ),
        Fetch::LogLabels => FetchOutcome::LogLabels(
            backends
                .logs
                .labels()
                .await
                .map_err(|e| describe("log labels", e)),
        ),
        Fetch::LabelValues(kind) => {
            let result = backends
                .logs
                .label_values(kind.label())
                .await
                .map_err(|e| describe(kind.label(), e));
            FetchOutcome::LabelValues(kind, result)
        }
        Fetch::Logs(query) => FetchOutcome::Logs(
            backends
                .logs
                .query_range(&query)
                .await
                .map(|data| normalize_logs(&data))
                .map_err(|e| describe("logs", e)),
        ),
        Fetch::MetricNames => FetchOutcome::MetricNames(
            backends
                .metrics
                .metric_names()
                .await
                .map_err(|e| describe("metric names", e)),
        ),
        Fetch::MetricRange(query) => FetchOutcome::MetricRange(
            backends
                .metrics
                .query_range(&query)
                .await
                .map(|series| build_table(&series))
                .map_err(|e| describe("metric data", e)),
        ),
    }
}

async fn mutate(backends: &Backends, mutation: Mutation) -> Result<Robot, String> {
    let result = match &mutation {
        Mutation::AddRobot(request) => backends.robots.create(request).await,
        Mutation::UpdateRobot { id, request } => backends.robots.update(id, request).await,
    };
    result.map_err(|err| {
        tracing::error!(error = %err, ?mutation, "robot mutation failed");
        err.to_string()
    })
}
