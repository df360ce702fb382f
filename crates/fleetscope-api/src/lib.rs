//! Backend clients for fleetscope
//!
//! Thin HTTP adapters for the robot registry, the Prometheus-compatible metrics
//! API and the Loki-compatible log API. Each client binds a base URL resolved
//! from a [`ProxyRoute`] and forwards parameters and bodies verbatim.

mod error;
mod http;
mod logs;
mod metrics;
mod robots;
mod route;

#[cfg(test)]
mod test_server;

use std::time::Duration;

pub use error::ApiError;
pub use logs::LogsClient;
pub use metrics::MetricsClient;
pub use robots::RobotClient;
pub use route::{ProxyRoute, Routes};

// Re-export types that are used in our public API
pub use fleetscope_types::{
    AddRobotRequest, Robot, RobotStatus, UpdateRobotRequest, ValidationError,
};

/// One client per backend, sharing a connection pool
#[derive(Clone, Debug)]
pub struct Backends {
    pub robots: RobotClient,
    pub metrics: MetricsClient,
    pub logs: LogsClient,
}

impl Backends {
    /// Build all clients from the route table. Without a timeout, requests
    /// wait as long as the transport allows.
    pub fn new(routes: &Routes, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(ApiError::from_reqwest)?;

        Ok(Self {
            robots: RobotClient::new(http.clone(), routes.robot.base_url()),
            metrics: MetricsClient::new(http.clone(), routes.metrics.base_url()),
            logs: LogsClient::new(http, routes.logs.base_url()),
        })
    }
}
