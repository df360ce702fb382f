use reqwest::{Client, Request};

use fleetscope_query::MetricRangeQuery;
use fleetscope_types::{ApiResponse, MetricQueryData, MetricSeries};

use crate::ApiError;
use crate::http::{build, send_json};

/// Prometheus-compatible query API client
#[derive(Clone, Debug)]
pub struct MetricsClient {
    http: Client,
    base_url: String,
}

impl MetricsClient {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn query_range_request(&self, query: &MetricRangeQuery) -> Result<Request, ApiError> {
        let url = format!("{}/api/v1/query_range", self.base_url);
        build(self.http.get(url).query(&[
            ("query", query.query.clone()),
            ("start", query.start.to_string()),
            ("end", query.end.to_string()),
            ("step", query.step.to_string()),
        ]))
    }

    /// Run a range query and return its series
    pub async fn query_range(&self, query: &MetricRangeQuery) -> Result<Vec<MetricSeries>, ApiError> {
        let request = self.query_range_request(query)?;
        let response: ApiResponse<MetricQueryData> = send_json(&self.http, request).await?;
        Ok(response.data.result)
    }

    pub fn metric_names_request(&self) -> Result<Request, ApiError> {
        let url = format!("{}/api/v1/label/__name__/values", self.base_url);
        build(self.http.get(url))
    }

    /// All metric names known to the backend; any non-success status fails
    pub async fn metric_names(&self) -> Result<Vec<String>, ApiError> {
        let request = self.metric_names_request()?;
        let response: ApiResponse<Vec<String>> = send_json(&self.http, request).await?;
        Ok(response.data)
    }
}
