use reqwest::{Client, Request};

use fleetscope_query::LogQuery;
use fleetscope_types::{ApiResponse, LogQueryData};

use crate::ApiError;
use crate::http::{build, send_json};

/// Loki-compatible query API client
#[derive(Clone, Debug)]
pub struct LogsClient {
    http: Client,
    base_url: String,
}

impl LogsClient {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn query_range_request(&self, query: &LogQuery) -> Result<Request, ApiError> {
        let mut params = vec![("query", query.expr())];
        // Unset bounds are omitted so the backend applies its default range
        if let Some(start) = query.start_nanos {
            params.push(("start", start.to_string()));
        }
        if let Some(end) = query.end_nanos {
            params.push(("end", end.to_string()));
        }
        params.push(("limit", query.limit.to_string()));
        params.push(("direction", "backward".to_string()));

        let url = format!("{}/query_range", self.base_url);
        build(self.http.get(url).query(&params))
    }

    /// Run a log range query, newest lines first
    pub async fn query_range(&self, query: &LogQuery) -> Result<LogQueryData, ApiError> {
        let request = self.query_range_request(query)?;
        let response: ApiResponse<LogQueryData> = send_json(&self.http, request).await?;
        Ok(response.data)
    }

    /// Names of all labels present in the log store
    pub async fn labels(&self) -> Result<Vec<String>, ApiError> {
        let request = build(self.http.get(format!("{}/labels", self.base_url)))?;
        let response: ApiResponse<Vec<String>> = send_json(&self.http, request).await?;
        Ok(response.data)
    }

    pub fn label_values_request(&self, label: &str) -> Result<Request, ApiError> {
        build(
            self.http
                .get(format!("{}/label/{}/values", self.base_url, label)),
        )
    }

    /// Known values of one label
    pub async fn label_values(&self, label: &str) -> Result<Vec<String>, ApiError> {
        let request = self.label_values_request(label)?;
        let response: ApiResponse<Vec<String>> = send_json(&self.http, request).await?;
        Ok(response.data)
    }
}
