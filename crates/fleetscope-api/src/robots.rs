use reqwest::{Client, Request};

use fleetscope_types::{AddRobotRequest, Robot, UpdateRobotRequest, robot_id};

use crate::ApiError;
use crate::http::{build, send_json};

/// Robot registry client
#[derive(Clone, Debug)]
pub struct RobotClient {
    http: Client,
    base_url: String,
}

impl RobotClient {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn list_request(&self) -> Result<Request, ApiError> {
        build(self.http.get(self.url("/robots")))
    }

    /// Fetch every robot in the registry
    pub async fn list(&self) -> Result<Vec<Robot>, ApiError> {
        let request = self.list_request()?;
        send_json(&self.http, request).await
    }

    pub fn create_request(&self, request: &AddRobotRequest) -> Result<Request, ApiError> {
        build(self.http.post(self.url("/robots")).json(request))
    }

    /// Register a robot from an already validated request
    pub async fn create(&self, request: &AddRobotRequest) -> Result<Robot, ApiError> {
        tracing::info!(name = %request.name, kind = %request.kind, "adding robot");
        let request = self.create_request(request)?;
        send_json(&self.http, request).await
    }

    /// Validate raw input and register a robot. Nothing is sent when name or
    /// type is blank.
    pub async fn add(&self, name: &str, kind: &str, status: &str) -> Result<Robot, ApiError> {
        let request = AddRobotRequest::new(name, kind, status)?;
        self.create(&request).await
    }

    pub fn update_request(
        &self,
        id: &str,
        request: &UpdateRobotRequest,
    ) -> Result<Request, ApiError> {
        let id = robot_id(id)?;
        build(
            self.http
                .patch(self.url("/robot"))
                .query(&[("robot_id", id.as_str())])
                .json(request),
        )
    }

    /// Patch a robot. Fields left unset in `request` are not transmitted.
    pub async fn update(&self, id: &str, request: &UpdateRobotRequest) -> Result<Robot, ApiError> {
        let http_request = self.update_request(id, request)?;
        if request.is_empty() {
            tracing::warn!(robot_id = %id.trim(), "sending robot update with no fields");
        } else {
            tracing::info!(robot_id = %id.trim(), "updating robot");
        }
        send_json(&self.http, http_request).await
    }
}
