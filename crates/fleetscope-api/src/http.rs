use reqwest::{Client, Request, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::ApiError;

/// Finish a request builder without sending it
pub(crate) fn build(builder: RequestBuilder) -> Result<Request, ApiError> {
    builder.build().map_err(ApiError::from_reqwest)
}

/// Send a request and decode a JSON body; any non-2xx status is an error
pub(crate) async fn send_json<T: DeserializeOwned>(
    http: &Client,
    request: Request,
) -> Result<T, ApiError> {
    let method = request.method().clone();
    let url = request.url().clone();
    tracing::debug!(%method, %url, "sending request");

    let response = http.execute(request).await.map_err(|e| {
        tracing::error!(%method, %url, error = %e, "request failed");
        ApiError::from_reqwest(e)
    })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::error!(%method, %url, status = status.as_u16(), "backend returned an error");
        return Err(ApiError::status(status.as_u16(), &body));
    }

    response.json::<T>().await.map_err(|e| {
        tracing::error!(%method, %url, error = %e, "could not decode response");
        ApiError::Decode(e.to_string())
    })
}
