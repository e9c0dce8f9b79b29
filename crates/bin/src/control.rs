//! Simulation control API client.
//!
//! Thin HTTP wrapper for `launch_simulation` and `delete_simulation`. Both
//! calls are keyed by the stream session id.

use std::time::Duration;

use protocol::control::{DeleteRequest, SimulationParams};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ControlError {
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(reqwest::Error),

    #[error("Request to {endpoint} failed: {source}")]
    Request {
        endpoint: &'static str,
        source: reqwest::Error,
    },

    #[error("{endpoint} answered {status}: {body}")]
    Status {
        endpoint: &'static str,
        status: u16,
        body: String,
    },
}

#[derive(Clone)]
pub struct ControlClient {
    http: reqwest::Client,
    base_url: String,
}

impl ControlClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ControlError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ControlError::ClientBuild)?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Start a simulation bound to `session_id`.
    pub async fn launch(
        &self,
        params: SimulationParams,
        session_id: &str,
    ) -> Result<serde_json::Value, ControlError> {
        let body = params.into_launch_request(session_id);
        info!(bodies = body.space_objects.len(), "Launching simulation for {}", session_id);
        self.post("launch_simulation", &body).await
    }

    /// Stop the simulation bound to `session_id`.
    pub async fn delete(&self, session_id: &str) -> Result<serde_json::Value, ControlError> {
        let body = DeleteRequest {
            user_id: session_id.to_string(),
        };
        info!("Deleting simulation for {}", session_id);
        self.post("delete_simulation", &body).await
    }

    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }

    async fn post<B: serde::Serialize>(
        &self,
        endpoint: &'static str,
        body: &B,
    ) -> Result<serde_json::Value, ControlError> {
        let response = self
            .http
            .post(self.endpoint_url(endpoint))
            .json(body)
            .send()
            .await
            .map_err(|source| ControlError::Request { endpoint, source })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|source| ControlError::Request { endpoint, source })?;

        if !status.is_success() {
            return Err(ControlError::Status {
                endpoint,
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(parse_reply(&text))
    }
}

/// Replies are JSON in practice; anything else is kept as a string.
fn parse_reply(text: &str) -> serde_json::Value {
    serde_json::from_str(text).unwrap_or_else(|_| serde_json::Value::String(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_url_trims_slash() {
        let client = ControlClient::new("http://localhost:5000/", Duration::from_secs(1)).unwrap();
        assert_eq!(
            client.endpoint_url("launch_simulation"),
            "http://localhost:5000/launch_simulation"
        );
    }

    #[test]
    fn test_parse_reply() {
        assert_eq!(parse_reply(r#"{"ok":true}"#)["ok"], serde_json::Value::Bool(true));
        assert_eq!(parse_reply("done"), serde_json::Value::String("done".into()));
    }
}
