//! Simulation control client trait and HTTP implementation.

use std::future::Future;
use std::time::Duration;

use super::error::SimulationError;
use super::model::{SimulationAction, SimulationStatus};

/// Default base URL of the simulation server.
pub const DEFAULT_SIMULATION_URL: &str = "http://localhost:4567";

/// HTTP timeout for control requests.
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Sends administrative actions to the upstream simulation.
pub trait SimulationClient: Send + Sync {
    /// Send `action`, returning the resulting status on success.
    fn send(
        &self,
        action: SimulationAction,
    ) -> impl Future<Output = Result<SimulationStatus, SimulationError>> + Send;
}

/// Simulation client posting to `{base}/simulation/{action}`.
pub struct HttpSimulationClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpSimulationClient {
    /// Create a client for the server at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Result<Self, SimulationError> {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| SimulationError::HttpError(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    /// Endpoint for `action`.
    pub fn action_url(&self, action: SimulationAction) -> String {
        format!(
            "{}/simulation/{}",
            self.base_url.trim_end_matches('/'),
            action.as_str()
        )
    }
}

impl SimulationClient for HttpSimulationClient {
    async fn send(&self, action: SimulationAction) -> Result<SimulationStatus, SimulationError> {
        let url = self.action_url(action);
        let response = self
            .http
            .post(&url)
            .send()
            .await
            .map_err(|e| SimulationError::HttpError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = if body.trim().is_empty() {
                format!("Failed to {} simulation", action)
            } else {
                body
            };
            return Err(SimulationError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let resulting = action.resulting_status();
        tracing::info!(%action, status = %resulting, "Simulation action accepted");
        Ok(resulting)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_url() {
        let client = HttpSimulationClient::new("http://localhost:4567/").unwrap();
        assert_eq!(
            client.action_url(SimulationAction::Pause),
            "http://localhost:4567/simulation/pause"
        );
        let client = HttpSimulationClient::new(DEFAULT_SIMULATION_URL).unwrap();
        assert_eq!(
            client.action_url(SimulationAction::Start),
            "http://localhost:4567/simulation/start"
        );
    }

    #[tokio::test]
    async fn test_unreachable_server_is_http_error() {
        let client = HttpSimulationClient::new("http://127.0.0.1:9").unwrap();
        let result = client.send(SimulationAction::Stop).await;
        assert!(matches!(result, Err(SimulationError::HttpError(_))));
    }
}
