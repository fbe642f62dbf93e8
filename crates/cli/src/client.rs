//! API client for the maintenance server

use anyhow::{Context, Result};
use maintenance_lib::{
    ComponentRecord, ComponentSummary, HealthResponse, MaintenanceDecision, ModelSwap,
    SensorReading,
};
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;
use url::Url;

/// API client for the maintenance server
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = Url::parse(base_url).context("Invalid API URL")?;

        Ok(Self { client, base_url })
    }

    async fn handle<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            match serde_json::from_str::<ErrorResponse>(&body) {
                Ok(err) => anyhow::bail!("API error ({}): {}", status, err),
                Err(_) => anyhow::bail!("API error ({}): {}", status, body),
            }
        }

        response.json().await.context("Failed to parse response")
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;
        debug!(url = %url, "GET");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send request")?;
        Self::handle(response).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;
        debug!(url = %url, "POST");
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .context("Failed to send request")?;
        Self::handle(response).await
    }

    pub async fn recommend(&self, reading: &SensorReading) -> Result<MaintenanceDecision> {
        self.post("recommend-maintenance", reading).await
    }

    /// The id is percent-encoded as a single path segment
    pub async fn component_status(&self, component_id: &str) -> Result<ComponentRecord> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("API URL {} cannot take a path", self.base_url))?
            .pop_if_empty()
            .push("get-component-status")
            .push(component_id);
        self.get(url.as_str()).await
    }

    pub async fn components(&self) -> Result<Vec<ComponentSummary>> {
        self.get("get-all-components").await
    }

    pub async fn reload_model(&self) -> Result<ModelSwap> {
        self.post("admin/reload-model", &serde_json::Value::Null).await
    }

    pub async fn rollback_model(&self) -> Result<ModelSwap> {
        self.post("admin/rollback-model", &serde_json::Value::Null).await
    }

    /// `/healthz` answers 503 with a body when unhealthy, so read it either way
    pub async fn health(&self) -> Result<HealthResponse> {
        let url = self.base_url.join("healthz").context("Invalid path")?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send request")?;
        response.json().await.context("Failed to parse response")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl std::fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.field {
            Some(field) => write!(f, "{} ({}): {}", self.error, field, self.reason),
            None => write!(f, "{}: {}", self.error, self.reason),
        }
    }
}
