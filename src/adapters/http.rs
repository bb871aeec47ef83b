use crate::domain::model::{
    CreateSequenceData, ListSequencesParams, Sequence, SequenceList, UpdateSequenceData,
};
use crate::domain::ports::{ConfigProvider, SequenceService};
use crate::utils::error::{Result, SyncError};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5001/api";

const SEQUENCES_ENDPOINT: &str = "/sequences";

/// reqwest client for the sequence REST API.
#[derive(Debug, Clone)]
pub struct HttpSequenceService {
    client: Client,
    base_url: String,
}

impl HttpSequenceService {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        Self::new(
            config.api_base_url(),
            Duration::from_secs(config.timeout_seconds()),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn sequence_url(&self, sequence_id: &str) -> String {
        self.url(&format!("{}/{}", SEQUENCES_ENDPOINT, sequence_id))
    }

    /// Non-2xx responses become `SyncError::Server` carrying the body's
    /// `error` field, or `default_message` when there is none.
    async fn ensure_success(
        response: Response,
        operation: &'static str,
        default_message: &str,
    ) -> Result<Response> {
        let status = response.status();
        tracing::debug!("{} response status: {}", operation, status);
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|value| value.get("error").and_then(|e| e.as_str()).map(str::to_string))
            .filter(|message| !message.is_empty())
            .unwrap_or_else(|| default_message.to_string());

        tracing::warn!("{} failed with {}: {}", operation, status, message);
        Err(SyncError::Server {
            operation,
            status: status.as_u16(),
            message,
        })
    }

    async fn read_json<T: DeserializeOwned>(
        response: Response,
        operation: &'static str,
        default_message: &str,
    ) -> Result<T> {
        let response = Self::ensure_success(response, operation, default_message).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl SequenceService for HttpSequenceService {
    async fn create(&self, data: &CreateSequenceData) -> Result<Sequence> {
        let url = self.url(SEQUENCES_ENDPOINT);
        tracing::debug!("POST {}", url);
        let response = self.client.post(&url).json(data).send().await?;
        Self::read_json(response, "create", "Failed to create sequence").await
    }

    async fn update(&self, sequence_id: &str, data: &UpdateSequenceData) -> Result<Sequence> {
        let url = self.sequence_url(sequence_id);
        tracing::debug!("PUT {}", url);
        let response = self.client.put(&url).json(data).send().await?;
        Self::read_json(response, "update", "Failed to update sequence").await
    }

    async fn get(&self, sequence_id: &str) -> Result<Sequence> {
        let url = self.sequence_url(sequence_id);
        tracing::debug!("GET {}", url);
        let response = self.client.get(&url).send().await?;
        Self::read_json(response, "get", "Failed to get sequence").await
    }

    async fn delete(&self, sequence_id: &str) -> Result<()> {
        let url = self.sequence_url(sequence_id);
        tracing::debug!("DELETE {}", url);
        let response = self.client.delete(&url).send().await?;
        Self::ensure_success(response, "delete", "Failed to delete sequence").await?;
        Ok(())
    }

    async fn list(&self, params: &ListSequencesParams) -> Result<Vec<Sequence>> {
        let url = self.url(SEQUENCES_ENDPOINT);
        let query = params.to_query();
        tracing::debug!("GET {} {:?}", url, query);
        let response = self.client.get(&url).query(&query).send().await?;
        let list: SequenceList =
            Self::read_json(response, "list", "Failed to list sequences").await?;
        Ok(list.sequences)
    }

    async fn generate(&self, prompt: &str) -> Result<Sequence> {
        let url = self.url(&format!("{}/generate", SEQUENCES_ENDPOINT));
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "prompt": prompt }))
            .send()
            .await?;
        Self::read_json(response, "generate", "Failed to generate sequence").await
    }

    async fn edit_with_prompt(&self, sequence_id: &str, prompt: &str) -> Result<Sequence> {
        let url = format!("{}/edit", self.sequence_url(sequence_id));
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "prompt": prompt }))
            .send()
            .await?;
        Self::read_json(response, "edit", "Failed to edit sequence with GPT").await
    }
}
