use crate::domain::model::{CreateSequenceData, ListSequencesParams, Sequence, UpdateSequenceData};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Remote CRUD service owning the canonical sequences.
#[async_trait]
pub trait SequenceService: Send + Sync {
    async fn create(&self, data: &CreateSequenceData) -> Result<Sequence>;
    async fn update(&self, sequence_id: &str, data: &UpdateSequenceData) -> Result<Sequence>;
    async fn get(&self, sequence_id: &str) -> Result<Sequence>;
    async fn delete(&self, sequence_id: &str) -> Result<()>;
    async fn list(&self, params: &ListSequencesParams) -> Result<Vec<Sequence>>;

    /// Asks the assistant to draft a new sequence from a prompt.
    async fn generate(&self, prompt: &str) -> Result<Sequence>;
    /// Asks the assistant to rewrite an existing sequence.
    async fn edit_with_prompt(&self, sequence_id: &str, prompt: &str) -> Result<Sequence>;
}

pub trait ConfigProvider: Send + Sync {
    fn api_base_url(&self) -> &str;
    fn timeout_seconds(&self) -> u64;
}
