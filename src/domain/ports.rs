use crate::domain::model::{FlowOutput, FlowState};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    /// Human-readable location of `path`, for logs and the final summary.
    fn locate(&self, path: &str) -> String;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub link: Option<String>,
    pub snippet: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
}

#[async_trait]
pub trait SearchClient: Send + Sync {
    async fn search(&self, query: &str, num_results: u32) -> Result<Vec<SearchHit>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Sends the conversation and returns the assistant's text reply.
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String>;
}

/// The stages of a venue flow, run in order by [`crate::core::engine::FlowEngine`].
#[async_trait]
pub trait Workflow: Send + Sync {
    async fn initialize(&self, state: &mut FlowState) -> Result<()>;
    async fn search(&self, state: &mut FlowState) -> Result<()>;
    async fn score(&self, state: &mut FlowState) -> Result<()>;
    async fn draft_emails(&self, state: &mut FlowState) -> Result<()>;
    async fn save(&self, state: &FlowState) -> Result<FlowOutput>;
}
