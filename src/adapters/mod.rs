// Adapters layer: concrete implementations of the domain ports (HTTP APIs, disk).

pub mod openai;
pub mod retry;
pub mod serper;
pub mod storage;

pub use openai::{CompletionSettings, OpenAiClient};
pub use retry::RetryPolicy;
pub use serper::SerperClient;
pub use storage::LocalStorage;
