pub mod adapters;
pub mod config;
pub mod core;
pub mod crews;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliArgs;

pub use adapters::{LocalStorage, OpenAiClient, SerperClient};
pub use config::FlowConfig;
pub use core::{FlowEngine, VenueWorkflow};
pub use domain::model::{FlowOutput, FlowState, InputData};
pub use utils::error::{Result, VenueError};
