pub mod email;
pub mod engine;
pub mod fanout;
pub mod join;
pub mod output;
pub mod scoring;
pub mod workflow;

pub use crate::domain::model::{FlowOutput, FlowState, FlowStep};
pub use crate::domain::ports::{Storage, Workflow};
pub use crate::utils::error::Result;
pub use engine::FlowEngine;
pub use workflow::{VenueWorkflow, WorkflowSettings};
