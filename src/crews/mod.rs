//! Agent crews: one agent profile plus the task prompt it runs through the
//! language model.

pub mod response;
pub mod score;
pub mod search;

pub use response::ResponseCrew;
pub use score::ScoreCrew;
pub use search::SearchCrew;

use crate::domain::ports::ChatMessage;
use crate::utils::error::{Result, VenueError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentProfile {
    pub role: String,
    pub goal: String,
    pub backstory: String,
}

impl AgentProfile {
    pub fn system_prompt(&self) -> String {
        format!(
            "You are {}.\n{}\n\nYour goal: {}\n\nAnswer with JSON only, no commentary.",
            self.role, self.backstory, self.goal
        )
    }

    /// System message followed by the task.
    pub fn conversation(&self, task: String) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(self.system_prompt()),
            ChatMessage::user(task),
        ]
    }

    pub fn location_analyst() -> Self {
        Self {
            role: "a Location Analyst".to_string(),
            goal: "Identify event venues close to the requested location and report their contact details accurately".to_string(),
            backstory: "You have scouted event spaces for a decade and know how to read search results for real, bookable venues.".to_string(),
        }
    }

    pub fn scoring_agent() -> Self {
        Self {
            role: "a Venue Scoring Specialist".to_string(),
            goal: "Score how well a venue fits an event on a 0 to 100 scale and justify the score in one or two sentences".to_string(),
            backstory: "You evaluate venues on location, capacity, amenities and accessibility for event planners.".to_string(),
        }
    }

    pub fn email_agent() -> Self {
        Self {
            role: "an Event Outreach Writer".to_string(),
            goal: "Write a short, personal inquiry email to a venue on behalf of the sender".to_string(),
            backstory: "You write clear, friendly outreach emails that venue managers answer.".to_string(),
        }
    }
}

fn fence_regex() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| Regex::new(r"(?s)```(?:json)?\s*(.*?)```").expect("fence pattern is valid"))
}

/// Pulls a JSON value out of a model reply, tolerating code fences and
/// prose around the payload.
pub fn extract_json(reply: &str) -> Result<serde_json::Value> {
    let candidate = fence_regex()
        .captures(reply)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .unwrap_or_else(|| reply.trim());

    if let Ok(value) = serde_json::from_str(candidate) {
        return Ok(value);
    }

    let start = candidate.find(['[', '{']);
    let end = candidate.rfind([']', '}']);
    match (start, end) {
        (Some(start), Some(end)) if end > start => serde_json::from_str(&candidate[start..=end])
            .map_err(|e| VenueError::MalformedResponse {
                message: format!("invalid JSON in reply: {}", e),
            }),
        _ => Err(VenueError::MalformedResponse {
            message: "reply contains no JSON".to_string(),
        }),
    }
}

/// Empty and placeholder strings from the model become `None`.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("n/a") && !v.eq_ignore_ascii_case("null"))
}
