use crate::crews::{extract_json, AgentProfile};
use crate::domain::model::{InputData, ScoreDetails, Venue, VenueScore, MAX_SCORE};
use crate::domain::ports::LlmClient;
use crate::utils::error::{Result, VenueError};
use chrono::Utc;
use std::sync::Arc;

pub struct ScoreCrew {
    llm: Arc<dyn LlmClient>,
    profile: AgentProfile,
}

impl ScoreCrew {
    pub fn new(llm: Arc<dyn LlmClient>, profile: AgentProfile) -> Self {
        Self { llm, profile }
    }

    pub async fn score(&self, input: &InputData, venue: &Venue) -> Result<VenueScore> {
        tracing::debug!("Scoring venue: {}", venue.name);
        let task = self.task_prompt(input, venue)?;
        let reply = self.llm.complete(self.profile.conversation(task)).await?;
        parse_score(&reply, &venue.name)
    }

    fn task_prompt(&self, input: &InputData, venue: &Venue) -> Result<String> {
        let mut prompt = String::from("Score this venue for the event below.\n\nEvent:\n");
        prompt.push_str(&format!(
            "- Location searched: {} (radius {} km)\n",
            input.address.trim(),
            input.radius_km
        ));
        if let Some(description) = &input.event_description {
            prompt.push_str(&format!("- Description: {}\n", description));
        }
        if let Some(date) = input.event_date {
            prompt.push_str(&format!("- Date: {}\n", date.format("%A %B %d, %Y")));
        }
        if let Some(time) = &input.event_time {
            prompt.push_str(&format!("- Time: {}\n", time));
        }

        prompt.push_str(&format!(
            "\nVenue:\n{}\n\n\
             Return a JSON object with \"name\" (the venue name exactly as given), \
             \"score\" (integer from 0 to {max}) and \"reason\" (one or two sentences). \
             Also include \"location_score\", \"amenities_score\" and \"accessibility_score\" \
             (integers from 0 to {max}), \"key_features\" (a list of short phrases covering \
             capacity, amenities, accessibility, parking and anything special) and \
             \"recommendations\" (a list of short tips for booking this venue).",
            serde_json::to_string_pretty(venue)?,
            max = MAX_SCORE
        ));
        Ok(prompt)
    }
}

/// Parses a score reply. `fallback_name` is used when the model leaves the
/// name out. Numeric strings and fractional scores are accepted and rounded.
pub fn parse_score(reply: &str, fallback_name: &str) -> Result<VenueScore> {
    let value = extract_json(reply)?;
    let obj = value.as_object().ok_or_else(|| VenueError::MalformedResponse {
        message: format!("expected a score object, got {}", value),
    })?;

    let name = obj
        .get("name")
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(fallback_name)
        .to_string();

    let raw_score = number(obj.get("score")).ok_or_else(|| VenueError::MalformedResponse {
        message: format!("missing or non-numeric score for {}", name),
    })?;

    if !in_score_range(raw_score) {
        return Err(VenueError::MalformedResponse {
            message: format!("score {} for {} is outside 0..={}", raw_score, name, MAX_SCORE),
        });
    }

    let reason = obj
        .get("reason")
        .and_then(|v| v.as_str())
        .map(|r| r.trim().to_string())
        .unwrap_or_default();

    let details = ScoreDetails {
        location_score: sub_score(obj, "location_score", &name),
        amenities_score: sub_score(obj, "amenities_score", &name),
        accessibility_score: sub_score(obj, "accessibility_score", &name),
        key_features: string_list(obj.get("key_features"), ','),
        recommendations: string_list(obj.get("recommendations"), ';'),
    };

    Ok(VenueScore {
        name,
        score: raw_score.round() as u32,
        reason,
        details,
        created_at: Utc::now(),
    })
}

fn number(value: Option<&serde_json::Value>) -> Option<f64> {
    match value? {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn in_score_range(value: f64) -> bool {
    value.is_finite() && (0.0..=MAX_SCORE as f64).contains(&value)
}

/// Sub-scores are optional; an unusable one is dropped.
fn sub_score(
    obj: &serde_json::Map<String, serde_json::Value>,
    key: &str,
    name: &str,
) -> Option<u32> {
    let raw = obj.get(key)?;
    match number(Some(raw)) {
        Some(value) if in_score_range(value) => Some(value.round() as u32),
        _ => {
            tracing::warn!("Ignoring {} {} for {}", key, raw, name);
            None
        }
    }
}

/// Accepts a JSON list of strings or one string joined by `separator`.
fn string_list(value: Option<&serde_json::Value>, separator: char) -> Vec<String> {
    let items: Vec<String> = match value {
        Some(serde_json::Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_str())
            .map(str::to_string)
            .collect(),
        Some(serde_json::Value::String(joined)) => {
            joined.split(separator).map(str::to_string).collect()
        }
        _ => Vec::new(),
    };
    items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}
