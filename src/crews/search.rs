use crate::crews::{extract_json, non_blank, AgentProfile};
use crate::domain::model::{InputData, Venue};
use crate::domain::ports::{LlmClient, SearchClient, SearchHit};
use crate::utils::error::{Result, VenueError};
use chrono::Utc;
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Arc;

/// Finds venues around the input location: web search, then the model turns
/// the hits into venue records.
pub struct SearchCrew {
    search: Arc<dyn SearchClient>,
    llm: Arc<dyn LlmClient>,
    profile: AgentProfile,
    num_results: u32,
}

#[derive(Debug, Deserialize)]
struct RawVenue {
    name: String,
    #[serde(rename = "type", default)]
    venue_type: Option<String>,
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    distance_km: Option<f64>,
    #[serde(default)]
    website: Option<String>,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    email: Option<String>,
}

impl SearchCrew {
    pub fn new(
        search: Arc<dyn SearchClient>,
        llm: Arc<dyn LlmClient>,
        profile: AgentProfile,
        num_results: u32,
    ) -> Self {
        Self {
            search,
            llm,
            profile,
            num_results,
        }
    }

    pub fn query_for(input: &InputData) -> String {
        format!(
            "event venues near {} within {} km",
            input.address.trim(),
            input.radius_km
        )
    }

    pub async fn run(&self, input: &InputData) -> Result<Vec<Venue>> {
        let query = Self::query_for(input);
        tracing::info!("🔍 Searching: {}", query);

        let hits = self.search.search(&query, self.num_results).await?;
        tracing::debug!("Search returned {} hits", hits.len());
        if hits.is_empty() {
            tracing::warn!("Search returned no results for '{}'", query);
            return Ok(Vec::new());
        }

        let task = self.task_prompt(input, &hits)?;
        let reply = self.llm.complete(self.profile.conversation(task)).await?;
        let venues = parse_venues(&reply)?;

        tracing::info!("Found {} venues", venues.len());
        Ok(venues)
    }

    fn task_prompt(&self, input: &InputData, hits: &[SearchHit]) -> Result<String> {
        let hits_json = serde_json::to_string_pretty(hits)?;
        let mut prompt = format!(
            "Search for venues near {} within a {} km radius.\n",
            input.address.trim(),
            input.radius_km
        );
        if let Some(description) = &input.event_description {
            prompt.push_str(&format!("The venues must suit this event: {}\n", description));
        }
        prompt.push_str(&format!(
            "\nWeb search results:\n{}\n\n\
             Return a JSON array. Each element describes one real venue with the keys \
             \"name\", \"type\", \"address\", \"description\", \"distance_km\" (number), \
             \"website\", \"phone\" and \"email\". Use null for anything the results do not show. \
             Leave out results that are not venues.",
            hits_json
        ));
        Ok(prompt)
    }
}

/// Stable identifier derived from a venue name: lowercase, runs of other
/// characters collapsed to `_`.
pub fn venue_id(name: &str) -> String {
    let mut id = String::with_capacity(name.len());
    for ch in name.trim().chars() {
        if ch.is_alphanumeric() {
            id.extend(ch.to_lowercase());
        } else if !id.ends_with('_') {
            id.push('_');
        }
    }
    id.trim_matches('_').to_string()
}

/// Parses the model's venue list. Records that do not fit the shape are
/// skipped; duplicate ids keep the first occurrence.
pub fn parse_venues(reply: &str) -> Result<Vec<Venue>> {
    let value = extract_json(reply)?;
    let items = match value {
        serde_json::Value::Array(items) => items,
        serde_json::Value::Object(mut obj) => match obj.remove("venues") {
            Some(serde_json::Value::Array(items)) => items,
            _ => vec![serde_json::Value::Object(obj)],
        },
        other => {
            return Err(VenueError::MalformedResponse {
                message: format!("expected a venue list, got {}", other),
            })
        }
    };

    let mut seen = HashSet::new();
    let mut venues = Vec::with_capacity(items.len());
    for item in items {
        let raw: RawVenue = match serde_json::from_value(item) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("Skipping malformed venue record: {}", e);
                continue;
            }
        };

        let name = raw.name.trim().to_string();
        let id = venue_id(&name);
        if id.is_empty() {
            tracing::warn!("Skipping venue record without a name");
            continue;
        }
        if !seen.insert(id.clone()) {
            tracing::debug!("Skipping duplicate venue: {}", name);
            continue;
        }

        venues.push(Venue {
            id,
            name,
            venue_type: non_blank(raw.venue_type).unwrap_or_else(|| "venue".to_string()),
            address: non_blank(raw.address).unwrap_or_default(),
            description: non_blank(raw.description).unwrap_or_default(),
            distance_km: raw.distance_km.filter(|d| d.is_finite() && *d >= 0.0),
            website: non_blank(raw.website),
            phone: non_blank(raw.phone),
            email: non_blank(raw.email),
            created_at: Utc::now(),
        });
    }

    Ok(venues)
}
