use crate::crews::{extract_json, AgentProfile};
use crate::domain::model::{InputData, ScoredVenue, VenueEmail};
use crate::domain::ports::LlmClient;
use crate::utils::error::{Result, VenueError};
use chrono::NaiveDate;
use std::sync::Arc;

/// Drafts outreach emails for scored venues.
pub struct ResponseCrew {
    llm: Arc<dyn LlmClient>,
    profile: AgentProfile,
}

impl ResponseCrew {
    pub fn new(llm: Arc<dyn LlmClient>, profile: AgentProfile) -> Self {
        Self { llm, profile }
    }

    pub async fn draft(
        &self,
        input: &InputData,
        venue: &ScoredVenue,
        follow_up_date: NaiveDate,
    ) -> Result<VenueEmail> {
        tracing::debug!("Drafting email for venue: {}", venue.name);
        let task = self.task_prompt(input, venue);
        let reply = self.llm.complete(self.profile.conversation(task)).await?;
        let (subject, body) = parse_email(&reply, &venue.name)?;

        Ok(VenueEmail {
            venue_id: venue.id.clone(),
            venue_name: venue.name.clone(),
            recipient: venue.email.clone(),
            subject,
            body,
            venue_score: venue.score,
            key_features: venue.details.key_features.clone(),
            follow_up_date,
        })
    }

    fn task_prompt(&self, input: &InputData, venue: &ScoredVenue) -> String {
        let mut prompt = format!(
            "Write an inquiry email to {} ({}) about hosting an event there.\n",
            venue.name, venue.address
        );
        prompt.push_str(&format!(
            "We picked this venue because: {} (score {}/100).\n\n",
            venue.reason, venue.score
        ));

        if !venue.details.key_features.is_empty() {
            prompt.push_str(&format!(
                "Mention what stood out about the venue: {}.\n\n",
                venue.details.key_features.join(", ")
            ));
        }

        prompt.push_str("Event details:\n");
        if let Some(description) = &input.event_description {
            prompt.push_str(&format!("- {}\n", description));
        }
        if let Some(date) = input.event_date {
            prompt.push_str(&format!("- Date: {}\n", date.format("%A %B %d, %Y")));
        }
        if let Some(time) = &input.event_time {
            prompt.push_str(&format!("- Time: {}\n", time));
        }
        prompt.push_str("Ask about availability, pricing, capacity and amenities.\n\n");

        prompt.push_str("Sign the email as:\n");
        prompt.push_str(&format!(
            "- {}\n",
            input.sender_name.as_deref().unwrap_or("The event team")
        ));
        if let Some(email) = &input.sender_email {
            prompt.push_str(&format!("- {}\n", email));
        }
        for (label, url) in input.social_links() {
            prompt.push_str(&format!("- {}: {}\n", label, url));
        }

        prompt.push_str("\nReturn a JSON object with \"subject\" and \"body\".");
        prompt
    }
}

/// Reads `{"subject", "body"}`. A reply with no JSON in it is used as the
/// body under a default subject; JSON of any other shape is rejected.
pub fn parse_email(reply: &str, venue_name: &str) -> Result<(String, String)> {
    let default_subject = || format!("Event venue inquiry: {}", venue_name);

    match extract_json(reply) {
        Ok(serde_json::Value::Object(obj)) => {
            let body = obj
                .get("body")
                .and_then(|v| v.as_str())
                .map(str::trim)
                .filter(|b| !b.is_empty())
                .ok_or_else(|| VenueError::MalformedResponse {
                    message: format!("email for {} has no body", venue_name),
                })?;
            let subject = obj
                .get("subject")
                .and_then(|v| v.as_str())
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .unwrap_or_else(default_subject);
            Ok((subject, body.to_string()))
        }
        Ok(other) => Err(VenueError::MalformedResponse {
            message: format!("expected an email object for {}, got {}", venue_name, other),
        }),
        Err(_) if !reply.trim().is_empty() => {
            tracing::warn!("Email reply for {} was not JSON, using it verbatim", venue_name);
            Ok((default_subject(), reply.trim().to_string()))
        }
        Err(_) => Err(VenueError::MalformedResponse {
            message: format!("empty email reply for {}", venue_name),
        }),
    }
}
