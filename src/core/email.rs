use crate::core::fanout::{bounded_join_all, collect_successes};
use crate::crews::ResponseCrew;
use crate::domain::model::{InputData, ScoredVenue, VenueEmail};
use crate::utils::error::Result;
use chrono::NaiveDate;

/// Venues worth writing to: `score >= min_score`, best first, at most
/// `max_emails`. Ties keep their input order.
pub fn select_for_outreach(
    scored: &[ScoredVenue],
    min_score: u32,
    max_emails: usize,
) -> Vec<ScoredVenue> {
    let mut selected: Vec<ScoredVenue> = scored
        .iter()
        .filter(|v| v.score >= min_score)
        .cloned()
        .collect();
    selected.sort_by(|a, b| b.score.cmp(&a.score));
    selected.truncate(max_emails);
    selected
}

pub async fn draft_emails(
    crew: &ResponseCrew,
    input: &InputData,
    venues: &[ScoredVenue],
    concurrency: usize,
    follow_up_date: NaiveDate,
) -> Result<Vec<VenueEmail>> {
    tracing::info!("📧 Drafting {} outreach emails", venues.len());

    let results = bounded_join_all(venues, concurrency, |venue| {
        crew.draft(input, venue, follow_up_date)
    })
    .await;
    collect_successes("Email drafting", results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crews::AgentProfile;
    use crate::domain::model::ScoreDetails;
    use crate::domain::ports::{ChatMessage, LlmClient};
    use async_trait::async_trait;
    use std::sync::Arc;

    fn scored(name: &str, score: u32) -> ScoredVenue {
        ScoredVenue {
            id: name.to_lowercase(),
            name: name.to_string(),
            venue_type: "venue".to_string(),
            address: String::new(),
            description: String::new(),
            distance_km: None,
            website: None,
            phone: None,
            email: None,
            score,
            reason: String::new(),
            details: ScoreDetails::default(),
        }
    }

    #[test]
    fn test_selection_filters_sorts_and_limits() {
        let venues = vec![
            scored("A", 40),
            scored("B", 90),
            scored("C", 70),
            scored("D", 90),
            scored("E", 75),
        ];

        let picked = select_for_outreach(&venues, 50, 3);
        let names: Vec<&str> = picked.iter().map(|v| v.name.as_str()).collect();

        assert_eq!(names, vec!["B", "D", "E"]);
    }

    #[test]
    fn test_selection_with_nothing_above_threshold() {
        let venues = vec![scored("A", 10)];
        assert!(select_for_outreach(&venues, 50, 5).is_empty());
        assert!(select_for_outreach(&venues, 0, 0).is_empty());
    }

    struct EchoLlm;

    #[async_trait]
    impl LlmClient for EchoLlm {
        async fn complete(&self, _messages: Vec<ChatMessage>) -> Result<String> {
            Ok(r#"{"subject": "Inquiry", "body": "Hello there"}"#.to_string())
        }
    }

    #[tokio::test]
    async fn test_draft_emails_one_per_venue() {
        let crew = ResponseCrew::new(Arc::new(EchoLlm), AgentProfile::email_agent());
        let venues = vec![scored("B", 90), scored("E", 75)];
        let follow_up = NaiveDate::from_ymd_opt(2024, 6, 8).unwrap();

        let emails = draft_emails(&crew, &InputData::new("Brooklyn", 1.0), &venues, 2, follow_up)
            .await
            .unwrap();

        assert_eq!(emails.len(), 2);
        assert_eq!(emails[0].venue_name, "B");
        assert_eq!(emails[1].venue_score, 75);
        assert!(emails.iter().all(|e| e.follow_up_date == follow_up));
    }
}
