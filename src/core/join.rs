use crate::domain::model::{ScoredVenue, Venue, VenueScore};
use std::collections::HashMap;

/// Key used to match a venue with its score: trimmed and lowercased name.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Joins venues with their scores by normalized name.
///
/// Output follows the order of `venues`. Venues without a matching score are
/// dropped; when several scores share a name the last one wins.
pub fn combine_venues_with_scores(venues: &[Venue], scores: &[VenueScore]) -> Vec<ScoredVenue> {
    let by_name: HashMap<String, &VenueScore> = scores
        .iter()
        .map(|score| (normalize_name(&score.name), score))
        .collect();

    tracing::debug!(
        "Joining {} venues with {} scores ({} distinct names)",
        venues.len(),
        scores.len(),
        by_name.len()
    );

    venues
        .iter()
        .filter_map(|venue| match by_name.get(&normalize_name(&venue.name)) {
            Some(score) => Some(ScoredVenue::from_parts(venue, score)),
            None => {
                tracing::debug!("No score found for venue: {}", venue.name);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::ScoreDetails;
    use chrono::Utc;

    fn venue(name: &str) -> Venue {
        Venue {
            id: name.to_lowercase().replace(' ', "_"),
            name: name.to_string(),
            venue_type: "event_space".to_string(),
            address: "1 Main St".to_string(),
            description: String::new(),
            distance_km: Some(0.3),
            website: None,
            phone: Some("555-0100".to_string()),
            email: None,
            created_at: Utc::now(),
        }
    }

    fn score(name: &str, value: u32, reason: &str) -> VenueScore {
        VenueScore {
            name: name.to_string(),
            score: value,
            reason: reason.to_string(),
            details: ScoreDetails::default(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_matches_ignoring_case_and_surrounding_whitespace() {
        let venues = vec![venue("The Greenhouse"), venue("Dock Hall")];
        let scores = vec![score("  the greenhouse ", 82, "Great light")];

        let joined = combine_venues_with_scores(&venues, &scores);

        assert_eq!(joined.len(), 1);
        assert_eq!(joined[0].name, "The Greenhouse");
        assert_eq!(joined[0].score, 82);
        assert_eq!(joined[0].reason, "Great light");
        assert_eq!(joined[0].phone.as_deref(), Some("555-0100"));
    }

    #[test]
    fn test_unscored_venues_are_excluded_and_order_follows_venues() {
        let venues = vec![venue("A"), venue("B"), venue("C")];
        let scores = vec![score("c", 10, "far"), score("a", 90, "close")];

        let joined = combine_venues_with_scores(&venues, &scores);
        let names: Vec<&str> = joined.iter().map(|v| v.name.as_str()).collect();

        assert_eq!(names, vec!["A", "C"]);
    }

    #[test]
    fn test_last_duplicate_score_wins() {
        let venues = vec![venue("Loft")];
        let scores = vec![score("Loft", 40, "first"), score("loft", 75, "second")];

        let joined = combine_venues_with_scores(&venues, &scores);

        assert_eq!(joined[0].score, 75);
        assert_eq!(joined[0].reason, "second");
    }

    #[test]
    fn test_score_details_carry_over() {
        let mut scored = score("Loft", 80, "roomy");
        scored.details.amenities_score = Some(70);
        scored.details.key_features = vec!["Freight elevator".to_string()];

        let joined = combine_venues_with_scores(&[venue("Loft")], &[scored]);

        assert_eq!(joined[0].details.amenities_score, Some(70));
        assert_eq!(joined[0].details.key_features, vec!["Freight elevator"]);
    }

    #[test]
    fn test_empty_inputs() {
        assert!(combine_venues_with_scores(&[], &[score("x", 1, "")]).is_empty());
        assert!(combine_venues_with_scores(&[venue("x")], &[]).is_empty());
    }
}
