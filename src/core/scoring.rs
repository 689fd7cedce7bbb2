use crate::core::fanout::{bounded_join_all, collect_successes};
use crate::crews::ScoreCrew;
use crate::domain::model::{InputData, Venue, VenueScore};
use crate::utils::error::Result;

/// Scores every venue with one model call each, `concurrency` at a time.
/// Scores come back in venue order; failed calls are skipped.
pub async fn score_venues(
    crew: &ScoreCrew,
    input: &InputData,
    venues: &[Venue],
    concurrency: usize,
) -> Result<Vec<VenueScore>> {
    tracing::info!(
        "📊 Scoring {} venues ({} concurrent)",
        venues.len(),
        concurrency
    );

    let results = bounded_join_all(venues, concurrency, |venue| crew.score(input, venue)).await;
    collect_successes("Venue scoring", results)
}
