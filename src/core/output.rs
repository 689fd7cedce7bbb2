use crate::domain::model::{FlowState, ScoredVenue, SearchReport, VenueEmail};
use crate::utils::error::{Result, VenueError};
use chrono::Utc;
use std::collections::HashSet;
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

pub const RESULTS_FILE: &str = "venue_search_results.json";
pub const CSV_FILE: &str = "scored_venues.csv";
pub const REPORT_FILE: &str = "reports/search_report.json";
pub const ARCHIVE_FILE: &str = "venue_search_results.zip";
pub const EMAILS_DIR: &str = "emails";

/// How many top venues contribute their reasons to the report.
const RECOMMENDATION_COUNT: usize = 3;

/// Keeps alphanumerics, spaces, `-` and `_`; the rest is dropped.
pub fn safe_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        "venue".to_string()
    } else {
        cleaned.to_string()
    }
}

/// One `emails/{venue_id}_email.txt` path per email. A name that is already
/// taken gets `_2`, `_3`, ... appended to its stem.
pub fn email_file_names(emails: &[VenueEmail]) -> Vec<String> {
    let mut taken = HashSet::with_capacity(emails.len());
    emails
        .iter()
        .map(|email| {
            let stem = safe_file_name(&email.venue_id);
            let mut candidate = stem.clone();
            let mut n = 1;
            while !taken.insert(candidate.clone()) {
                n += 1;
                candidate = format!("{}_{}", stem, n);
            }
            format!("{}/{}_email.txt", EMAILS_DIR, candidate)
        })
        .collect()
}

pub fn build_report(state: &FlowState, email_files: &[String]) -> SearchReport {
    let scored = &state.scored_venues;

    let average_score = if scored.is_empty() {
        None
    } else {
        let total: u32 = scored.iter().map(|v| v.score).sum();
        Some(f64::from(total) / scored.len() as f64)
    };

    let mut ranked: Vec<&ScoredVenue> = scored.iter().collect();
    ranked.sort_by(|a, b| b.score.cmp(&a.score));

    let recommendations = ranked
        .iter()
        .take(RECOMMENDATION_COUNT)
        .filter(|v| !v.reason.is_empty())
        .map(|v| format!("{} ({}): {}", v.name, v.score, v.reason))
        .collect();

    SearchReport {
        address: state.input.address.clone(),
        radius_km: state.input.radius_km,
        venues_found: state.venues.len(),
        venues_scored: scored.len(),
        emails_generated: state.emails.len(),
        average_score,
        top_venue: ranked.first().map(|v| v.name.clone()),
        email_files: email_files.to_vec(),
        recommendations,
        generated_at: Utc::now(),
    }
}

pub fn scored_venues_csv(venues: &[ScoredVenue]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "id",
        "name",
        "type",
        "address",
        "distance_km",
        "website",
        "phone",
        "email",
        "score",
        "reason",
        "location_score",
        "amenities_score",
        "accessibility_score",
        "key_features",
    ])?;

    for venue in venues {
        let distance = venue.distance_km.map(|d| format!("{:.2}", d)).unwrap_or_default();
        let score = venue.score.to_string();
        let sub_score = |value: Option<u32>| value.map(|v| v.to_string()).unwrap_or_default();
        let location = sub_score(venue.details.location_score);
        let amenities = sub_score(venue.details.amenities_score);
        let accessibility = sub_score(venue.details.accessibility_score);
        let features = venue.details.key_features.join("; ");
        writer.write_record([
            venue.id.as_str(),
            venue.name.as_str(),
            venue.venue_type.as_str(),
            venue.address.as_str(),
            distance.as_str(),
            venue.website.as_deref().unwrap_or(""),
            venue.phone.as_deref().unwrap_or(""),
            venue.email.as_deref().unwrap_or(""),
            score.as_str(),
            venue.reason.as_str(),
            location.as_str(),
            amenities.as_str(),
            accessibility.as_str(),
            features.as_str(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| VenueError::IoError(e.into_error()))
}

/// Bundles `(name, contents)` pairs into one ZIP in memory.
pub fn build_archive(files: &[(String, Vec<u8>)]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    for (name, data) in files {
        zip.start_file::<_, ()>(name.as_str(), FileOptions::default())?;
        zip.write_all(data)?;
    }
    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}
