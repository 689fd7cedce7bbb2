use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::error::{Result, VenueError};
use crate::utils::validation::{
    validate_email, validate_non_empty_string, validate_range, validate_url, Validate,
};

pub const MIN_RADIUS_KM: f64 = 0.1;
pub const MAX_RADIUS_KM: f64 = 50.0;
pub const MAX_SCORE: u32 = 100;

/// What the user asked for: where to look, what the event is, who is writing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputData {
    pub address: String,
    pub radius_km: f64,
    #[serde(default)]
    pub event_description: Option<String>,
    #[serde(default)]
    pub event_date: Option<NaiveDate>,
    #[serde(default)]
    pub event_time: Option<String>,
    #[serde(default)]
    pub sender_name: Option<String>,
    #[serde(default)]
    pub sender_email: Option<String>,
    #[serde(default)]
    pub linkedin_url: Option<String>,
    #[serde(default)]
    pub instagram_url: Option<String>,
    #[serde(default)]
    pub tiktok_url: Option<String>,
}

impl InputData {
    pub fn new(address: impl Into<String>, radius_km: f64) -> Self {
        Self {
            address: address.into(),
            radius_km,
            event_description: None,
            event_date: None,
            event_time: None,
            sender_name: None,
            sender_email: None,
            linkedin_url: None,
            instagram_url: None,
            tiktok_url: None,
        }
    }

    /// Present social links as `(label, url)` pairs.
    pub fn social_links(&self) -> Vec<(&'static str, &str)> {
        [
            ("LinkedIn", self.linkedin_url.as_deref()),
            ("Instagram", self.instagram_url.as_deref()),
            ("TikTok", self.tiktok_url.as_deref()),
        ]
        .into_iter()
        .filter_map(|(label, url)| url.map(|u| (label, u)))
        .collect()
    }
}

impl Validate for InputData {
    fn validate(&self) -> Result<()> {
        self.check_fields().map_err(VenueError::into_input_error)
    }
}

impl InputData {
    fn check_fields(&self) -> Result<()> {
        validate_non_empty_string("address", &self.address)?;
        validate_range("radius_km", self.radius_km, MIN_RADIUS_KM, MAX_RADIUS_KM)?;

        if let Some(email) = &self.sender_email {
            validate_email("sender_email", email)?;
        }
        if let Some(url) = &self.linkedin_url {
            validate_url("linkedin_url", url)?;
        }
        if let Some(url) = &self.instagram_url {
            validate_url("instagram_url", url)?;
        }
        if let Some(url) = &self.tiktok_url {
            validate_url("tiktok_url", url)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub venue_type: String,
    pub address: String,
    pub description: String,
    pub distance_km: Option<f64>,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Optional breakdown that comes with a score when the model provides one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreDetails {
    #[serde(default)]
    pub location_score: Option<u32>,
    #[serde(default)]
    pub amenities_score: Option<u32>,
    #[serde(default)]
    pub accessibility_score: Option<u32>,
    /// Capacity, amenities, parking and similar highlights worth mentioning.
    #[serde(default)]
    pub key_features: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VenueScore {
    pub name: String,
    pub score: u32,
    pub reason: String,
    #[serde(flatten)]
    pub details: ScoreDetails,
    pub created_at: DateTime<Utc>,
}

/// A venue joined with its score by normalized name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredVenue {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub venue_type: String,
    pub address: String,
    pub description: String,
    pub distance_km: Option<f64>,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub score: u32,
    pub reason: String,
    #[serde(flatten)]
    pub details: ScoreDetails,
}

impl ScoredVenue {
    pub fn from_parts(venue: &Venue, score: &VenueScore) -> Self {
        Self {
            id: venue.id.clone(),
            name: venue.name.clone(),
            venue_type: venue.venue_type.clone(),
            address: venue.address.clone(),
            description: venue.description.clone(),
            distance_km: venue.distance_km,
            website: venue.website.clone(),
            phone: venue.phone.clone(),
            email: venue.email.clone(),
            score: score.score,
            reason: score.reason.clone(),
            details: score.details.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VenueEmail {
    pub venue_id: String,
    pub venue_name: String,
    pub recipient: Option<String>,
    pub subject: String,
    pub body: String,
    pub venue_score: u32,
    #[serde(default)]
    pub key_features: Vec<String>,
    pub follow_up_date: NaiveDate,
}

impl VenueEmail {
    /// The text written to disk: subject line, blank line, body.
    pub fn render(&self) -> String {
        let mut out = String::new();
        if let Some(to) = &self.recipient {
            out.push_str(&format!("To: {}\n", to));
        }
        out.push_str(&format!("Subject: {}\n\n", self.subject));
        out.push_str(self.body.trim_end());
        out.push('\n');
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowStep {
    Initialization,
    Search,
    Scoring,
    Email,
    Report,
    Completed,
}

impl FlowStep {
    /// Progress fraction reached once this step has finished.
    pub fn progress(self) -> f32 {
        match self {
            FlowStep::Initialization => 0.1,
            FlowStep::Search => 0.4,
            FlowStep::Scoring => 0.8,
            FlowStep::Email => 0.9,
            FlowStep::Report => 0.95,
            FlowStep::Completed => 1.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FlowStep::Initialization => "initialization",
            FlowStep::Search => "search",
            FlowStep::Scoring => "scoring",
            FlowStep::Email => "email",
            FlowStep::Report => "report",
            FlowStep::Completed => "completed",
        }
    }
}

/// Shared record every stage of a flow run reads from and writes into.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowState {
    pub input: InputData,
    pub venues: Vec<Venue>,
    pub venue_scores: Vec<VenueScore>,
    pub scored_venues: Vec<ScoredVenue>,
    pub emails: Vec<VenueEmail>,
    pub current_step: FlowStep,
    pub progress: f32,
}

impl FlowState {
    pub fn new(input: InputData) -> Self {
        Self {
            input,
            venues: Vec::new(),
            venue_scores: Vec::new(),
            scored_venues: Vec::new(),
            emails: Vec::new(),
            current_step: FlowStep::Initialization,
            progress: 0.0,
        }
    }

    pub fn advance(&mut self, step: FlowStep) {
        self.current_step = step;
        self.progress = step.progress();
        tracing::info!("Progress: {} ({:.0}%)", step.as_str(), self.progress * 100.0);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchReport {
    pub address: String,
    pub radius_km: f64,
    pub venues_found: usize,
    pub venues_scored: usize,
    pub emails_generated: usize,
    pub average_score: Option<f64>,
    pub top_venue: Option<String>,
    pub email_files: Vec<String>,
    pub recommendations: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

/// Where a finished run left its files.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowOutput {
    pub output_dir: String,
    pub results_path: String,
    pub report_path: String,
    pub csv_path: String,
    pub email_paths: Vec<String>,
    pub archive_path: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::ErrorCategory;

    #[test]
    fn test_input_validation() {
        let mut input = InputData::new("333 Adams St, Brooklyn, NY 11201", 0.5);
        assert!(input.validate().is_ok());

        input.radius_km = 0.0;
        assert!(input.validate().is_err());

        input.radius_km = f64::NAN;
        assert!(input.validate().is_err());

        input.radius_km = 1.0;
        input.address = "   ".to_string();
        assert!(input.validate().is_err());

        input.address = "Brooklyn".to_string();
        input.sender_email = Some("not-an-email".to_string());
        assert!(input.validate().is_err());

        input.sender_email = Some("john.doe@example.com".to_string());
        input.tiktok_url = Some("tiktok.com/@mycompany".to_string());
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_input_errors_are_validation_errors() {
        let input = InputData::new("Brooklyn", 500.0);

        let err = input.validate().unwrap_err();
        assert!(matches!(err, VenueError::ValidationError { .. }));
        assert_eq!(err.category(), ErrorCategory::Validation);
        assert!(err.to_string().contains("radius_km"));
    }

    #[test]
    fn test_social_links_skip_missing() {
        let mut input = InputData::new("Brooklyn", 1.0);
        input.instagram_url = Some("https://instagram.com/mycompany".to_string());

        let links = input.social_links();
        assert_eq!(links, vec![("Instagram", "https://instagram.com/mycompany")]);
    }

    #[test]
    fn test_email_render_includes_recipient_and_subject() {
        let email = VenueEmail {
            venue_id: "brooklyn_loft".to_string(),
            venue_name: "Brooklyn Loft".to_string(),
            recipient: Some("events@loft.example".to_string()),
            subject: "Event inquiry".to_string(),
            body: "Dear team,\n\nHello.\n\n".to_string(),
            venue_score: 88,
            key_features: vec!["Rooftop".to_string()],
            follow_up_date: NaiveDate::from_ymd_opt(2024, 6, 8).unwrap(),
        };

        assert_eq!(
            email.render(),
            "To: events@loft.example\nSubject: Event inquiry\n\nDear team,\n\nHello.\n"
        );
    }

    #[test]
    fn test_flow_state_advance_sets_progress() {
        let mut state = FlowState::new(InputData::new("Brooklyn", 1.0));
        assert_eq!(state.progress, 0.0);

        state.advance(FlowStep::Scoring);
        assert_eq!(state.current_step, FlowStep::Scoring);
        assert_eq!(state.progress, 0.8);
    }
}
