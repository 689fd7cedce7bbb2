use crate::adapters::{CompletionSettings, OpenAiClient, RetryPolicy, SerperClient};
use crate::config::FlowConfig;
use crate::core::email::{draft_emails, select_for_outreach};
use crate::core::join::combine_venues_with_scores;
use crate::core::output::{
    build_archive, build_report, email_file_names, scored_venues_csv, ARCHIVE_FILE, CSV_FILE,
    REPORT_FILE, RESULTS_FILE,
};
use crate::core::scoring::score_venues;
use crate::crews::{ResponseCrew, ScoreCrew, SearchCrew};
use crate::domain::model::{FlowOutput, FlowState, FlowStep};
use crate::domain::ports::{LlmClient, SearchClient, Storage, Workflow};
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use async_trait::async_trait;
use chrono::Local;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowSettings {
    pub concurrent_requests: usize,
    pub min_score: u32,
    pub max_emails: usize,
    pub follow_up_days: i64,
    pub archive: bool,
    /// Directory (relative to storage) for this run; `search_<timestamp>` when unset.
    pub run_dir: Option<String>,
}

impl WorkflowSettings {
    pub fn from_config(config: &FlowConfig) -> Self {
        Self {
            concurrent_requests: config.scoring.concurrent_requests,
            min_score: config.email.min_score,
            max_emails: config.email.max_emails,
            follow_up_days: config.email.follow_up_days,
            archive: config.output.archive,
            run_dir: None,
        }
    }
}

/// Venue search, scoring and outreach over the given clients and storage.
pub struct VenueWorkflow<S: Storage> {
    search_crew: SearchCrew,
    score_crew: ScoreCrew,
    response_crew: ResponseCrew,
    storage: S,
    settings: WorkflowSettings,
}

impl<S: Storage> VenueWorkflow<S> {
    pub fn new(
        search: Arc<dyn SearchClient>,
        llm: Arc<dyn LlmClient>,
        storage: S,
        config: &FlowConfig,
    ) -> Self {
        Self {
            search_crew: SearchCrew::new(
                search,
                llm.clone(),
                config.agents.location_analyst.clone(),
                config.search.num_results,
            ),
            score_crew: ScoreCrew::new(llm.clone(), config.agents.scoring_agent.clone()),
            response_crew: ResponseCrew::new(llm, config.agents.email_agent.clone()),
            storage,
            settings: WorkflowSettings::from_config(config),
        }
    }

    /// Wires the Serper and OpenAI clients described by `config`. Both API
    /// keys must be present.
    pub fn from_config(config: &FlowConfig, storage: S) -> Result<Self> {
        let search = SerperClient::new(
            config.search.endpoint.as_str(),
            config.search_api_key()?,
            Duration::from_secs(config.search.timeout_seconds),
            RetryPolicy::new(
                config.search.retry_attempts,
                Duration::from_millis(config.search.retry_delay_ms),
            ),
        )?;
        let llm = OpenAiClient::new(
            config.llm.endpoint.as_str(),
            config.llm_api_key()?,
            CompletionSettings {
                model: config.llm.model.clone(),
                temperature: config.llm.temperature,
                max_tokens: config.llm.max_tokens,
            },
            Duration::from_secs(config.llm.timeout_seconds),
            RetryPolicy::new(
                config.llm.retry_attempts,
                Duration::from_millis(config.llm.retry_delay_ms),
            ),
        )?;

        Ok(Self::new(Arc::new(search), Arc::new(llm), storage, config))
    }

    pub fn with_run_dir(mut self, run_dir: impl Into<String>) -> Self {
        self.settings.run_dir = Some(run_dir.into());
        self
    }

    fn run_dir(&self) -> String {
        self.settings
            .run_dir
            .clone()
            .unwrap_or_else(|| format!("search_{}", Local::now().format("%Y%m%d_%H%M%S")))
    }
}

#[async_trait]
impl<S: Storage> Workflow for VenueWorkflow<S> {
    async fn initialize(&self, state: &mut FlowState) -> Result<()> {
        state.input.validate()?;
        tracing::info!(
            "Starting venue search for location: {} with radius {}km",
            state.input.address,
            state.input.radius_km
        );
        state.advance(FlowStep::Initialization);
        Ok(())
    }

    async fn search(&self, state: &mut FlowState) -> Result<()> {
        let venues = self.search_crew.run(&state.input).await?;
        state.venues = venues;
        state.advance(FlowStep::Search);
        Ok(())
    }

    async fn score(&self, state: &mut FlowState) -> Result<()> {
        let scores = score_venues(
            &self.score_crew,
            &state.input,
            &state.venues,
            self.settings.concurrent_requests,
        )
        .await?;

        state.scored_venues = combine_venues_with_scores(&state.venues, &scores);
        state.venue_scores = scores;
        tracing::info!(
            "Scored {} of {} venues",
            state.scored_venues.len(),
            state.venues.len()
        );
        state.advance(FlowStep::Scoring);
        Ok(())
    }

    async fn draft_emails(&self, state: &mut FlowState) -> Result<()> {
        let selected = select_for_outreach(
            &state.scored_venues,
            self.settings.min_score,
            self.settings.max_emails,
        );
        let follow_up_date =
            Local::now().date_naive() + chrono::Duration::days(self.settings.follow_up_days);

        state.emails = draft_emails(
            &self.response_crew,
            &state.input,
            &selected,
            self.settings.concurrent_requests,
            follow_up_date,
        )
        .await?;
        state.advance(FlowStep::Email);
        Ok(())
    }

    async fn save(&self, state: &FlowState) -> Result<FlowOutput> {
        let run_dir = self.run_dir();
        let path = |name: &str| format!("{}/{}", run_dir, name);
        let mut files: Vec<(String, Vec<u8>)> = Vec::new();

        files.push((RESULTS_FILE.to_string(), serde_json::to_vec_pretty(state)?));
        files.push((CSV_FILE.to_string(), scored_venues_csv(&state.scored_venues)?));

        let email_files = email_file_names(&state.emails);
        for (name, email) in email_files.iter().zip(&state.emails) {
            files.push((name.clone(), email.render().into_bytes()));
        }

        let report = build_report(state, &email_files);
        files.push((REPORT_FILE.to_string(), serde_json::to_vec_pretty(&report)?));

        for (name, data) in &files {
            self.storage.write_file(&path(name), data).await?;
        }

        let archive_path = if self.settings.archive {
            let archive = build_archive(&files)?;
            self.storage.write_file(&path(ARCHIVE_FILE), &archive).await?;
            Some(self.storage.locate(&path(ARCHIVE_FILE)))
        } else {
            None
        };

        tracing::info!(
            "💾 Saved {} venues, {} emails to {}",
            state.scored_venues.len(),
            state.emails.len(),
            self.storage.locate(&run_dir)
        );

        Ok(FlowOutput {
            output_dir: self.storage.locate(&run_dir),
            results_path: self.storage.locate(&path(RESULTS_FILE)),
            report_path: self.storage.locate(&path(REPORT_FILE)),
            csv_path: self.storage.locate(&path(CSV_FILE)),
            email_paths: email_files
                .iter()
                .map(|name| self.storage.locate(&path(name)))
                .collect(),
            archive_path,
        })
    }
}
