use crate::domain::model::{FlowOutput, FlowState, FlowStep, InputData};
use crate::domain::ports::Workflow;
use crate::utils::error::Result;
use crate::utils::monitor::StageMonitor;

/// Runs a [`Workflow`] stage by stage over a fresh [`FlowState`].
pub struct FlowEngine<W: Workflow> {
    workflow: W,
    monitoring: bool,
}

impl<W: Workflow> FlowEngine<W> {
    pub fn new(workflow: W) -> Self {
        Self::new_with_monitoring(workflow, false)
    }

    pub fn new_with_monitoring(workflow: W, monitoring: bool) -> Self {
        Self {
            workflow,
            monitoring,
        }
    }

    pub async fn run(&self, input: InputData) -> Result<(FlowState, FlowOutput)> {
        let mut monitor = StageMonitor::new(self.monitoring);
        let mut state = FlowState::new(input);
        tracing::info!("🚀 Starting venue flow");

        self.workflow.initialize(&mut state).await?;
        monitor.finish_stage("initialization");

        self.workflow.search(&mut state).await?;
        monitor.finish_stage("search");
        if state.venues.is_empty() {
            tracing::warn!("No venues found; scoring and emails will be empty");
        }

        self.workflow.score(&mut state).await?;
        monitor.finish_stage("scoring");

        self.workflow.draft_emails(&mut state).await?;
        monitor.finish_stage("email");

        let output = self.workflow.save(&state).await?;
        state.advance(FlowStep::Report);
        monitor.finish_stage("report");

        state.advance(FlowStep::Completed);
        monitor.log_final_stats();
        tracing::info!(
            "✅ Venue flow completed: {} venues, {} scored, {} emails",
            state.venues.len(),
            state.scored_venues.len(),
            state.emails.len()
        );

        Ok((state, output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::VenueError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records the stages it was asked to run; fails at `fail_at` if set.
    #[derive(Default)]
    struct RecordingWorkflow {
        calls: Mutex<Vec<&'static str>>,
        fail_at: Option<&'static str>,
    }

    impl RecordingWorkflow {
        fn step(&self, name: &'static str) -> Result<()> {
            self.calls.lock().unwrap().push(name);
            if self.fail_at == Some(name) {
                return Err(VenueError::ProcessingError {
                    message: format!("{} failed", name),
                });
            }
            Ok(())
        }
    }

    #[async_trait]
    impl Workflow for RecordingWorkflow {
        async fn initialize(&self, state: &mut FlowState) -> Result<()> {
            self.step("initialize")?;
            state.advance(FlowStep::Initialization);
            Ok(())
        }

        async fn search(&self, state: &mut FlowState) -> Result<()> {
            self.step("search")?;
            state.advance(FlowStep::Search);
            Ok(())
        }

        async fn score(&self, state: &mut FlowState) -> Result<()> {
            self.step("score")?;
            state.advance(FlowStep::Scoring);
            Ok(())
        }

        async fn draft_emails(&self, state: &mut FlowState) -> Result<()> {
            self.step("draft_emails")?;
            state.advance(FlowStep::Email);
            Ok(())
        }

        async fn save(&self, _state: &FlowState) -> Result<FlowOutput> {
            self.step("save")?;
            Ok(FlowOutput {
                output_dir: "out".to_string(),
                results_path: "out/results.json".to_string(),
                report_path: "out/report.json".to_string(),
                csv_path: "out/venues.csv".to_string(),
                email_paths: Vec::new(),
                archive_path: None,
            })
        }
    }

    #[tokio::test]
    async fn test_runs_stages_in_order_and_completes() {
        let engine = FlowEngine::new_with_monitoring(RecordingWorkflow::default(), true);

        let (state, output) = engine.run(InputData::new("Brooklyn", 1.0)).await.unwrap();

        assert_eq!(
            *engine.workflow.calls.lock().unwrap(),
            vec!["initialize", "search", "score", "draft_emails", "save"]
        );
        assert_eq!(state.current_step, FlowStep::Completed);
        assert_eq!(state.progress, 1.0);
        assert_eq!(output.output_dir, "out");
    }

    #[tokio::test]
    async fn test_failed_stage_stops_the_flow() {
        let engine = FlowEngine::new(RecordingWorkflow {
            fail_at: Some("score"),
            ..Default::default()
        });

        let err = engine.run(InputData::new("Brooklyn", 1.0)).await.unwrap_err();

        assert!(matches!(err, VenueError::ProcessingError { .. }));
        assert_eq!(
            *engine.workflow.calls.lock().unwrap(),
            vec!["initialize", "search", "score"]
        );
    }
}
