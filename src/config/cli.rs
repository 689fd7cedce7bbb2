use crate::config::toml_config::FlowConfig;
use crate::domain::model::InputData;
use chrono::NaiveDate;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "venue-scout")]
#[command(about = "Find event venues near an address, score them and draft outreach emails")]
pub struct CliArgs {
    /// Path to a TOML configuration file; defaults and environment keys are used without one
    #[arg(short, long)]
    pub config: Option<String>,

    /// Location to search around
    #[arg(long, default_value = "333 Adams St, Brooklyn, NY 11201, United States")]
    pub address: String,

    /// Search radius in kilometres
    #[arg(long, default_value_t = 0.5)]
    pub radius_km: f64,

    /// What the event is (guests, format, needs)
    #[arg(long)]
    pub event_description: Option<String>,

    /// Event date, YYYY-MM-DD
    #[arg(long)]
    pub event_date: Option<NaiveDate>,

    #[arg(long)]
    pub event_time: Option<String>,

    #[arg(long)]
    pub sender_name: Option<String>,

    #[arg(long)]
    pub sender_email: Option<String>,

    #[arg(long)]
    pub linkedin_url: Option<String>,

    #[arg(long)]
    pub instagram_url: Option<String>,

    #[arg(long)]
    pub tiktok_url: Option<String>,

    /// Override output.output_path from config
    #[arg(long)]
    pub output_path: Option<String>,

    /// Also bundle the results into a ZIP archive
    #[arg(long)]
    pub archive: bool,

    /// Log per-stage timing and memory
    #[arg(long)]
    pub monitor: bool,

    /// Validate inputs and print the plan without calling any API
    #[arg(long)]
    pub dry_run: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliArgs {
    pub fn input_data(&self) -> InputData {
        InputData {
            address: self.address.clone(),
            radius_km: self.radius_km,
            event_description: self.event_description.clone(),
            event_date: self.event_date,
            event_time: self.event_time.clone(),
            sender_name: self.sender_name.clone(),
            sender_email: self.sender_email.clone(),
            linkedin_url: self.linkedin_url.clone(),
            instagram_url: self.instagram_url.clone(),
            tiktok_url: self.tiktok_url.clone(),
        }
    }

    /// 套用命令列覆蓋設定
    pub fn apply_overrides(&self, config: &mut FlowConfig) {
        if let Some(path) = &self.output_path {
            config.output.output_path = path.clone();
            tracing::info!("🔧 Output path overridden to: {}", path);
        }
        if self.archive {
            config.output.archive = true;
        }
        if self.monitor {
            config.monitoring.enabled = true;
        }
    }
}
