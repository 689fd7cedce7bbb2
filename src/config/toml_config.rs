use crate::adapters::openai::DEFAULT_OPENAI_ENDPOINT;
use crate::adapters::serper::DEFAULT_SERPER_ENDPOINT;
use crate::crews::AgentProfile;
use crate::domain::model::MAX_SCORE;
use crate::utils::error::{Result, VenueError};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_positive_number, validate_range,
    validate_required_field, validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

pub const SERPER_API_KEY_ENV: &str = "SERPER_API_KEY";
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    pub flow: FlowInfo,
    pub search: SearchConfig,
    pub llm: LlmConfig,
    pub scoring: ScoringConfig,
    pub email: EmailConfig,
    pub output: OutputConfig,
    pub monitoring: MonitoringConfig,
    pub agents: AgentsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowInfo {
    pub name: String,
    pub description: String,
    pub version: String,
}

impl Default for FlowInfo {
    fn default() -> Self {
        Self {
            name: "venue-search".to_string(),
            description: "Find, score and contact event venues".to_string(),
            version: "1.0.0".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub num_results: u32,
    pub timeout_seconds: u64,
    pub retry_attempts: u32,
    pub retry_delay_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_SERPER_ENDPOINT.to_string(),
            api_key: None,
            num_results: 10,
            timeout_seconds: 30,
            retry_attempts: 2,
            retry_delay_ms: 500,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_seconds: u64,
    pub retry_attempts: u32,
    pub retry_delay_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_OPENAI_ENDPOINT.to_string(),
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            temperature: 0.2,
            max_tokens: 1500,
            timeout_seconds: 60,
            retry_attempts: 2,
            retry_delay_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub concurrent_requests: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            concurrent_requests: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    pub min_score: u32,
    pub max_emails: usize,
    pub follow_up_days: i64,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            min_score: 0,
            max_emails: 5,
            follow_up_days: 7,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub output_path: String,
    pub archive: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_path: "./outputs".to_string(),
            archive: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentsConfig {
    pub location_analyst: AgentProfile,
    pub scoring_agent: AgentProfile,
    pub email_agent: AgentProfile,
}

impl Default for AgentsConfig {
    fn default() -> Self {
        Self {
            location_analyst: AgentProfile::location_analyst(),
            scoring_agent: AgentProfile::scoring_agent(),
            email_agent: AgentProfile::email_agent(),
        }
    }
}

fn env_var_regex() -> &'static Regex {
    static ENV_VAR: OnceLock<Regex> = OnceLock::new();
    ENV_VAR.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"))
}

impl FlowConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置，並以環境變數補上缺少的 API key
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = Self::substitute_env_vars(content);

        let mut config: Self =
            toml::from_str(&processed).map_err(|e| VenueError::ConfigValidationError {
                field: "toml_parsing".to_string(),
                message: format!("TOML parsing error: {}", e),
            })?;
        config.apply_env_defaults();
        Ok(config)
    }

    /// Defaults plus API keys from the environment.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_defaults();
        config
    }

    /// 替換環境變數 (例如 ${OPENAI_API_KEY})；未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        env_var_regex()
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    fn apply_env_defaults(&mut self) {
        self.fill_api_keys(|name| std::env::var(name).ok());
    }

    /// Replaces blank or unresolved (`${...}`) API keys with `lookup(env var name)`.
    fn fill_api_keys(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        fn usable(key: &Option<String>) -> bool {
            key.as_deref()
                .is_some_and(|k| !k.trim().is_empty() && !k.starts_with("${"))
        }

        if !usable(&self.search.api_key) {
            self.search.api_key = lookup(SERPER_API_KEY_ENV);
        }
        if !usable(&self.llm.api_key) {
            self.llm.api_key = lookup(OPENAI_API_KEY_ENV);
        }
    }

    /// Checks everything except the API keys.
    pub fn validate_settings(&self) -> Result<()> {
        validate_url("search.endpoint", &self.search.endpoint)?;
        validate_url("llm.endpoint", &self.llm.endpoint)?;
        validate_non_empty_string("llm.model", &self.llm.model)?;
        validate_range("llm.temperature", self.llm.temperature, 0.0, 2.0)?;
        validate_positive_number("llm.max_tokens", self.llm.max_tokens as usize, 1)?;
        validate_positive_number("search.num_results", self.search.num_results as usize, 1)?;
        validate_positive_number(
            "scoring.concurrent_requests",
            self.scoring.concurrent_requests,
            1,
        )?;
        validate_range("email.min_score", self.email.min_score, 0, MAX_SCORE)?;
        validate_range("email.follow_up_days", self.email.follow_up_days, 0, 365)?;
        validate_path("output.output_path", &self.output.output_path)?;
        Ok(())
    }

    pub fn search_api_key(&self) -> Result<&str> {
        let key = validate_required_field(SERPER_API_KEY_ENV, &self.search.api_key)?;
        validate_non_empty_string(SERPER_API_KEY_ENV, key)?;
        Ok(key)
    }

    pub fn llm_api_key(&self) -> Result<&str> {
        let key = validate_required_field(OPENAI_API_KEY_ENV, &self.llm.api_key)?;
        validate_non_empty_string(OPENAI_API_KEY_ENV, key)?;
        Ok(key)
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.enabled
    }
}

impl Validate for FlowConfig {
    fn validate(&self) -> Result<()> {
        self.validate_settings()?;
        self.search_api_key()?;
        self.llm_api_key()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = FlowConfig::from_toml_str("").unwrap();

        assert_eq!(config.search.endpoint, DEFAULT_SERPER_ENDPOINT);
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.scoring.concurrent_requests, 5);
        assert_eq!(config.email.max_emails, 5);
        assert_eq!(config.agents.scoring_agent, AgentProfile::scoring_agent());
        assert!(config.validate_settings().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[flow]
name = "brooklyn-launch"

[search]
api_key = "serper-123"
num_results = 20

[llm]
api_key = "sk-123"
model = "gpt-4o"
temperature = 0.7

[scoring]
concurrent_requests = 3

[email]
min_score = 60
max_emails = 2

[output]
output_path = "./runs"
archive = true

[agents.scoring_agent]
role = "a picky planner"
goal = "Score venues"
backstory = "You plan weddings."
"#;

        let config = FlowConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.flow.name, "brooklyn-launch");
        assert_eq!(config.search.num_results, 20);
        assert_eq!(config.search_api_key().unwrap(), "serper-123");
        assert_eq!(config.llm.model, "gpt-4o");
        assert_eq!(config.scoring.concurrent_requests, 3);
        assert_eq!(config.email.min_score, 60);
        assert!(config.output.archive);
        assert_eq!(config.agents.scoring_agent.role, "a picky planner");
        assert_eq!(config.agents.email_agent, AgentProfile::email_agent());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("VENUE_SCOUT_TEST_MODEL", "gpt-4.1");

        let config = FlowConfig::from_toml_str(
            r#"
[llm]
model = "${VENUE_SCOUT_TEST_MODEL}"
endpoint = "${VENUE_SCOUT_TEST_UNSET_ENDPOINT}"
"#,
        )
        .unwrap();

        assert_eq!(config.llm.model, "gpt-4.1");
        assert_eq!(config.llm.endpoint, "${VENUE_SCOUT_TEST_UNSET_ENDPOINT}");
        assert!(config.validate_settings().is_err());

        std::env::remove_var("VENUE_SCOUT_TEST_MODEL");
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let config = FlowConfig::from_toml_str("[scoring]\nconcurrent_requests = 0\n").unwrap();
        assert!(config.validate_settings().is_err());

        let config = FlowConfig::from_toml_str("[email]\nmin_score = 150\n").unwrap();
        assert!(config.validate_settings().is_err());

        let config = FlowConfig::from_toml_str("[llm]\ntemperature = 3.5\n").unwrap();
        assert!(config.validate_settings().is_err());

        let config = FlowConfig::from_toml_str("[llm]\ntemperature = nan\n").unwrap();
        assert!(config.llm.temperature.is_nan());
        assert!(config.validate_settings().is_err());
    }

    #[test]
    fn test_api_keys_fall_back_to_environment() {
        let mut config = FlowConfig::default();
        config.search.api_key = Some("${VENUE_SCOUT_UNSET_SERPER_KEY}".to_string());
        config.llm.api_key = Some("  ".to_string());

        config.fill_api_keys(|name| match name {
            SERPER_API_KEY_ENV => Some("serper-from-env".to_string()),
            OPENAI_API_KEY_ENV => Some("sk-from-env".to_string()),
            _ => None,
        });

        assert_eq!(config.search_api_key().unwrap(), "serper-from-env");
        assert_eq!(config.llm_api_key().unwrap(), "sk-from-env");
    }

    #[test]
    fn test_file_keys_win_over_environment() {
        let mut config = FlowConfig::default();
        config.search.api_key = Some("serper-from-file".to_string());
        config.llm.api_key = None;

        config.fill_api_keys(|_| Some("from-env".to_string()));

        assert_eq!(config.search_api_key().unwrap(), "serper-from-file");
        assert_eq!(config.llm_api_key().unwrap(), "from-env");
    }

    #[test]
    fn test_unresolved_placeholder_counts_as_missing() {
        let processed = FlowConfig::substitute_env_vars(
            "[search]\napi_key = \"${VENUE_SCOUT_UNSET_SERPER_KEY}\"\n",
        );
        let mut config: FlowConfig = toml::from_str(&processed).unwrap();
        assert_eq!(
            config.search.api_key.as_deref(),
            Some("${VENUE_SCOUT_UNSET_SERPER_KEY}")
        );

        config.fill_api_keys(|_| None);

        assert_eq!(config.search.api_key, None);
        assert!(matches!(
            config.search_api_key(),
            Err(VenueError::MissingConfigError { .. })
        ));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_toml() {
        let err = FlowConfig::from_toml_str("[search\nendpoint = 1").unwrap_err();
        assert!(matches!(err, VenueError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[flow]\nname = \"file-test\"\n\n[output]\noutput_path = \"./x\"\n")
            .unwrap();

        let config = FlowConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.flow.name, "file-test");
        assert_eq!(config.output.output_path, "./x");
    }
}
