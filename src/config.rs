//! Configuration types.

use std::time::Duration;

use crate::error::ConfigError;

/// Default base URL for candidate apply links.
pub const DEFAULT_APPLY_BASE_URL: &str = "https://1recruit.ai/apply";

/// Default company name used in outreach templates.
pub const DEFAULT_COMPANY_NAME: &str = "1Recruit Technologies";

/// Co-pilot configuration.
#[derive(Debug, Clone)]
pub struct CopilotConfig {
    /// Job the chat panel is opened for.
    pub job_id: String,
    /// Company name rendered into outreach drafts.
    pub company_name: String,
    /// Base URL for apply links; the job id is appended.
    pub apply_base_url: String,
    /// Simulated latency before a free-form acknowledgement.
    pub typing_delay: Duration,
    /// Simulated latency before a scripted flow prompt.
    pub prompt_delay: Duration,
    /// Simulated latency before a terminal "done" message.
    pub processing_delay: Duration,
    /// Seed for canned-reply selection. `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for CopilotConfig {
    fn default() -> Self {
        Self {
            job_id: "job-001".to_string(),
            company_name: DEFAULT_COMPANY_NAME.to_string(),
            apply_base_url: DEFAULT_APPLY_BASE_URL.to_string(),
            typing_delay: Duration::from_millis(1500),
            prompt_delay: Duration::from_millis(600),
            processing_delay: Duration::from_millis(1200),
            seed: None,
        }
    }
}

impl CopilotConfig {
    /// Build a config from `COPILOT_*` environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let job_id = std::env::var("COPILOT_JOB_ID").unwrap_or(defaults.job_id);
        let company_name =
            std::env::var("COPILOT_COMPANY_NAME").unwrap_or(defaults.company_name);
        let apply_base_url = std::env::var("COPILOT_APPLY_BASE_URL")
            .map(|s| s.trim_end_matches('/').to_string())
            .unwrap_or(defaults.apply_base_url);

        let typing_delay = duration_ms("COPILOT_TYPING_DELAY_MS", defaults.typing_delay)?;
        let prompt_delay = duration_ms("COPILOT_PROMPT_DELAY_MS", defaults.prompt_delay)?;
        let processing_delay =
            duration_ms("COPILOT_PROCESSING_DELAY_MS", defaults.processing_delay)?;

        let seed = match std::env::var("COPILOT_SEED") {
            Ok(raw) => Some(raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "COPILOT_SEED".to_string(),
                message: format!("expected an unsigned integer, got {raw:?}"),
            })?),
            Err(_) => None,
        };

        Ok(Self {
            job_id,
            company_name,
            apply_base_url,
            typing_delay,
            prompt_delay,
            processing_delay,
            seed,
        })
    }

    /// Config with all simulated delays set to zero.
    pub fn instant() -> Self {
        Self {
            typing_delay: Duration::ZERO,
            prompt_delay: Duration::ZERO,
            processing_delay: Duration::ZERO,
            ..Self::default()
        }
    }

    /// Apply link for a job.
    pub fn apply_link(&self, job_id: &str) -> String {
        format!("{}/{}", self.apply_base_url, job_id)
    }
}

fn duration_ms(key: &str, default: Duration) -> Result<Duration, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!("expected milliseconds, got {raw:?}"),
            }),
        Err(_) => Ok(default),
    }
}
