use crate::utils::error::VenueError;
use backon::ExponentialBuilder;
use std::time::Duration;

/// Longest wait between two attempts.
const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first one.
    pub retries: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(retries: u32, base_delay: Duration) -> Self {
        Self {
            retries,
            base_delay,
        }
    }

    /// Doubling backoff that starts at `base_delay` and stops after `retries`.
    pub fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(self.base_delay)
            .with_max_delay(MAX_RETRY_DELAY.max(self.base_delay))
            .with_max_times(self.retries as usize)
    }
}

/// Logs a failed attempt before backon sleeps and tries again.
pub(crate) fn log_retry(provider: &'static str) -> impl Fn(&VenueError, Duration) {
    move |err, dur| {
        tracing::warn!(
            "{} call failed, retrying after {:.2}s: {}",
            provider,
            dur.as_secs_f64(),
            err
        );
    }
}

/// Maps a non-success HTTP status to the matching error.
pub(crate) fn status_error(provider: &str, status: reqwest::StatusCode, body: String) -> VenueError {
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        VenueError::RateLimited {
            provider: provider.to_string(),
        }
    } else {
        VenueError::ProviderError {
            provider: provider.to_string(),
            status: status.as_u16(),
            message: body,
        }
    }
}
