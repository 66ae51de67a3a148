use crate::error::Result;
use log::{debug, warn};
use std::time::Duration;
use tokio::time::sleep;

/// Bounded, fixed-interval retry. Used for startup store connectivity only;
/// nothing inside the core retries automatically.
pub struct RetryConfig {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 30,
            interval: Duration::from_secs(2),
        }
    }
}

pub async fn retry_with_interval<F, Fut, T>(
    mut operation: F,
    config: RetryConfig,
    operation_name: &str,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let mut last_error = None;

    for attempt in 1..=config.max_attempts {
        debug!(
            "Attempting operation '{}' (attempt {}/{})",
            operation_name, attempt, config.max_attempts
        );

        match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    debug!("Operation '{operation_name}' succeeded on attempt {attempt}");
                }
                return Ok(result);
            }
            Err(error) => {
                warn!("Operation '{operation_name}' failed on attempt {attempt}: {error}");

                if !error.is_retryable() {
                    warn!("Error is not retryable, stopping attempts");
                    return Err(error);
                }

                last_error = Some(error);

                if attempt < config.max_attempts {
                    debug!("Waiting {:?} before next attempt", config.interval);
                    sleep(config.interval).await;
                }
            }
        }
    }

    let final_error = last_error.unwrap();
    warn!(
        "Operation '{}' failed after {} attempts: {}",
        operation_name, config.max_attempts, final_error
    );
    Err(final_error)
}
