use crate::{error::Error, event::EventPayload};
use reqwest::Client;
use std::time::Duration;

const MAX_ATTEMPTS: u32 = 3;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_BACKOFF_UNIT: Duration = Duration::from_secs(1);

/// Linear backoff: the nth failed attempt waits n backoff units.
pub fn backoff_delay(attempt: u32, unit: Duration) -> Duration {
    unit * attempt
}

/// Posts event payloads to the configured listener. Transport failures and
/// HTTP errors (>= 400) are retried identically up to the attempt bound;
/// there is no per-status handling.
pub struct Dispatcher {
    client: Client,
    url: String,
    backoff_unit: Duration,
}

impl Dispatcher {
    pub fn new(url: impl Into<String>) -> Result<Self, Error> {
        Self::with_backoff_unit(url, DEFAULT_BACKOFF_UNIT)
    }

    /// The backoff unit is injectable so retry behavior is testable
    /// without real one-second sleeps.
    pub fn with_backoff_unit(url: impl Into<String>, backoff_unit: Duration) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|cause| Error::Transport {
                operation: "build notification client",
                cause,
            })?;

        Ok(Dispatcher {
            client,
            url: url.into(),
            backoff_unit,
        })
    }

    pub async fn send(&self, payload: &EventPayload) -> Result<(), Error> {
        let mut last_error = String::new();

        for attempt in 1..=MAX_ATTEMPTS {
            match self.attempt(payload).await {
                Ok(()) => {
                    if attempt > 1 {
                        log::info!("event delivered on attempt {}/{}", attempt, MAX_ATTEMPTS);
                    }
                    return Ok(());
                }
                Err(message) => {
                    log::warn!(
                        "notification attempt {}/{} failed: {}",
                        attempt,
                        MAX_ATTEMPTS,
                        message
                    );
                    last_error = message;
                    tokio::time::sleep(backoff_delay(attempt, self.backoff_unit)).await;
                }
            }
        }

        Err(Error::Delivery {
            attempts: MAX_ATTEMPTS,
            last_error,
        })
    }

    async fn attempt(&self, payload: &EventPayload) -> Result<(), String> {
        let response = self
            .client
            .post(&self.url)
            .json(payload)
            .send()
            .await
            .map_err(|cause| cause.to_string())?;

        let status = response.status();
        if status.as_u16() >= 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(format!("event listener returned {}: {}", status, body));
        }

        Ok(())
    }
}
