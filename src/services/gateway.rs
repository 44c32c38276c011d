/// Rate-limited request gateway
///
/// Every provider call made by the pipeline goes through `RateLimitedGateway::execute`.
/// Admission is governed by a sliding window of call timestamps: when the window is full the
/// caller sleeps until the oldest entry ages out, then re-checks. A 429 response is retried a
/// fixed number of times with a fixed backoff; every other error is returned as-is.
use std::collections::VecDeque;
use std::future::Future;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::error::AppResult;

/// Rate window and retry settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatewaySettings {
    pub max_requests: usize,
    pub window: Duration,
    pub max_retries: u32,
    pub retry_backoff: Duration,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            max_requests: 40,
            window: Duration::from_secs(10),
            max_retries: 3,
            retry_backoff: Duration::from_secs(2),
        }
    }
}

/// Sliding record of admitted request timestamps
#[derive(Debug)]
pub struct RateWindow {
    max_requests: usize,
    window: Duration,
    admitted: VecDeque<Instant>,
}

impl RateWindow {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests: max_requests.max(1),
            window,
            admitted: VecDeque::new(),
        }
    }

    /// Records a call at `now` if capacity allows
    ///
    /// On rejection returns how long until the oldest in-window entry ages out.
    pub fn try_admit(&mut self, now: Instant) -> Result<(), Duration> {
        while let Some(&oldest) = self.admitted.front() {
            if now.duration_since(oldest) >= self.window {
                self.admitted.pop_front();
            } else {
                break;
            }
        }

        if self.admitted.len() < self.max_requests {
            self.admitted.push_back(now);
            return Ok(());
        }

        let oldest = self.admitted.front().copied().unwrap_or(now);
        Err(self.window.saturating_sub(now.duration_since(oldest)))
    }

    /// Number of calls currently counted against the window
    pub fn in_flight(&self) -> usize {
        self.admitted.len()
    }
}

/// Throttles and retries calls to the metadata provider
#[derive(Debug)]
pub struct RateLimitedGateway {
    window: Mutex<RateWindow>,
    max_retries: u32,
    retry_backoff: Duration,
}

impl RateLimitedGateway {
    pub fn new(settings: GatewaySettings) -> Self {
        Self {
            window: Mutex::new(RateWindow::new(settings.max_requests, settings.window)),
            max_retries: settings.max_retries,
            retry_backoff: settings.retry_backoff,
        }
    }

    /// Suspends until the rate window admits one more call
    async fn admit(&self) {
        loop {
            let wait = {
                let mut window = self.window.lock().await;
                match window.try_admit(Instant::now()) {
                    Ok(()) => return,
                    Err(wait) => wait,
                }
            };

            tracing::debug!(
                wait_ms = wait.as_millis() as u64,
                "Rate window full, waiting"
            );
            tokio::time::sleep(wait).await;
        }
    }

    /// Runs `call` under the rate window, retrying 429 responses
    ///
    /// `operation` only labels log lines.
    pub async fn execute<T, F, Fut>(&self, operation: &str, mut call: F) -> AppResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        let mut retries_left = self.max_retries;

        loop {
            self.admit().await;

            match call().await {
                Err(e) if e.is_rate_limited() && retries_left > 0 => {
                    retries_left -= 1;
                    tracing::warn!(
                        operation = %operation,
                        retries_left = retries_left,
                        backoff_ms = self.retry_backoff.as_millis() as u64,
                        "Provider rate limit hit, backing off"
                    );
                    tokio::time::sleep(self.retry_backoff).await;
                }
                Err(e) => {
                    if e.is_rate_limited() {
                        tracing::error!(
                            operation = %operation,
                            "Provider rate limit retries exhausted"
                        );
                    }
                    return Err(e);
                }
                Ok(value) => return Ok(value),
            }
        }
    }

    /// Number of calls currently counted against the rate window
    pub async fn in_flight(&self) -> usize {
        self.window.lock().await.in_flight()
    }
}

impl Default for RateLimitedGateway {
    fn default() -> Self {
        Self::new(GatewaySettings::default())
    }
}
