//! Page fetcher with cache busting and retry/backoff

use async_trait::async_trait;
use reqwest::header::{CACHE_CONTROL, PRAGMA, RETRY_AFTER, USER_AGENT};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::common::errors::{ClientError, Result};
use crate::common::traits::PageSource;
use crate::common::types::FetchedPage;
use crate::config::types::AppSettings;

/// Retry behaviour for page fetches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first failed attempt; 429 responses never consume one
    pub max_retries: u32,
    /// Wait before retrying a transient failure
    pub retry_delay: Duration,
    /// Wait after a 429 response
    pub rate_limit_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay: Duration::from_secs(5),
            rate_limit_delay: Duration::from_secs(2 * 60),
        }
    }
}

impl From<&AppSettings> for RetryPolicy {
    fn from(settings: &AppSettings) -> Self {
        Self {
            max_retries: settings.max_retries,
            retry_delay: Duration::from_millis(settings.retry_delay_ms),
            rate_limit_delay: Duration::from_millis(settings.rate_limit_delay_ms),
        }
    }
}

/// HTTP page fetcher
#[derive(Debug, Clone)]
pub struct PageFetcher {
    /// HTTP client
    client: Client,
    /// Retry/backoff configuration
    policy: RetryPolicy,
    /// User-Agent header value
    user_agent: String,
}

impl PageFetcher {
    /// Create a fetcher with the default policy and a 30s request timeout
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(30))
    }

    /// Create a fetcher with a custom request timeout
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Internal(e.to_string()))?;

        Ok(Self {
            client,
            policy: RetryPolicy::default(),
            user_agent: "Mozilla/5.0".to_string(),
        })
    }

    /// Build a fetcher from application settings
    pub fn from_settings(settings: &AppSettings) -> Result<Self> {
        Ok(Self::with_timeout(settings.request_timeout())?
            .with_policy(RetryPolicy::from(settings))
            .with_user_agent(settings.user_agent.clone()))
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Fetch a page, retrying until it succeeds or the retry budget runs out
    ///
    /// A 429 waits `rate_limit_delay` and retries without touching the
    /// budget, so a host that keeps rate limiting is retried indefinitely.
    #[instrument(skip(self))]
    pub async fn fetch_page(&self, url: &str) -> Result<FetchedPage> {
        let base = Url::parse(url)?;

        let mut retries_left = self.policy.max_retries;
        let mut attempts = 0u32;
        let mut waited = Duration::ZERO;

        loop {
            attempts += 1;
            let err = match self.fetch_once(&base).await {
                Ok(body) => {
                    return Ok(FetchedPage {
                        body,
                        attempts,
                        waited,
                    })
                }
                Err(e) => e,
            };

            let delay = match err {
                ClientError::RateLimit {
                    retry_after_seconds,
                    ..
                } => {
                    warn!(
                        retry_after = ?retry_after_seconds,
                        "429 Too Many Requests for {}. Waiting {:?}...",
                        url,
                        self.policy.rate_limit_delay
                    );
                    self.policy.rate_limit_delay
                }
                e if e.is_transient() && retries_left > 0 => {
                    warn!(
                        "Failed to fetch {}, retries left: {}. Error: {}",
                        url, retries_left, e
                    );
                    retries_left -= 1;
                    self.policy.retry_delay
                }
                e => {
                    return Err(ClientError::FetchExhausted {
                        url: url.to_string(),
                        last_error: e.to_string(),
                    })
                }
            };

            sleep(delay).await;
            waited += delay;
        }
    }

    /// Single GET with cache-busting query and no-cache headers
    async fn fetch_once(&self, base: &Url) -> Result<String> {
        let url = cache_busted(base, chrono::Utc::now().timestamp_millis());
        debug!("Fetching page: {}", url);

        let response = self
            .client
            .get(url)
            .header(CACHE_CONTROL, "no-cache")
            .header(PRAGMA, "no-cache")
            .header(USER_AGENT, &self.user_agent)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_seconds = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok());
            return Err(ClientError::RateLimit {
                url: base.to_string(),
                retry_after_seconds,
            });
        }

        if !status.is_success() {
            return Err(ClientError::InvalidResponse(format!(
                "Server returned status {}",
                status
            )));
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl PageSource for PageFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        self.fetch_page(url).await
    }
}

/// Append the `_=<millis>` cache buster, keeping any existing query
pub fn cache_busted(base: &Url, millis: i64) -> Url {
    let mut url = base.clone();
    url.query_pairs_mut().append_pair("_", &millis.to_string());
    url
}
