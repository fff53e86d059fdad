//! Poll loop: fetch pages, find new inspect links, look up floats, notify
//!
//! # Flow
//!
//! ```text
//! ticker ──► for each page ──► PageSource::fetch ──► extract_inspect_links
//!                                                          │
//!                                       filter against SeenLinks, keep first N
//!                                                          │
//!                                   claim ──► FloatLookup::lookup ──► float <= max?
//!                                                                          │
//!                                                                 Notifier::notify
//! ```
//!
//! Everything runs sequentially on one task. Failures are contained at the
//! smallest scope that makes sense: one link, one page, one tick.

pub mod seen;

use futures_util::FutureExt;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::common::errors::Result;
use crate::common::traits::{BoxedFloatLookup, BoxedNotifier, BoxedPageSource};
use crate::common::types::TickReport;
use crate::config::types::{AppConfig, PageConfig};
use crate::float::FloatApiClient;
use crate::notify::DiscordNotifier;
use crate::steam::{extract_inspect_links, PageFetcher};

pub use seen::SeenLinks;

/// Default number of new links looked up per page per tick
pub const DEFAULT_MAX_LINKS_PER_PAGE: usize = 10;

/// Periodic scrape-enrich-notify loop
pub struct Poller {
    source: BoxedPageSource,
    lookup: BoxedFloatLookup,
    notifier: BoxedNotifier,
    pages: Vec<PageConfig>,
    interval: Duration,
    max_links_per_page: usize,
}

impl Poller {
    /// Create a poller over the given stages with a 60s interval
    pub fn new(
        source: BoxedPageSource,
        lookup: BoxedFloatLookup,
        notifier: BoxedNotifier,
        pages: Vec<PageConfig>,
    ) -> Self {
        Self {
            source,
            lookup,
            notifier,
            pages,
            interval: Duration::from_secs(60),
            max_links_per_page: DEFAULT_MAX_LINKS_PER_PAGE,
        }
    }

    /// Wire up the HTTP-backed stages described by `config`
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let timeout = config.settings.request_timeout();
        let fetcher = PageFetcher::from_settings(&config.settings)?;
        let lookup = FloatApiClient::with_timeout(&config.float_api_url, timeout)?;
        let notifier = DiscordNotifier::with_timeout(&config.discord_webhook, timeout)?;

        Ok(Self::new(
            Box::new(fetcher),
            Box::new(lookup),
            Box::new(notifier),
            config.pages.clone(),
        )
        .with_interval(config.check_interval())
        .with_max_links_per_page(config.settings.max_links_per_page))
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_max_links_per_page(mut self, max: usize) -> Self {
        self.max_links_per_page = max;
        self
    }

    /// Tick until `shutdown` is cancelled, then hand back the seen links
    ///
    /// The first tick fires immediately. Ticks never overlap: a slow tick
    /// pushes the next one back instead of stacking up. Cancelling during
    /// a tick abandons it.
    pub async fn run(&self, shutdown: CancellationToken) -> SeenLinks {
        let mut seen = SeenLinks::new();
        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            pages = self.pages.len(),
            interval_secs = self.interval.as_secs(),
            "Starting poll loop"
        );

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let tick = AssertUnwindSafe(self.check_pages(&mut seen)).catch_unwind();
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    info!("Shutdown requested, abandoning in-flight tick");
                    break;
                }
                result = tick => match result {
                    Ok(report) => debug!(?report, "Tick finished"),
                    Err(_) => error!("Unexpected panic during tick, continuing"),
                },
            }
        }

        info!(seen = seen.len(), "Poll loop stopped");
        seen
    }

    /// One pass over every configured page
    pub async fn check_pages(&self, seen: &mut SeenLinks) -> TickReport {
        let mut report = TickReport::default();

        for page in &self.pages {
            match self.process_page(page, seen).await {
                Ok(page_report) => report.absorb(page_report),
                Err(e) => {
                    error!("Skipping page {} due to fetch errors: {}", page.url, e);
                    report.pages_skipped += 1;
                }
            }
        }

        info!(
            scanned = report.pages_scanned,
            skipped = report.pages_skipped,
            checked = report.links_checked,
            notified = report.notifications_sent,
            "Checked all pages"
        );
        report
    }

    #[instrument(skip(self, page, seen), fields(url = %page.url))]
    async fn process_page(&self, page: &PageConfig, seen: &mut SeenLinks) -> Result<TickReport> {
        let fetched = self.source.fetch(&page.url).await?;
        let links = extract_inspect_links(&fetched.body);

        let mut report = TickReport {
            pages_scanned: 1,
            links_found: links.len(),
            ..Default::default()
        };
        info!("Found {} unique links on {}", links.len(), page.url);

        let fresh = seen.unseen(&links);
        if fresh.is_empty() {
            info!("No new links found for {}", page.url);
            return Ok(report);
        }
        if fresh.len() > self.max_links_per_page {
            debug!(
                deferred = fresh.len() - self.max_links_per_page,
                "Deferring new links to a later tick"
            );
        }

        for link in fresh.into_iter().take(self.max_links_per_page) {
            seen.insert(link);
            report.links_checked += 1;

            let info = match self.lookup.lookup(link).await {
                Ok(Some(info)) => info,
                Ok(None) => {
                    debug!("No item info for {}", link);
                    report.lookups_failed += 1;
                    continue;
                }
                Err(e) => {
                    warn!("{}", e);
                    report.lookups_failed += 1;
                    continue;
                }
            };

            if !info.is_under(page.max_float) {
                debug!(
                    "{} float {} above threshold {}",
                    info.full_item_name, info.floatvalue, page.max_float
                );
                continue;
            }

            match self.notifier.notify(&info).await {
                Ok(()) => report.notifications_sent += 1,
                Err(e) => {
                    error!(
                        "Failed to notify Discord for {}: {}",
                        info.full_item_name, e
                    );
                    report.notifications_failed += 1;
                }
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::errors::ClientError;
    use crate::common::traits::{MockFloatLookup, MockNotifier, MockPageSource, PageSource};
    use crate::common::types::{FetchedPage, ItemInfo};
    use crate::steam::INSPECT_LINK_PREFIX;
    use async_trait::async_trait;
    use mockall::predicate::eq;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    const PAGE: &str = "https://market.example/page";

    fn link(n: usize) -> String {
        format!("{}%20M{}A{}D7", INSPECT_LINK_PREFIX, n, n * 11)
    }

    fn page_html(links: &[String]) -> String {
        let anchors: String = links
            .iter()
            .map(|l| format!(r#"<a href="{}">Inspect in Game...</a>"#, l))
            .collect();
        format!("<html><body>{}</body></html>", anchors)
    }

    fn fetched(body: String) -> FetchedPage {
        FetchedPage {
            body,
            attempts: 1,
            waited: Duration::ZERO,
        }
    }

    fn source_serving(links: Vec<String>) -> MockPageSource {
        let mut source = MockPageSource::new();
        source
            .expect_fetch()
            .returning(move |_| Ok(fetched(page_html(&links))));
        source
    }

    fn poller(
        source: MockPageSource,
        lookup: MockFloatLookup,
        notifier: MockNotifier,
        max_float: f64,
    ) -> Poller {
        Poller::new(
            Box::new(source),
            Box::new(lookup),
            Box::new(notifier),
            vec![PageConfig::new(PAGE, max_float)],
        )
    }

    #[tokio::test]
    async fn test_seen_links_are_never_looked_up_again() {
        let links = vec![link(1), link(2)];
        let mut lookup = MockFloatLookup::new();
        lookup
            .expect_lookup()
            .times(2)
            .returning(|_| Ok(Some(ItemInfo::new("P250 | Sand Dune (Factory New)", 0.5))));
        let mut notifier = MockNotifier::new();
        notifier.expect_notify().never();

        let poller = poller(source_serving(links), lookup, notifier, 0.01);
        let mut seen = SeenLinks::new();

        let first = poller.check_pages(&mut seen).await;
        let second = poller.check_pages(&mut seen).await;

        assert_eq!(first.links_checked, 2);
        assert_eq!(second.links_checked, 0);
        assert_eq!(second.links_found, 2);
        assert_eq!(seen.len(), 2);
    }

    #[tokio::test]
    async fn test_new_links_capped_per_tick() {
        let links: Vec<String> = (0..13).map(link).collect();
        let mut lookup = MockFloatLookup::new();
        lookup.expect_lookup().times(13).returning(|_| Ok(None));

        let poller = poller(source_serving(links.clone()), lookup, MockNotifier::new(), 0.1);
        let mut seen = SeenLinks::new();

        let first = poller.check_pages(&mut seen).await;
        assert_eq!(first.links_checked, 10);
        assert_eq!(seen.len(), 10);
        for l in &links[..10] {
            assert!(seen.contains(l));
        }
        for l in &links[10..] {
            assert!(!seen.contains(l));
        }

        let second = poller.check_pages(&mut seen).await;
        assert_eq!(second.links_checked, 3);
        assert_eq!(seen.len(), 13);
    }

    #[tokio::test]
    async fn test_custom_link_cap() {
        let links: Vec<String> = (0..5).map(link).collect();
        let mut lookup = MockFloatLookup::new();
        lookup.expect_lookup().times(2).returning(|_| Ok(None));

        let poller = poller(source_serving(links), lookup, MockNotifier::new(), 0.1)
            .with_max_links_per_page(2);
        let report = poller.check_pages(&mut SeenLinks::new()).await;
        assert_eq!(report.links_checked, 2);
    }

    #[tokio::test]
    async fn test_threshold_boundary_is_inclusive() {
        let max_float = 0.07;
        let at = link(1);
        let above = link(2);

        let mut lookup = MockFloatLookup::new();
        let (at_match, above_match) = (at.clone(), above.clone());
        lookup
            .expect_lookup()
            .withf(move |l| l == at_match)
            .returning(move |_| Ok(Some(ItemInfo::new("M4A4 | Howl (Minimal Wear)", max_float))));
        lookup
            .expect_lookup()
            .withf(move |l| l == above_match)
            .returning(move |_| {
                Ok(Some(ItemInfo::new(
                    "AWP | Dragon Lore (Minimal Wear)",
                    max_float + 1e-9,
                )))
            });

        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .withf(|item| item.full_item_name == "M4A4 | Howl (Minimal Wear)")
            .times(1)
            .returning(|_| Ok(()));

        let poller = poller(source_serving(vec![at, above]), lookup, notifier, max_float);
        let report = poller.check_pages(&mut SeenLinks::new()).await;
        assert_eq!(report.notifications_sent, 1);
    }

    #[tokio::test]
    async fn test_lookup_failure_marks_seen_and_continues() {
        let failing = link(1);
        let missing = link(2);
        let good = link(3);

        let mut lookup = MockFloatLookup::new();
        let (failing_match, missing_match, good_match) =
            (failing.clone(), missing.clone(), good.clone());
        let failing_clone = failing.clone();
        lookup
            .expect_lookup()
            .withf(move |l| l == failing_match)
            .times(1)
            .returning(move |_| {
                Err(ClientError::Lookup {
                    link: failing_clone.clone(),
                    message: "connection refused".to_string(),
                })
            });
        lookup
            .expect_lookup()
            .withf(move |l| l == missing_match)
            .times(1)
            .returning(|_| Ok(None));
        lookup
            .expect_lookup()
            .withf(move |l| l == good_match)
            .times(1)
            .returning(|_| Ok(Some(ItemInfo::new("Glock-18 | Fade (Factory New)", 0.01))));

        let mut notifier = MockNotifier::new();
        notifier.expect_notify().times(1).returning(|_| Ok(()));

        let poller = poller(
            source_serving(vec![failing.clone(), missing.clone(), good.clone()]),
            lookup,
            notifier,
            0.05,
        );
        let mut seen = SeenLinks::new();
        let report = poller.check_pages(&mut seen).await;

        assert_eq!(report.links_checked, 3);
        assert_eq!(report.lookups_failed, 2);
        assert_eq!(report.notifications_sent, 1);
        assert!(seen.contains(&failing));
        assert!(seen.contains(&missing));
        assert!(seen.contains(&good));
    }

    #[tokio::test]
    async fn test_fetch_failure_skips_only_that_page() {
        let mut source = MockPageSource::new();
        source
            .expect_fetch()
            .with(eq("https://down.example/"))
            .returning(|url| {
                Err(ClientError::FetchExhausted {
                    url: url.to_string(),
                    last_error: "Server returned status 503 Service Unavailable".to_string(),
                })
            });
        source
            .expect_fetch()
            .with(eq(PAGE))
            .returning(|_| Ok(fetched(page_html(&[link(1)]))));

        let mut lookup = MockFloatLookup::new();
        lookup
            .expect_lookup()
            .times(1)
            .returning(|_| Ok(Some(ItemInfo::new("USP-S | Kill Confirmed (Factory New)", 0.02))));
        let mut notifier = MockNotifier::new();
        notifier.expect_notify().times(1).returning(|_| Ok(()));

        let poller = Poller::new(
            Box::new(source),
            Box::new(lookup),
            Box::new(notifier),
            vec![
                PageConfig::new("https://down.example/", 0.1),
                PageConfig::new(PAGE, 0.1),
            ],
        );
        let report = poller.check_pages(&mut SeenLinks::new()).await;

        assert_eq!(report.pages_skipped, 1);
        assert_eq!(report.pages_scanned, 1);
        assert_eq!(report.notifications_sent, 1);
    }

    #[tokio::test]
    async fn test_notify_failure_does_not_stop_page() {
        let mut lookup = MockFloatLookup::new();
        lookup
            .expect_lookup()
            .times(2)
            .returning(|_| Ok(Some(ItemInfo::new("Karambit | Doppler (Factory New)", 0.001))));
        let mut notifier = MockNotifier::new();
        let mut calls = 0;
        notifier.expect_notify().times(2).returning(move |_| {
            calls += 1;
            if calls == 1 {
                Err(ClientError::Notify("Webhook returned status 500".to_string()))
            } else {
                Ok(())
            }
        });

        let poller = poller(source_serving(vec![link(1), link(2)]), lookup, notifier, 0.01);
        let report = poller.check_pages(&mut SeenLinks::new()).await;
        assert_eq!(report.notifications_failed, 1);
        assert_eq!(report.notifications_sent, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_ticks_until_cancelled() {
        let mut source = MockPageSource::new();
        source
            .expect_fetch()
            .times(3)
            .returning(|_| Ok(fetched(page_html(&[link(1)]))));
        let mut lookup = MockFloatLookup::new();
        lookup.expect_lookup().times(1).returning(|_| Ok(None));

        let poller = poller(source, lookup, MockNotifier::new(), 0.1)
            .with_interval(Duration::from_secs(60));

        let shutdown = CancellationToken::new();
        let stopper = shutdown.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(150)).await;
            stopper.cancel();
        });

        let seen = poller.run(shutdown).await;
        assert_eq!(seen.len(), 1);
        assert!(seen.contains(&link(1)));
    }

    /// Panics on its first fetch, serves one link afterwards.
    /// Hand-written since a panic poisons a mockall expectation.
    struct PanicsOnceSource {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl PageSource for PanicsOnceSource {
        async fn fetch(&self, _url: &str) -> Result<FetchedPage> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                panic!("page source exploded");
            }
            Ok(fetched(page_html(&[link(1)])))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_survives_panicking_tick() {
        let calls = Arc::new(AtomicUsize::new(0));
        let source = PanicsOnceSource {
            calls: calls.clone(),
        };
        let mut lookup = MockFloatLookup::new();
        lookup.expect_lookup().times(1).returning(|_| Ok(None));

        let poller = Poller::new(
            Box::new(source),
            Box::new(lookup),
            Box::new(MockNotifier::new()),
            vec![PageConfig::new(PAGE, 0.1)],
        )
        .with_interval(Duration::from_secs(60));

        let shutdown = CancellationToken::new();
        let stopper = shutdown.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(150)).await;
            stopper.cancel();
        });

        let seen = poller.run(shutdown).await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(seen.contains(&link(1)));
    }

    #[tokio::test]
    async fn test_run_returns_immediately_when_already_cancelled() {
        let mut source = MockPageSource::new();
        source.expect_fetch().never();

        let poller = poller(source, MockFloatLookup::new(), MockNotifier::new(), 0.1);
        let shutdown = CancellationToken::new();
        shutdown.cancel();

        let seen = poller.run(shutdown).await;
        assert!(seen.is_empty());
    }
}
