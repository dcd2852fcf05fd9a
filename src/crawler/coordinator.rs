//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop, which for every cursor:
//! - Loads the page from the store if it was saved by an earlier run
//! - Otherwise fetches it, aborting on any non-200 response
//! - Saves a fetched page before doing anything else with it
//! - Decides from the page content whether to continue
//! - Waits out the rate limit before the next fetch

use crate::config::Config;
use crate::crawler::fetcher::{build_http_client, Fetcher};
use crate::crawler::rate_limit::{RateLimitReading, RateLimiter, WaitInstruction};
use crate::crawler::request::RequestTemplate;
use crate::state::{CrawlState, Cursor, StopReason, Verdict};
use crate::storage::{open_store, FileStore, PageStore};
use crate::timeline::{Page, PageError};
use crate::TimelineError;
use chrono::Utc;

/// Outcome of a completed crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlSummary {
    /// Cursor of the last page processed
    pub final_cursor: Cursor,

    /// Why the crawl stopped
    pub stop_reason: StopReason,

    /// Pages fetched over the network
    pub pages_fetched: u32,

    /// Pages loaded from the store
    pub pages_loaded: u32,
}

/// Main crawler coordinator structure
pub struct Coordinator<S: PageStore = FileStore> {
    template: RequestTemplate,
    fetcher: Fetcher,
    rate_limiter: RateLimiter,
    store: S,
    state: CrawlState,
}

impl Coordinator<FileStore> {
    /// Creates a coordinator from configuration
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `start` - Cursor to start from (`Cursor::Initial` for the newest page)
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(TimelineError)` - Invalid template, client or output directory
    pub fn new(config: &Config, start: Cursor) -> Result<Self, TimelineError> {
        let template = RequestTemplate::from_config(&config.request)?;
        let client = build_http_client(&config.crawl)?;
        let fetcher = Fetcher::new(client, config.crawl.retry_delays());
        let rate_limiter = RateLimiter::new(config.crawl.politeness_interval());
        let store = open_store(&config.output)?;
        let state = CrawlState::new(
            start,
            config.crawl.effective_cutoff_year(),
            store.root().to_path_buf(),
        );

        Ok(Self::with_parts(template, fetcher, rate_limiter, store, state))
    }
}

impl<S: PageStore> Coordinator<S> {
    /// Assembles a coordinator from already-built components
    pub fn with_parts(
        template: RequestTemplate,
        fetcher: Fetcher,
        rate_limiter: RateLimiter,
        store: S,
        state: CrawlState,
    ) -> Self {
        Self {
            template,
            fetcher,
            rate_limiter,
            store,
            state,
        }
    }

    pub fn state(&self) -> &CrawlState {
        &self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Runs the crawl loop until the timeline is done
    ///
    /// Pages are processed strictly one at a time; the next page is never
    /// requested before the current one is saved and evaluated.
    pub async fn run(&mut self) -> Result<CrawlSummary, TimelineError> {
        tracing::info!(
            "Starting crawl at cursor {} (cutoff year {}, storing in {})",
            self.state.cursor,
            self.state.cutoff_year,
            self.state.storage_root.display()
        );

        while !self.state.is_done() {
            self.step().await?;
        }

        let summary = CrawlSummary {
            final_cursor: self.state.cursor.clone(),
            stop_reason: self
                .state
                .stop_reason()
                .unwrap_or(StopReason::TimelineExhausted),
            pages_fetched: self.state.pages_fetched(),
            pages_loaded: self.state.pages_loaded(),
        };

        tracing::info!(
            "Crawl finished: {} ({} fetched, {} loaded from disk)",
            summary.stop_reason,
            summary.pages_fetched,
            summary.pages_loaded
        );

        Ok(summary)
    }

    /// Processes the page at the current cursor
    pub async fn step(&mut self) -> Result<(), TimelineError> {
        let cursor = self.state.cursor.clone();
        tracing::info!("Cursor: {}", cursor);

        if self.store.exists(&cursor) {
            return self.resume_from_store(cursor);
        }

        self.state.begin_fetch()?;
        let target = self.template.build(&cursor);
        tracing::info!("Fetching cursor {}", cursor);
        tracing::debug!("GET {}", target.url);

        let response = self.fetcher.fetch(&target, &cursor).await?;
        if !response.is_ok() {
            tracing::error!(
                "Error response code {} for cursor {}",
                response.status,
                cursor
            );
            return Err(TimelineError::UnexpectedStatus {
                cursor: cursor.to_string(),
                status: response.status,
            });
        }

        let reading = RateLimitReading::from_headers(&response.headers, Utc::now());
        let page = Page::parse(cursor.clone(), response.body).map_err(|e| page_error(&cursor, e))?;
        self.state.fetched()?;

        // The page must be on disk before the wait so an interrupted run loses nothing
        let path = self.store.save(&cursor, page.body())?;
        tracing::info!("Saved {}", path.display());
        self.state.persisted()?;

        let verdict = self.evaluate(&page);
        let stopping = matches!(verdict, Verdict::Stop(_));
        self.state.advance(verdict, false)?;
        if stopping {
            return Ok(());
        }

        tracing::info!("Rate limit: {}", reading);
        let wait = self.rate_limiter.wait_for(&reading, Utc::now());
        match wait {
            WaitInstruction::UntilReset(d) => tracing::info!(
                "Rate limit exhausted, sleeping until {} ({:.1}s)",
                reading.reset_at.to_rfc3339(),
                d.as_secs_f64()
            ),
            WaitInstruction::Politeness(d) => tracing::debug!("Sleeping {:?}", d),
        }
        tokio::time::sleep(wait.duration()).await;

        self.state.waited()
    }

    /// Handles a cursor whose page an earlier run already saved
    ///
    /// No request is made and no rate-limit wait applies.
    fn resume_from_store(&mut self, cursor: Cursor) -> Result<(), TimelineError> {
        tracing::info!("Already fetched {}", cursor);
        let body = self.store.load(&cursor)?;
        let page = Page::parse(cursor.clone(), body).map_err(|e| page_error(&cursor, e))?;
        self.state.load_cached()?;

        let verdict = self.evaluate(&page);
        self.state.advance(verdict, true)
    }

    fn evaluate(&self, page: &Page) -> Verdict {
        match page.oldest_tweet_created_at() {
            Some(oldest) => tracing::info!("Oldest tweet: {}", oldest),
            None => tracing::info!("No tweets on page"),
        }

        let verdict = page.verdict(self.state.cutoff_year);
        match &verdict {
            Verdict::Continue(next) => tracing::info!("Next cursor: {}", next),
            Verdict::Stop(reason) => tracing::info!("Stopping: {}", reason),
        }
        verdict
    }
}

fn page_error(cursor: &Cursor, source: PageError) -> TimelineError {
    tracing::error!("Unusable page for cursor {}: {}", cursor, source);
    TimelineError::Page {
        cursor: cursor.to_string(),
        source,
    }
}
