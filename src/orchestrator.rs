use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::error::{ScrapeError, ScrapeErrorKind};
use crate::fetch::PageFetcher;
use crate::product::{Extractor, ProductRecord};
use crate::sink::RecordSink;

/// Runs one fetch → extract → save pipeline for `url`.
///
/// This is a single unit of work. Errors are returned rather than logged so
/// the function can also be used on its own; `Orchestrator` logs them.
pub async fn process_url(
    fetcher: &PageFetcher,
    extractor: &Extractor,
    sink: &dyn RecordSink,
    url: &str,
) -> Result<ProductRecord, ScrapeError> {
    info!("Starting the scraping process for URL: {url}");
    let body = fetcher.fetch(url).await?;
    let record = extractor.extract(&body, url)?;
    sink.save(&record).await?;
    info!("Product data for {url} saved successfully");
    Ok(record)
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
/// What happened to one URL of a run.
pub struct UrlOutcome {
    pub url: String,
    /// `None` when the record was saved.
    pub error: Option<ScrapeErrorKind>,
}

impl UrlOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Per-URL outcomes of a run, in input order.
pub struct RunReport {
    pub outcomes: Vec<UrlOutcome>,
}

impl RunReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    /// Number of URLs that failed with `kind`.
    pub fn failures_of(&self, kind: ScrapeErrorKind) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.error == Some(kind))
            .count()
    }
}

/// Scrapes a batch of URLs, one task per URL.
///
/// All tasks start right away (or as permits free up when a concurrency
/// limit is set) and `run` returns once every one of them has finished.
/// A failing URL is logged by its own task and never affects the others.
pub struct Orchestrator {
    fetcher: PageFetcher,
    extractor: Arc<Extractor>,
    sink: Arc<dyn RecordSink>,
    limit: Option<usize>,
}

impl Orchestrator {
    pub fn new(fetcher: PageFetcher, sink: Arc<dyn RecordSink>) -> Self {
        Self {
            fetcher,
            extractor: Arc::new(Extractor::new()),
            sink,
            limit: None,
        }
    }

    /// Caps how many units may run at the same time. `None` is unbounded.
    pub fn with_concurrency_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit.map(|n| n.max(1));
        self
    }

    /// Scrapes every URL and waits for all of them. Failures only show up in
    /// the log.
    pub async fn run<I, S>(&self, urls: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let report = self.run_with_report(urls).await;
        info!(
            "Scraping finished: {} saved, {} failed",
            report.succeeded(),
            report.failed()
        );
    }

    /// Same as `run`, but also returns what happened to each URL.
    pub async fn run_with_report<I, S>(&self, urls: I) -> RunReport
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let semaphore = self.limit.map(|n| Arc::new(Semaphore::new(n)));

        let units: Vec<(String, JoinHandle<Option<ScrapeErrorKind>>)> = urls
            .into_iter()
            .map(Into::into)
            .map(|url: String| {
                let handle = self.spawn_unit(url.clone(), semaphore.clone());
                info!("Started scraping task for URL: {url}");
                (url, handle)
            })
            .collect();

        let mut report = RunReport::default();
        for (url, handle) in units {
            let error = match handle.await {
                Ok(error) => error,
                Err(join_error) => {
                    error!("UnexpectedError while processing {url}: task failed: {join_error}");
                    Some(ScrapeErrorKind::Unexpected)
                }
            };
            info!("Task for URL completed: {url}");
            report.outcomes.push(UrlOutcome { url, error });
        }
        report
    }

    fn spawn_unit(
        &self,
        url: String,
        semaphore: Option<Arc<Semaphore>>,
    ) -> JoinHandle<Option<ScrapeErrorKind>> {
        let fetcher = self.fetcher.clone();
        let extractor = Arc::clone(&self.extractor);
        let sink = Arc::clone(&self.sink);

        tokio::spawn(async move {
            let _permit = match semaphore {
                Some(semaphore) => match semaphore.acquire_owned().await {
                    Ok(permit) => Some(permit),
                    Err(e) => {
                        error!("UnexpectedError while processing {url}: {e}");
                        return Some(ScrapeErrorKind::Unexpected);
                    }
                },
                None => None,
            };

            match process_url(&fetcher, &extractor, sink.as_ref(), &url).await {
                Ok(_) => None,
                Err(e) => {
                    let kind = e.kind();
                    error!("{kind} while processing {url}: {e}");
                    Some(kind)
                }
            }
        })
    }
}
