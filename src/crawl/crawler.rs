//! Breadth-first crawler with a bounded pool of page workers

use super::fetch::PageFetcher;
use super::frontier::{Frontier, UrlFilter};
use crate::ingest::{IngestCoordinator, IngestError, PageOutcome, PageReport, SkipReason};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{error, info, info_span, warn, Instrument, Span};
use url::Url;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CrawlError {
    #[error(transparent)]
    Ingest(#[from] IngestError),
}

/// Totals for one crawl run
#[derive(Debug, Clone, Default, Serialize)]
pub struct CrawlReport {
    pub run_id: Uuid,
    pub pages_visited: usize,
    pub fetch_failures: usize,
    pub chains_ingested: usize,
    pub nodes_created: usize,
    pub edges_created: usize,
    pub not_taxon_pages: usize,
    pub wrong_kingdom: usize,
    pub invalid_chains: usize,
    /// Pages lost to non-fatal store errors
    pub page_errors: usize,
    /// Pages whose worker panicked
    pub worker_failures: usize,
}

impl CrawlReport {
    fn record(&mut self, outcome: &PageOutcome) {
        match outcome {
            PageOutcome::Ingested(upsert) => {
                self.chains_ingested += 1;
                self.nodes_created += upsert.nodes_created;
                self.edges_created += upsert.edges_created;
            }
            PageOutcome::Skipped(SkipReason::NotATaxonPage) => self.not_taxon_pages += 1,
            PageOutcome::Skipped(SkipReason::WrongKingdom(_)) => self.wrong_kingdom += 1,
            PageOutcome::Skipped(SkipReason::Invalid(_)) => self.invalid_chains += 1,
        }
    }
}

/// What a worker brings back from one URL
enum Visit {
    Processed(PageReport),
    FetchFailed,
    WorkerFailed,
}

/// Crawls outward from a seed, ingesting every page it visits
///
/// The frontier and visited set live in the coordinating loop; workers only
/// fetch and ingest. A store that becomes unavailable stops the whole run;
/// any other failure, a panicking worker included, costs only its page.
pub struct Crawler {
    fetcher: Arc<dyn PageFetcher>,
    coordinator: Arc<IngestCoordinator>,
    filter: UrlFilter,
    parallelism: usize,
}

impl Crawler {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        coordinator: Arc<IngestCoordinator>,
        filter: UrlFilter,
    ) -> Self {
        Self {
            fetcher,
            coordinator,
            filter,
            parallelism: 4,
        }
    }

    /// Set the number of pages processed concurrently (at least 1)
    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism.max(1);
        self
    }

    /// Crawl from `seed` until the frontier is exhausted
    pub async fn run(&self, seed: Url) -> Result<CrawlReport, CrawlError> {
        let run_id = Uuid::new_v4();
        let span = info_span!("crawl", %run_id);
        self.run_inner(run_id, seed).instrument(span).await
    }

    async fn run_inner(&self, run_id: Uuid, seed: Url) -> Result<CrawlReport, CrawlError> {
        info!(%seed, parallelism = self.parallelism, "crawl started");

        let mut report = CrawlReport {
            run_id,
            ..Default::default()
        };
        let mut frontier = Frontier::new(self.filter.clone());
        if !frontier.push(seed.clone(), 1) {
            warn!(%seed, "seed URL rejected by the frontier filters");
        }

        let mut workers: JoinSet<(u32, Result<Visit, IngestError>)> = JoinSet::new();

        loop {
            while workers.len() < self.parallelism {
                let Some((url, depth)) = frontier.pop() else {
                    break;
                };
                let fetcher = self.fetcher.clone();
                let coordinator = self.coordinator.clone();
                let span = info_span!("page", %url, depth);
                workers.spawn(
                    async move { (depth, visit(fetcher, coordinator, url).await) }.instrument(span),
                );
            }

            let Some(joined) = workers.join_next().await else {
                break;
            };
            report.pages_visited += 1;
            let (depth, outcome) = match joined {
                Ok(finished) => finished,
                Err(e) => {
                    warn!(error = %e, "page worker failed");
                    report.worker_failures += 1;
                    continue;
                }
            };

            match outcome {
                Ok(Visit::Processed(page)) => {
                    report.record(&page.outcome);
                    for link in page.links {
                        frontier.push(link, depth + 1);
                    }
                }
                Ok(Visit::FetchFailed) => report.fetch_failures += 1,
                Ok(Visit::WorkerFailed) => report.worker_failures += 1,
                Err(e) if !e.is_fatal() => {
                    warn!(error = %e, "page failed");
                    report.page_errors += 1;
                }
                Err(e) => {
                    error!(error = %e, "aborting crawl");
                    workers.abort_all();
                    return Err(e.into());
                }
            }
        }

        info!(
            pages = report.pages_visited,
            chains = report.chains_ingested,
            nodes_created = report.nodes_created,
            edges_created = report.edges_created,
            not_taxon = report.not_taxon_pages,
            wrong_kingdom = report.wrong_kingdom,
            invalid = report.invalid_chains,
            fetch_failures = report.fetch_failures,
            page_errors = report.page_errors,
            worker_failures = report.worker_failures,
            "crawl finished"
        );
        Ok(report)
    }
}

/// Fetch one page, then parse and ingest it on the blocking pool
async fn visit(
    fetcher: Arc<dyn PageFetcher>,
    coordinator: Arc<IngestCoordinator>,
    url: Url,
) -> Result<Visit, IngestError> {
    let fetched = match fetcher.fetch(&url).await {
        Ok(page) => page,
        Err(e) => {
            warn!(error = %e, "fetch failed");
            return Ok(Visit::FetchFailed);
        }
    };

    let span = Span::current();
    let processed = tokio::task::spawn_blocking(move || {
        let _entered = span.enter();
        coordinator.process_page(&fetched.body, fetched.url)
    })
    .await;

    match processed {
        Ok(report) => Ok(Visit::Processed(report?)),
        Err(e) => {
            warn!(error = %e, "page processing failed");
            Ok(Visit::WorkerFailed)
        }
    }
}
