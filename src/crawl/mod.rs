//! Crawling: walk classification-table links and ingest every page
//!
//! `Crawler` owns the frontier and a bounded set of workers. Each worker
//! fetches one page through a `PageFetcher` and hands the body to the
//! shared `IngestCoordinator`.

mod crawler;
mod fetch;
mod frontier;

pub use crawler::{CrawlError, CrawlReport, Crawler};
pub use fetch::{FetchError, FetchedPage, HttpFetcher, PageFetcher};
pub use frontier::{Frontier, UrlFilter};
