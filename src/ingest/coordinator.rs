//! Per-page ingestion: extract → validate → upsert, with store retries

use super::upsert::{GraphUpserter, UpsertReport};
use super::validate::{validate_chain, ValidationError};
use super::IngestError;
use crate::extract::{biota_links, ChainExtractor, ExtractSignal, Page};
use crate::graph::{TaxonChain, ValidatedChain};
use crate::storage::{StorageErrorKind, TaxonStore};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Retry policy for store writes
#[derive(Debug, Clone)]
pub struct IngestSettings {
    /// Total attempts per chain, including the first (at least 1)
    pub max_attempts: u32,
    /// Delay before the first retry; doubles on each further retry
    pub retry_backoff: Duration,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            retry_backoff: Duration::from_millis(250),
        }
    }
}

/// Why a page contributed nothing to the graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The page had no unique classification table
    NotATaxonPage,
    /// The chain's kingdom is not the configured root
    WrongKingdom(String),
    /// The extracted chain failed validation
    Invalid(ValidationError),
}

impl From<ExtractSignal> for SkipReason {
    fn from(signal: ExtractSignal) -> Self {
        match signal {
            ExtractSignal::NotATaxonPage => SkipReason::NotATaxonPage,
            ExtractSignal::WrongKingdom(name) => SkipReason::WrongKingdom(name),
        }
    }
}

/// What happened to one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    /// A complete chain was written to the store
    Ingested(UpsertReport),
    /// Nothing was written
    Skipped(SkipReason),
}

/// Outcome of a page plus the links the crawl should follow from it
#[derive(Debug, Clone)]
pub struct PageReport {
    pub outcome: PageOutcome,
    pub links: Vec<Url>,
}

/// Runs the ingestion pipeline for single pages
///
/// Holds the extractor, the store and the retry policy explicitly; crawl
/// workers share one coordinator through an `Arc` and call it once per page.
pub struct IngestCoordinator {
    extractor: ChainExtractor,
    upserter: GraphUpserter,
    settings: IngestSettings,
}

impl IngestCoordinator {
    pub fn new(store: Arc<dyn TaxonStore>, root_kingdom: impl Into<String>) -> Self {
        Self {
            extractor: ChainExtractor::new(root_kingdom),
            upserter: GraphUpserter::new(store),
            settings: IngestSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: IngestSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn store(&self) -> &Arc<dyn TaxonStore> {
        self.upserter.store()
    }

    /// Process one fetched page.
    ///
    /// Pages whose chain reached Species are leaves, and pages that are off
    /// topic or carry no classification table are dead ends; every other
    /// page hands back its classification-table links. Only store failures
    /// are errors.
    pub fn process_page(&self, html: &str, url: Url) -> Result<PageReport, IngestError> {
        let page = Page::parse(html, url);

        let chain = match self.extractor.extract(&page) {
            Ok(chain) => chain,
            Err(signal) => {
                debug!(url = %page.url(), %signal, "page skipped");
                return Ok(PageReport {
                    outcome: PageOutcome::Skipped(signal.into()),
                    links: Vec::new(),
                });
            }
        };

        let links = if chain.reaches_species() {
            Vec::new()
        } else {
            biota_links(&page)
        };
        let outcome = self.ingest_chain(&chain)?;

        Ok(PageReport { outcome, links })
    }

    /// Validate and upsert an extracted chain.
    ///
    /// An invalid chain is skipped without touching the store.
    pub fn ingest_chain(&self, chain: &TaxonChain) -> Result<PageOutcome, IngestError> {
        let validated = match validate_chain(chain) {
            Ok(validated) => validated,
            Err(e) => {
                info!(entries = chain.len(), reason = %e, "chain discarded");
                return Ok(PageOutcome::Skipped(SkipReason::Invalid(e)));
            }
        };

        let report = self.upsert_with_retry(&validated)?;
        info!(
            species = %validated.species().name,
            species_id = ?report.species_id,
            nodes_created = report.nodes_created,
            edges_created = report.edges_created,
            "chain ingested"
        );
        Ok(PageOutcome::Ingested(report))
    }

    fn upsert_with_retry(&self, chain: &ValidatedChain) -> Result<UpsertReport, IngestError> {
        let max_attempts = self.settings.max_attempts.max(1);
        let mut backoff = self.settings.retry_backoff;
        let mut attempt = 1;

        loop {
            let err = match self.upserter.upsert(chain) {
                Ok(report) => return Ok(report),
                Err(err) => err,
            };

            match err.kind() {
                StorageErrorKind::Transient if attempt < max_attempts => {
                    warn!(attempt, max_attempts, error = %err, "store busy, retrying chain");
                    std::thread::sleep(backoff);
                    backoff = backoff.saturating_mul(2);
                    attempt += 1;
                }
                StorageErrorKind::Transient | StorageErrorKind::Unavailable => {
                    return Err(IngestError::StoreUnavailable {
                        attempts: attempt,
                        source: err,
                    });
                }
                StorageErrorKind::Other => return Err(IngestError::Storage(err)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{MembershipEdge, NodeUpsert, Rank, TaxonEntry, TaxonId, TaxonNode};
    use crate::storage::{
        ChainWriter, GraphStats, OpenStore, SqliteStore, StorageError, StorageResult,
    };
    use rusqlite::ffi;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Store that fails the first `failures` writes with the given code
    struct FlakyStore {
        inner: SqliteStore,
        failures: AtomicU32,
        code: std::os::raw::c_int,
    }

    impl FlakyStore {
        fn new(failures: u32, code: std::os::raw::c_int) -> Self {
            Self {
                inner: SqliteStore::open_in_memory("animal_kingdom").unwrap(),
                failures: AtomicU32::new(failures),
                code,
            }
        }

        /// Consume one injected failure, if any remain
        fn injected_failure(&self) -> StorageResult<()> {
            let remaining = self.failures.load(Ordering::SeqCst);
            if remaining > 0 {
                self.failures.store(remaining - 1, Ordering::SeqCst);
                return Err(StorageError::Database(rusqlite::Error::SqliteFailure(
                    ffi::Error::new(self.code),
                    None,
                )));
            }
            Ok(())
        }
    }

    impl TaxonStore for FlakyStore {
        fn graph_name(&self) -> &str {
            self.inner.graph_name()
        }

        fn get_or_create_node(&self, rank: Rank, name: &str, url: &str) -> StorageResult<NodeUpsert> {
            self.injected_failure()?;
            self.inner.get_or_create_node(rank, name, url)
        }

        fn load_node(&self, rank: Rank, id: TaxonId) -> StorageResult<Option<TaxonNode>> {
            self.inner.load_node(rank, id)
        }

        fn find_node(&self, rank: Rank, name: &str) -> StorageResult<Option<TaxonNode>> {
            self.inner.find_node(rank, name)
        }

        fn get_or_create_edge(&self, edge: &MembershipEdge) -> StorageResult<bool> {
            self.inner.get_or_create_edge(edge)
        }

        fn has_edge(&self, edge: &MembershipEdge) -> StorageResult<bool> {
            self.inner.has_edge(edge)
        }

        fn write_chain(
            &self,
            write: &mut dyn FnMut(&dyn ChainWriter) -> StorageResult<()>,
        ) -> StorageResult<()> {
            self.injected_failure()?;
            self.inner.write_chain(write)
        }

        fn inbound_neighbors(&self, rank: Rank, id: TaxonId) -> StorageResult<Vec<TaxonNode>> {
            self.inner.inbound_neighbors(rank, id)
        }

        fn stats(&self) -> StorageResult<GraphStats> {
            self.inner.stats()
        }
    }

    fn fast_settings() -> IngestSettings {
        IngestSettings {
            max_attempts: 3,
            retry_backoff: Duration::from_millis(1),
        }
    }

    fn eunice() -> TaxonChain {
        [
            ("Kingdom", "Animalia"),
            ("Phylum", "Annelida"),
            ("Class", "Polychaeta"),
            ("Order", "Eunicida"),
            ("Family", "Eunicidae"),
            ("Genus", "Eunice"),
            ("Species", "Eunice aphroditois"),
        ]
        .into_iter()
        .map(|(rank, name)| TaxonEntry::new(rank, name, ""))
        .collect()
    }

    fn coordinator(store: Arc<dyn TaxonStore>) -> IngestCoordinator {
        IngestCoordinator::new(store, "Animalia").with_settings(fast_settings())
    }

    #[test]
    fn test_busy_store_is_retried() {
        let store = Arc::new(FlakyStore::new(2, ffi::SQLITE_BUSY));
        let outcome = coordinator(store.clone()).ingest_chain(&eunice()).unwrap();

        assert!(matches!(outcome, PageOutcome::Ingested(_)));
        assert_eq!(store.stats().unwrap().total_nodes(), 7);
    }

    #[test]
    fn test_persistent_busy_is_store_unavailable() {
        let store = Arc::new(FlakyStore::new(10, ffi::SQLITE_BUSY));
        let err = coordinator(store).ingest_chain(&eunice()).unwrap_err();

        assert!(err.is_fatal());
        assert!(matches!(err, IngestError::StoreUnavailable { attempts: 3, .. }));
    }

    #[test]
    fn test_unreachable_store_aborts_without_retry() {
        let store = Arc::new(FlakyStore::new(1, ffi::SQLITE_CANTOPEN));
        let err = coordinator(store.clone()).ingest_chain(&eunice()).unwrap_err();

        assert!(matches!(err, IngestError::StoreUnavailable { attempts: 1, .. }));
        // The single failure was consumed by the one attempt
        assert_eq!(store.failures.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_other_store_error_is_page_scoped() {
        let store = Arc::new(FlakyStore::new(1, ffi::SQLITE_MISMATCH));
        let err = coordinator(store).ingest_chain(&eunice()).unwrap_err();
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_invalid_chain_writes_nothing() {
        let store: Arc<dyn TaxonStore> = Arc::new(SqliteStore::open_in_memory("animal_kingdom").unwrap());
        let mut chain = eunice();
        chain.entries.remove(4);

        let outcome = coordinator(store.clone()).ingest_chain(&chain).unwrap();
        assert_eq!(
            outcome,
            PageOutcome::Skipped(SkipReason::Invalid(ValidationError::MissingRank(Rank::Family)))
        );
        assert_eq!(store.stats().unwrap().total_nodes(), 0);
    }
}
