//! Store and fetcher doubles

use async_trait::async_trait;
use rusqlite::ffi;
use std::collections::HashMap;
use std::sync::Mutex;
use taxograph::crawl::{FetchError, FetchedPage};
use taxograph::{
    ChainWriter, GraphStats, MembershipEdge, NodeUpsert, OpenStore, PageFetcher, Rank,
    SqliteStore, StorageError, StorageResult, TaxonId, TaxonNode, TaxonStore,
};
use url::Url;

/// Serves canned pages by URL; anything else is a 404
#[derive(Default)]
pub struct StubFetcher {
    pages: HashMap<String, String>,
    fetched: Mutex<Vec<String>>,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: Url, html: String) -> Self {
        self.pages.insert(url.to_string(), html);
        self
    }

    /// Every URL requested so far, in request order
    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for StubFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        self.fetched.lock().unwrap().push(url.to_string());
        match self.pages.get(url.as_str()) {
            Some(body) => Ok(FetchedPage {
                url: url.clone(),
                body: body.clone(),
            }),
            None => Err(FetchError::Status(404)),
        }
    }
}

/// Delegates to a `StubFetcher` but panics when asked for `panic_on`
pub struct PanickingFetcher {
    pub inner: StubFetcher,
    pub panic_on: Url,
}

#[async_trait]
impl PageFetcher for PanickingFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        if *url == self.panic_on {
            panic!("fetcher blew up on {url}");
        }
        self.inner.fetch(url).await
    }
}

/// A store whose file can never be opened
pub struct UnavailableStore;

fn cannot_open() -> StorageError {
    StorageError::Database(rusqlite::Error::SqliteFailure(
        ffi::Error::new(ffi::SQLITE_CANTOPEN),
        None,
    ))
}

impl TaxonStore for UnavailableStore {
    fn graph_name(&self) -> &str {
        "animal_kingdom"
    }

    fn get_or_create_node(&self, _: Rank, _: &str, _: &str) -> StorageResult<NodeUpsert> {
        Err(cannot_open())
    }

    fn load_node(&self, _: Rank, _: TaxonId) -> StorageResult<Option<TaxonNode>> {
        Err(cannot_open())
    }

    fn find_node(&self, _: Rank, _: &str) -> StorageResult<Option<TaxonNode>> {
        Err(cannot_open())
    }

    fn get_or_create_edge(&self, _: &MembershipEdge) -> StorageResult<bool> {
        Err(cannot_open())
    }

    fn has_edge(&self, _: &MembershipEdge) -> StorageResult<bool> {
        Err(cannot_open())
    }

    fn write_chain(
        &self,
        _: &mut dyn FnMut(&dyn ChainWriter) -> StorageResult<()>,
    ) -> StorageResult<()> {
        Err(cannot_open())
    }

    fn inbound_neighbors(&self, _: Rank, _: TaxonId) -> StorageResult<Vec<TaxonNode>> {
        Err(cannot_open())
    }

    fn stats(&self) -> StorageResult<GraphStats> {
        Err(cannot_open())
    }
}

/// In-memory store whose chain writes panic
pub struct PanickingStore {
    inner: SqliteStore,
}

impl PanickingStore {
    pub fn new() -> Self {
        Self {
            inner: SqliteStore::open_in_memory("animal_kingdom").unwrap(),
        }
    }
}

impl TaxonStore for PanickingStore {
    fn graph_name(&self) -> &str {
        self.inner.graph_name()
    }

    fn get_or_create_node(&self, rank: Rank, name: &str, url: &str) -> StorageResult<NodeUpsert> {
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
        _: &mut dyn FnMut(&dyn ChainWriter) -> StorageResult<()>,
    ) -> StorageResult<()> {
        panic!("chain write blew up");
    }

    fn inbound_neighbors(&self, rank: Rank, id: TaxonId) -> StorageResult<Vec<TaxonNode>> {
        self.inner.inbound_neighbors(rank, id)
    }

    fn stats(&self) -> StorageResult<GraphStats> {
        self.inner.stats()
    }
}
