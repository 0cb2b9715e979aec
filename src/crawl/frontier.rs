//! Crawl frontier: which URLs get visited, and in what order

use regex::Regex;
use std::collections::{HashSet, VecDeque};
use url::Url;

/// Admission rules for candidate URLs
#[derive(Debug, Clone)]
pub struct UrlFilter {
    allowed_domain: String,
    pattern: Regex,
    max_depth: u32,
}

impl UrlFilter {
    /// `max_depth` of 0 disables the depth limit
    pub fn new(
        allowed_domain: impl Into<String>,
        pattern: &str,
        max_depth: u32,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            allowed_domain: allowed_domain.into(),
            pattern: Regex::new(pattern)?,
            max_depth,
        })
    }

    /// Whether `url`, discovered at `depth` (seed = 1), should be visited
    pub fn admits(&self, url: &Url, depth: u32) -> bool {
        if self.max_depth != 0 && depth > self.max_depth {
            return false;
        }
        if !matches!(url.scheme(), "http" | "https") {
            return false;
        }
        if url.host_str() != Some(self.allowed_domain.as_str()) {
            return false;
        }
        self.pattern.is_match(url.as_str())
    }
}

/// Breadth-first queue of admitted, not yet seen URLs
#[derive(Debug)]
pub struct Frontier {
    filter: UrlFilter,
    seen: HashSet<Url>,
    queue: VecDeque<(Url, u32)>,
}

impl Frontier {
    pub fn new(filter: UrlFilter) -> Self {
        Self {
            filter,
            seen: HashSet::new(),
            queue: VecDeque::new(),
        }
    }

    /// Enqueue `url` at `depth`. Returns false if it was filtered out or
    /// has already been seen.
    pub fn push(&mut self, mut url: Url, depth: u32) -> bool {
        url.set_fragment(None);
        if !self.filter.admits(&url, depth) || !self.seen.insert(url.clone()) {
            return false;
        }
        self.queue.push_back((url, depth));
        true
    }

    pub fn pop(&mut self) -> Option<(Url, u32)> {
        self.queue.pop_front()
    }
}
