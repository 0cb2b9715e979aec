//! Parsed page with its resolved URL

use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use url::Url;

static BODY_CONTENT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("#bodyContent").expect("static selector"));
static CLASSIFICATION_TABLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table.infobox.biota").expect("static selector"));
pub(super) static LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("static selector"));

/// A fetched page, parsed once and shared by the extractors
///
/// `scraper::Html` is not `Send`; build pages inside the task or blocking
/// section that consumes them.
pub struct Page {
    document: Html,
    url: Url,
}

impl Page {
    /// Parse `html` fetched from `url`
    pub fn parse(html: &str, url: Url) -> Self {
        Self {
            document: Html::parse_document(html),
            url,
        }
    }

    /// The page's own resolved URL
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Root content element: `#bodyContent` when present, else the document root
    pub fn content_root(&self) -> ElementRef<'_> {
        self.document
            .select(&BODY_CONTENT)
            .next()
            .unwrap_or_else(|| self.document.root_element())
    }

    /// The unique classification table, if the page has exactly one
    pub fn classification_table(&self) -> Option<ElementRef<'_>> {
        let mut tables = self.content_root().select(&CLASSIFICATION_TABLE);
        let first = tables.next()?;
        match tables.next() {
            Some(_) => None,
            None => Some(first),
        }
    }

    /// Resolve an `href` against the page URL
    pub fn resolve(&self, href: &str) -> Option<Url> {
        self.url.join(href.trim()).ok()
    }
}
