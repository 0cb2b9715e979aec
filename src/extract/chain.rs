//! Chain extraction from the classification table

use super::page::{Page, LINK};
use crate::graph::{Rank, TaxonChain, TaxonEntry};
use scraper::{ElementRef, Selector};
use std::sync::LazyLock;

static ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").expect("static selector"));

/// Why a page produced no chain
///
/// These are expected outcomes, not errors: most crawled pages are not
/// species pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractSignal {
    /// No classification table, or more than one
    NotATaxonPage,
    /// The chain's Kingdom row names a kingdom other than the configured root
    WrongKingdom(String),
}

impl std::fmt::Display for ExtractSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotATaxonPage => write!(f, "not a taxon page"),
            Self::WrongKingdom(name) => write!(f, "wrong kingdom: {}", name),
        }
    }
}

/// Extracts the ordered rank chain from a page's classification table
#[derive(Debug, Clone)]
pub struct ChainExtractor {
    root_kingdom: String,
}

impl ChainExtractor {
    /// Create an extractor that only admits chains rooted at `root_kingdom`
    pub fn new(root_kingdom: impl Into<String>) -> Self {
        Self {
            root_kingdom: root_kingdom.into(),
        }
    }

    /// Walk the classification table from its Kingdom row downwards.
    ///
    /// Scanning stops at the first row that is not a `rank: name` pair, at
    /// the Species row, or at the end of the table. The result may be
    /// incomplete; completeness is the validator's concern.
    pub fn extract(&self, page: &Page) -> Result<TaxonChain, ExtractSignal> {
        let table = page
            .classification_table()
            .ok_or(ExtractSignal::NotATaxonPage)?;

        let mut chain = TaxonChain::new();
        let head = table
            .select(&ROW)
            .find(|row| row_text(row).contains(Rank::Kingdom.label()));
        let Some(mut row) = head else {
            return Ok(chain);
        };

        loop {
            let Some((rank, name)) = split_row(&row_text(&row)) else {
                break;
            };

            if rank == Rank::Kingdom.label() && name != self.root_kingdom {
                return Err(ExtractSignal::WrongKingdom(name));
            }

            if rank == Rank::Species.label() {
                // The species row links elsewhere; the page itself is the species URL
                chain.push(TaxonEntry::new(rank, name, page.url().as_str()));
                break;
            }

            let url = first_link(&row, page).unwrap_or_default();
            chain.push(TaxonEntry::new(rank, name, url));

            match next_row(&row) {
                Some(next) => row = next,
                None => break,
            }
        }

        Ok(chain)
    }
}

fn row_text(row: &ElementRef<'_>) -> String {
    row.text().collect()
}

/// Split `"Rank: Name"` into exactly two non-empty trimmed parts
fn split_row(text: &str) -> Option<(String, String)> {
    let mut parts = text.split(':');
    let rank = parts.next()?.trim();
    let name = parts.next()?.trim();
    if parts.next().is_some() || rank.is_empty() || name.is_empty() {
        return None;
    }
    Some((rank.to_string(), name.to_string()))
}

/// First anchor in the row, resolved to an absolute URL
fn first_link(row: &ElementRef<'_>, page: &Page) -> Option<String> {
    let href = row.select(&LINK).next()?.value().attr("href")?;
    page.resolve(href).map(String::from)
}

/// The next element sibling, if it is a row
fn next_row<'a>(row: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    row.next_siblings()
        .filter_map(ElementRef::wrap)
        .next()
        .filter(|el| el.value().name() == "tr")
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    const PAGE_URL: &str = "https://en.wikipedia.org/wiki/Eunice_aphroditois";

    fn infobox(rows: &str) -> String {
        format!(
            r#"<html><body><div id="bodyContent">
            <table class="infobox biota">
              <tr><th colspan="2">Bobbit worm</th></tr>
              <tr><th colspan="2">Scientific classification</th></tr>
              {rows}
              <tr><th colspan="2">Binomial name</th></tr>
            </table>
            </div></body></html>"#
        )
    }

    fn row(rank: &str, name: &str, href: &str) -> String {
        format!(r#"<tr><td>{rank}:</td><td><a href="{href}">{name}</a></td></tr>"#)
    }

    fn eunice_rows() -> String {
        [
            row("Kingdom", "Animalia", "/wiki/Animal"),
            row("Phylum", "Annelida", "/wiki/Annelid"),
            row("Class", "Polychaeta", "/wiki/Polychaete"),
            row("Order", "Eunicida", "/wiki/Eunicida"),
            row("Family", "Eunicidae", "/wiki/Eunicidae"),
            row("Genus", "Eunice", "/wiki/Eunice_(annelid)"),
            row("Species", "E. aphroditois", "/wiki/Somewhere_else"),
        ]
        .concat()
    }

    fn page(html: &str) -> Page {
        Page::parse(html, Url::parse(PAGE_URL).unwrap())
    }

    fn extract(html: &str) -> Result<TaxonChain, ExtractSignal> {
        ChainExtractor::new("Animalia").extract(&page(html))
    }

    #[test]
    fn test_full_chain_in_order() {
        let chain = extract(&infobox(&eunice_rows())).unwrap();

        let ranks: Vec<&str> = chain.entries.iter().map(|e| e.rank.as_str()).collect();
        assert_eq!(
            ranks,
            vec!["Kingdom", "Phylum", "Class", "Order", "Family", "Genus", "Species"]
        );
        assert_eq!(chain.entries[1].name, "Annelida");
        assert_eq!(chain.entries[6].name, "E. aphroditois");
    }

    #[test]
    fn test_links_resolve_against_page_url() {
        let chain = extract(&infobox(&eunice_rows())).unwrap();
        assert_eq!(chain.entries[0].url, "https://en.wikipedia.org/wiki/Animal");
        assert_eq!(chain.entries[5].url, "https://en.wikipedia.org/wiki/Eunice_(annelid)");
    }

    #[test]
    fn test_species_url_is_the_page_url() {
        let chain = extract(&infobox(&eunice_rows())).unwrap();
        assert_eq!(chain.entries[6].url, PAGE_URL);
    }

    #[test]
    fn test_row_without_anchor_has_empty_url() {
        let rows = format!(
            "{}<tr><td>Phylum:</td><td>Annelida</td></tr>",
            row("Kingdom", "Animalia", "/wiki/Animal")
        );
        let chain = extract(&infobox(&rows)).unwrap();
        assert_eq!(chain.len(), 2);
        assert_eq!(chain.entries[1].url, "");
    }

    #[test]
    fn test_non_canonical_rows_are_kept() {
        let rows = [
            row("Kingdom", "Animalia", "/wiki/Animal"),
            row("Clade", "Pleistoannelida", "/wiki/Pleistoannelida"),
            row("Phylum", "Annelida", "/wiki/Annelid"),
        ]
        .concat();
        let chain = extract(&infobox(&rows)).unwrap();
        assert_eq!(chain.len(), 3);
        assert_eq!(chain.entries[1].rank, "Clade");
    }

    #[test]
    fn test_malformed_row_halts_extraction() {
        let rows = [
            row("Kingdom", "Animalia", "/wiki/Animal"),
            row("Phylum", "Annelida", "/wiki/Annelid"),
            "<tr><td>Class Polychaeta</td></tr>".to_string(),
            row("Order", "Eunicida", "/wiki/Eunicida"),
        ]
        .concat();
        let chain = extract(&infobox(&rows)).unwrap();
        let names: Vec<&str> = chain.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Animalia", "Annelida"]);
    }

    #[test]
    fn test_malformed_head_row_yields_empty_chain() {
        let rows = "<tr><td>Kingdom Animalia</td></tr>".to_string() + &row("Phylum", "Annelida", "/a");
        let chain = extract(&infobox(&rows)).unwrap();
        assert!(chain.is_empty());
    }

    #[test]
    fn test_empty_name_halts_extraction() {
        let rows = row("Kingdom", "Animalia", "/wiki/Animal") + "<tr><td>Phylum:</td><td> </td></tr>";
        let chain = extract(&infobox(&rows)).unwrap();
        assert_eq!(chain.len(), 1);
    }

    #[test]
    fn test_missing_kingdom_row_yields_empty_chain() {
        let rows = row("Phylum", "Annelida", "/wiki/Annelid");
        let chain = extract(&infobox(&rows)).unwrap();
        assert!(chain.is_empty());
    }

    #[test]
    fn test_species_row_terminates_scan() {
        let rows = eunice_rows() + &row("Subspecies", "E. a. minor", "/x");
        let chain = extract(&infobox(&rows)).unwrap();
        assert_eq!(chain.len(), 7);
        assert!(chain.reaches_species());
    }

    #[test]
    fn test_wrong_kingdom_aborts() {
        let rows = [
            row("Kingdom", "Plantae", "/wiki/Plant"),
            row("Species", "Q. robur", "/x"),
        ]
        .concat();
        assert_eq!(
            extract(&infobox(&rows)),
            Err(ExtractSignal::WrongKingdom("Plantae".to_string()))
        );
    }

    #[test]
    fn test_no_classification_table() {
        let html = r#"<html><body><div id="bodyContent"><table class="infobox"></table></div></body></html>"#;
        assert_eq!(extract(html), Err(ExtractSignal::NotATaxonPage));
    }

    #[test]
    fn test_two_classification_tables() {
        let table = format!(r#"<table class="infobox biota">{}</table>"#, eunice_rows());
        let html = format!(r#"<html><body><div id="bodyContent">{table}{table}</div></body></html>"#);
        assert_eq!(extract(&html), Err(ExtractSignal::NotATaxonPage));
    }

    #[test]
    fn test_table_outside_body_content_is_ignored() {
        let html = format!(
            r#"<html><body><div id="bodyContent"><p>text</p></div>{}</body></html>"#,
            r#"<table class="infobox biota"><tr><td>Kingdom:</td><td>Animalia</td></tr></table>"#
        );
        assert_eq!(extract(&html), Err(ExtractSignal::NotATaxonPage));
    }
}
