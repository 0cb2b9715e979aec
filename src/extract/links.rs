//! Link discovery inside the classification table

use super::page::{Page, LINK};
use std::collections::HashSet;
use url::Url;

/// Every link inside the page's classification table, resolved and de-duplicated.
///
/// Fragments are stripped and non-http(s) targets dropped. Pages without a
/// unique classification table yield no links: they are dead ends.
pub fn biota_links(page: &Page) -> Vec<Url> {
    let Some(table) = page.classification_table() else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    table
        .select(&LINK)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| page.resolve(href))
        .filter(|url| matches!(url.scheme(), "http" | "https"))
        .map(|mut url| {
            url.set_fragment(None);
            url
        })
        .filter(|url| seen.insert(url.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(body: &str) -> Page {
        Page::parse(
            &format!(r#"<html><body><div id="bodyContent">{body}</div></body></html>"#),
            Url::parse("https://en.wikipedia.org/wiki/Eunice").unwrap(),
        )
    }

    #[test]
    fn test_collects_table_links_only() {
        let p = page(
            r#"<p><a href="/wiki/Outside">outside</a></p>
            <table class="infobox biota">
              <tr><td>Kingdom:</td><td><a href="/wiki/Animal">Animalia</a></td></tr>
              <tr><td>Phylum:</td><td><a href="/wiki/Annelid#Taxonomy">Annelida</a></td></tr>
            </table>"#,
        );
        let links: Vec<String> = biota_links(&p).into_iter().map(String::from).collect();
        assert_eq!(
            links,
            vec![
                "https://en.wikipedia.org/wiki/Animal",
                "https://en.wikipedia.org/wiki/Annelid",
            ]
        );
    }

    #[test]
    fn test_deduplicates_after_fragment_strip() {
        let p = page(
            r#"<table class="infobox biota">
              <tr><td><a href="/wiki/Animal">a</a><a href="/wiki/Animal#x">b</a></td></tr>
              <tr><td><a href="mailto:someone@example.com">mail</a></td></tr>
            </table>"#,
        );
        assert_eq!(biota_links(&p).len(), 1);
    }

    #[test]
    fn test_no_table_no_links() {
        let p = page(r#"<a href="/wiki/Animal">Animalia</a>"#);
        assert!(biota_links(&p).is_empty());
    }
}
