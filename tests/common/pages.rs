//! HTML fixtures shaped like encyclopedia taxon pages

use url::Url;

pub const WIKI_HOST: &str = "https://en.wikipedia.org";

/// Absolute URL of an article title
pub fn wiki_url(title: &str) -> Url {
    Url::parse(&format!("{WIKI_HOST}/wiki/{title}")).unwrap()
}

/// Classification rows: (rank label, name, link title or None)
pub type Row<'a> = (&'a str, &'a str, Option<&'a str>);

/// A page whose classification table holds `rows`, framed the way real
/// pages frame it (header rows before, binomial rows after)
pub fn classification_page(title: &str, rows: &[Row<'_>]) -> String {
    let body: String = rows
        .iter()
        .map(|(rank, name, link)| match link {
            Some(target) => format!(
                r#"<tr><td>{rank}:</td><td><a href="/wiki/{target}" title="{name}">{name}</a></td></tr>"#
            ),
            None => format!("<tr><td>{rank}:</td><td><i>{name}</i></td></tr>"),
        })
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html><head><title>{title} - Wikipedia</title></head>
<body>
<div id="bodyContent">
  <table class="infobox biota">
    <tbody>
      <tr><th colspan="2">{title}</th></tr>
      <tr><th colspan="2"><a href="/wiki/Taxonomy_(biology)">Scientific classification</a></th></tr>
      {body}
      <tr><th colspan="2">Binomial name</th></tr>
    </tbody>
  </table>
  <p>See also <a href="/wiki/Worm">worms</a>.</p>
</div>
</body></html>"#
    )
}

/// A page with no classification table
pub fn plain_page(title: &str) -> String {
    format!(
        r#"<html><body><div id="bodyContent"><h1>{title}</h1>
        <p><a href="/wiki/Animal">Animals</a></p></div></body></html>"#
    )
}

/// Rows down to the genus Eunice
pub fn eunice_lineage() -> Vec<Row<'static>> {
    vec![
        ("Kingdom", "Animalia", Some("Animal")),
        ("Phylum", "Annelida", Some("Annelid")),
        ("Class", "Polychaeta", Some("Polychaete")),
        ("Order", "Eunicida", Some("Eunicida")),
        ("Family", "Eunicidae", Some("Eunicidae")),
        ("Genus", "Eunice", Some("Eunice_(annelid)")),
    ]
}

/// Species page of a member of Eunice
pub fn eunice_species_page(species: &str) -> String {
    let mut rows = eunice_lineage();
    rows.push(("Species", species, None));
    classification_page(species, &rows)
}

/// Article title for a species name
pub fn title_of(species: &str) -> String {
    species.replace(' ', "_")
}

/// Species page for an oak: same shape, different kingdom
pub fn oak_page() -> String {
    classification_page(
        "Quercus robur",
        &[
            ("Kingdom", "Plantae", Some("Plant")),
            ("Order", "Fagales", Some("Fagales")),
            ("Family", "Fagaceae", Some("Fagaceae")),
            ("Genus", "Quercus", Some("Oak")),
            ("Species", "Q. robur", None),
        ],
    )
}
