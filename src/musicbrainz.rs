use std::sync::OnceLock;

use color_eyre::Result;
use color_eyre::eyre::Context;
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};

use crate::ports::ArtistResolver;

const SEARCH_URL: &str = "https://musicbrainz.org/search";

/// Resolves artist names by scraping the MusicBrainz search page.
///
/// The markup walk is confined to `extract_artist_guid` so the strategy
/// can be swapped without touching the pipeline.
pub struct MusicBrainzResolver {
    client: Client,
}

impl MusicBrainzResolver {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl ArtistResolver for MusicBrainzResolver {
    async fn resolve(&self, name: &str) -> Result<Option<String>> {
        log::debug!("Searching MusicBrainz for {}", name);

        let body = self
            .client
            .get(SEARCH_URL)
            .query(&[("query", name), ("type", "artist"), ("method", "indexed")])
            .send()
            .await
            .wrap_err_with(|| format!("Failed to send MusicBrainz search for {}", name))?
            .error_for_status()
            .wrap_err_with(|| format!("MusicBrainz search for {} was rejected", name))?
            .text()
            .await
            .wrap_err_with(|| format!("Failed to read MusicBrainz search page for {}", name))?;

        Ok(extract_artist_guid(&body))
    }
}

fn artist_guid_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"/artist/([a-f0-9-]+)").unwrap())
}

/// Pull the GUID of the top search result out of the results page:
/// `table.tbl` -> `tbody` -> first row -> first cell -> link href ->
/// `/artist/<guid>`. Any missing step means no match, never an error.
fn extract_artist_guid(html: &str) -> Option<String> {
    let table_selector = Selector::parse("table.tbl").ok()?;
    let body_selector = Selector::parse("tbody").ok()?;
    let row_selector = Selector::parse("tr").ok()?;
    let cell_selector = Selector::parse("td").ok()?;
    let link_selector = Selector::parse("a").ok()?;

    let document = Html::parse_document(html);

    let table = document.select(&table_selector).next()?;
    let body = table.select(&body_selector).next()?;
    let top_row = body.select(&row_selector).next()?;
    let first_cell = top_row.select(&cell_selector).next()?;
    let link = first_cell.select(&link_selector).next()?;

    let href = link.value().attr("href")?;

    artist_guid_pattern()
        .captures(href)
        .map(|captures| captures[1].to_string())
}
