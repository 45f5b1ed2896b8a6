//! Torznab/Newznab client.
//!
//! Both wire protocols share the same query-string shape and RSS response format (the
//! only practical difference is the `torznab:attr`/`newznab:attr` element name), so a
//! single client handles both, selected by `indexer.indexer_type` at construction time.

use std::time::Duration;

use quick_xml::Reader;
use quick_xml::events::Event;
use reqwest::Client;
use tracing::{debug, warn};

use crate::entities::indexer;
use crate::indexers::error::IndexerError;
use crate::indexers::types::{Capabilities, MediaKind, SearchParams, SearchResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Torznab,
    Newznab,
}

pub struct TorznabClient {
    id: i32,
    name: String,
    base_url: String,
    api_key: Option<String>,
    categories: Option<String>,
    protocol: Protocol,
    http: Client,
}

impl TorznabClient {
    #[must_use]
    pub fn from_model(model: &indexer::Model, timeout: Duration) -> Self {
        let protocol = if model.indexer_type.eq_ignore_ascii_case("newznab") {
            Protocol::Newznab
        } else {
            Protocol::Torznab
        };

        let http = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();

        Self {
            id: model.id,
            name: model.name.clone(),
            base_url: model.url.trim_end_matches('/').to_string(),
            api_key: model.api_key.clone(),
            categories: model.categories.clone(),
            protocol,
            http,
        }
    }

    #[must_use]
    pub fn id(&self) -> i32 {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Builds the query string shared by search and RSS requests. `type_override` selects
    /// the Torznab `t=` mode; `None` omits it entirely, which is how a plain RSS/recent-releases
    /// feed is requested per §6.3.
    fn build_query_url(&self, params: &SearchParams, type_override: Option<&str>) -> String {
        let mut parts = Vec::new();

        if let Some(t) = type_override {
            parts.push(format!("t={t}"));
        }
        if let Some(key) = &self.api_key {
            parts.push(format!("apikey={}", urlencoding::encode(key)));
        }
        if !params.query.is_empty() {
            parts.push(format!("q={}", urlencoding::encode(&params.query)));
        }
        if let Some(cats) = &self.categories {
            parts.push(format!("cat={}", urlencoding::encode(cats)));
        }
        if let Some(imdb) = &params.imdb_id {
            parts.push(format!("imdbid={}", urlencoding::encode(imdb)));
        }
        if let Some(tvdb) = params.tvdb_id {
            parts.push(format!("tvdbid={tvdb}"));
        }
        if let Some(tmdb) = params.tmdb_id {
            parts.push(format!("tmdbid={tmdb}"));
        }
        if let Some(season) = params.season {
            parts.push(format!("season={season}"));
        }
        if let Some(episode) = params.episode {
            parts.push(format!("ep={episode}"));
        }
        if let Some(limit) = params.limit {
            parts.push(format!("limit={limit}"));
        }
        if let Some(offset) = params.offset {
            parts.push(format!("offset={offset}"));
        }

        format!("{}/api?{}", self.base_url, parts.join("&"))
    }

    fn build_url(&self, params: &SearchParams) -> String {
        let t = params.kind.map_or("search", MediaKind::torznab_type);
        self.build_query_url(params, Some(t))
    }

    /// RSS mode: the same endpoint with no `t=` parameter, returning the indexer's
    /// recent-releases feed rather than a keyword search.
    fn build_rss_url(&self) -> String {
        self.build_query_url(&SearchParams::default(), None)
    }

    fn build_caps_url(&self) -> String {
        let mut url = format!("{}/api?t=caps", self.base_url);
        if let Some(key) = &self.api_key {
            url.push_str(&format!("&apikey={}", urlencoding::encode(key)));
        }
        url
    }

    pub async fn search(&self, params: &SearchParams) -> Result<Vec<SearchResult>, IndexerError> {
        let url = self.build_url(params);
        debug!(indexer = %self.name, %url, "querying indexer");

        let body = self.get_text(&url).await?;
        self.parse_response(&body)
    }

    /// Fetches the indexer's default/recent-releases RSS feed (no search term).
    pub async fn fetch_rss(&self) -> Result<Vec<SearchResult>, IndexerError> {
        let url = self.build_rss_url();
        debug!(indexer = %self.name, %url, "fetching indexer RSS feed");

        let body = self.get_text(&url).await?;
        self.parse_response(&body)
    }

    /// Fetches and parses the indexer's advertised capabilities (`t=caps`).
    pub async fn get_capabilities(&self) -> Result<Capabilities, IndexerError> {
        let url = self.build_caps_url();
        debug!(indexer = %self.name, %url, "fetching indexer capabilities");

        let body = self.get_text(&url).await?;
        parse_capabilities(&body)
    }

    /// Verifies the indexer is reachable and the configured credentials are accepted,
    /// via a lightweight `t=caps` request. Returns the mapped error rather than `Ok` on
    /// any failure; callers surface that as a connection-test result.
    pub async fn test_connection(&self) -> Result<(), IndexerError> {
        let url = self.build_caps_url();
        debug!(indexer = %self.name, %url, "testing indexer connection");

        let body = self.get_text(&url).await?;
        if body.contains("<error") {
            return Err(IndexerError::Parse(
                "indexer returned an error response".to_string(),
            ));
        }

        Ok(())
    }

    async fn get_text(&self, url: &str) -> Result<String, IndexerError> {
        let response = self.http.get(url).send().await?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(IndexerError::Unauthorized(self.name.clone()));
        }
        if !response.status().is_success() {
            return Err(IndexerError::Parse(format!(
                "indexer returned status {}",
                response.status()
            )));
        }

        Ok(response.text().await?)
    }

    fn attr_name(&self) -> &'static str {
        match self.protocol {
            Protocol::Torznab => "torznab:attr",
            Protocol::Newznab => "newznab:attr",
        }
    }

    fn parse_response(&self, xml: &str) -> Result<Vec<SearchResult>, IndexerError> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut results = Vec::new();
        let mut current: Option<ItemBuilder> = None;
        let mut current_tag = String::new();
        let mut in_item = false;
        let attr_tag = self.attr_name();

        loop {
            match reader
                .read_event()
                .map_err(|e| IndexerError::Parse(e.to_string()))?
            {
                Event::Start(ref e) => {
                    let tag = String::from_utf8_lossy(e.name().as_ref()).to_string();
                    current_tag = tag.clone();

                    if tag == "item" {
                        in_item = true;
                        current = Some(ItemBuilder::default());
                    } else if in_item && (tag == attr_tag || tag == "torznab:attr" || tag == "newznab:attr") {
                        apply_attr_element(e, current.as_mut());
                    } else if in_item && tag == "enclosure" {
                        apply_enclosure(e, current.as_mut());
                    }
                }
                Event::Empty(ref e) => {
                    let tag = String::from_utf8_lossy(e.name().as_ref()).to_string();
                    if in_item && (tag == attr_tag || tag == "torznab:attr" || tag == "newznab:attr") {
                        apply_attr_element(e, current.as_mut());
                    } else if in_item && tag == "enclosure" {
                        apply_enclosure(e, current.as_mut());
                    }
                }
                Event::Text(ref e) => {
                    if in_item {
                        if let Some(item) = current.as_mut() {
                            let text = e.unescape().unwrap_or_default().to_string();
                            if !text.is_empty() {
                                match current_tag.as_str() {
                                    "title" => item.title = Some(text),
                                    "link" => item.link.get_or_insert(text),
                                    "pubDate" => item.pub_date = Some(text),
                                    "category" => item.categories.push(text),
                                    _ => {}
                                };
                            }
                        }
                    }
                }
                Event::End(ref e) => {
                    let tag = String::from_utf8_lossy(e.name().as_ref()).to_string();
                    if tag == "item" {
                        if let Some(item) = current.take()
                            && let Some(result) = item.build(self.id, &self.name)
                        {
                            results.push(result);
                        }
                        in_item = false;
                    }
                    current_tag.clear();
                }
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(results)
    }
}

fn apply_attr_element(e: &quick_xml::events::BytesStart, current: Option<&mut ItemBuilder>) {
    let Some(item) = current else { return };
    let mut name = String::new();
    let mut value = String::new();
    for attr in e.attributes().flatten() {
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let val = String::from_utf8_lossy(&attr.value).to_string();
        if key == "name" {
            name = val;
        } else if key == "value" {
            value = val;
        }
    }
    item.set_attr(&name, &value);
}

fn apply_enclosure(e: &quick_xml::events::BytesStart, current: Option<&mut ItemBuilder>) {
    let Some(item) = current else { return };
    for attr in e.attributes().flatten() {
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let val = String::from_utf8_lossy(&attr.value).to_string();
        match key.as_str() {
            "url" => item.link = Some(val),
            "length" => item.size = val.parse().ok(),
            _ => {}
        }
    }
}

/// Parses a Torznab `<caps>` response:
/// `<caps><searching><search available="yes"/><tv-search available="yes"/>...</searching>
/// <categories><category id=".."/>...</categories></caps>`.
fn parse_capabilities(xml: &str) -> Result<Capabilities, IndexerError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut caps = Capabilities::default();

    loop {
        match reader
            .read_event()
            .map_err(|e| IndexerError::Parse(e.to_string()))?
        {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let tag = String::from_utf8_lossy(e.name().as_ref()).to_string();
                match tag.as_str() {
                    "search" => caps.search = attr_is_yes(e, "available"),
                    "tv-search" => caps.tv_search = attr_is_yes(e, "available"),
                    "movie-search" => caps.movie_search = attr_is_yes(e, "available"),
                    "music-search" => caps.music_search = attr_is_yes(e, "available"),
                    "book-search" => caps.book_search = attr_is_yes(e, "available"),
                    "category" => {
                        if let Some(id) = attr_value(e, "id").and_then(|v| v.parse().ok()) {
                            caps.categories.push(id);
                        }
                    }
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(caps)
}

fn attr_value(e: &quick_xml::events::BytesStart, key: &str) -> Option<String> {
    e.attributes().flatten().find_map(|attr| {
        (String::from_utf8_lossy(attr.key.as_ref()) == key)
            .then(|| String::from_utf8_lossy(&attr.value).to_string())
    })
}

fn attr_is_yes(e: &quick_xml::events::BytesStart, key: &str) -> bool {
    attr_value(e, key).is_some_and(|v| v.eq_ignore_ascii_case("yes"))
}

#[derive(Default)]
struct ItemBuilder {
    title: Option<String>,
    link: Option<String>,
    pub_date: Option<String>,
    size: Option<i64>,
    seeders: Option<i32>,
    leechers: Option<i32>,
    info_hash: Option<String>,
    categories: Vec<String>,
}

impl ItemBuilder {
    fn set_attr(&mut self, name: &str, value: &str) {
        match name {
            "size" => self.size = value.parse().ok(),
            "seeders" => self.seeders = value.parse().ok(),
            "peers" | "leechers" => self.leechers = value.parse().ok(),
            "infohash" => self.info_hash = Some(value.to_string()),
            _ => debug!(attr = name, val = value, "unrecognised torznab/newznab attribute"),
        }
    }

    fn build(self, indexer_id: i32, indexer_name: &str) -> Option<SearchResult> {
        let title = self.title?;
        let download_url = self.link?;
        Some(SearchResult {
            title,
            download_url,
            info_hash: self.info_hash,
            size: self.size,
            seeders: self.seeders,
            leechers: self.leechers,
            published_at: self.pub_date,
            categories: self.categories,
            indexer_id,
            indexer_name: indexer_name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> TorznabClient {
        TorznabClient {
            id: 1,
            name: "Test Indexer".to_string(),
            base_url: "http://example.invalid".to_string(),
            api_key: None,
            categories: None,
            protocol: Protocol::Torznab,
            http: Client::new(),
        }
    }

    #[test]
    fn parses_rss_items_with_torznab_attrs() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
        <rss><channel>
        <item>
            <title>Movie.Title.2024.1080p.BluRay-GRP</title>
            <link>magnet:?xt=urn:btih:abc123</link>
            <pubDate>Mon, 01 Jan 2024 00:00:00 +0000</pubDate>
            <torznab:attr name="seeders" value="42"/>
            <torznab:attr name="peers" value="5"/>
            <torznab:attr name="size" value="1073741824"/>
            <torznab:attr name="infohash" value="abc123"/>
        </item>
        </channel></rss>"#;

        let results = client().parse_response(xml).unwrap();
        assert_eq!(results.len(), 1);
        let r = &results[0];
        assert_eq!(r.seeders, Some(42));
        assert_eq!(r.leechers, Some(5));
        assert_eq!(r.size, Some(1_073_741_824));
        assert_eq!(r.info_hash.as_deref(), Some("abc123"));
        assert_eq!(r.indexer_id, 1);
    }

    #[test]
    fn skips_items_missing_a_download_link() {
        let xml = r#"<rss><channel><item><title>No link here</title></item></channel></rss>"#;
        let results = client().parse_response(xml).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn builds_rss_url_without_search_type() {
        let url = client().build_rss_url();
        assert!(!url.contains("t="));
        assert!(url.starts_with("http://example.invalid/api?"));
    }

    #[test]
    fn builds_caps_url_with_type_caps() {
        let url = client().build_caps_url();
        assert!(url.contains("t=caps"));
    }

    #[test]
    fn parses_caps_response() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
        <caps>
            <searching>
                <search available="yes"/>
                <tv-search available="yes"/>
                <movie-search available="no"/>
            </searching>
            <categories>
                <category id="2000" name="Movies"/>
                <category id="5000" name="TV"/>
            </categories>
        </caps>"#;

        let caps = parse_capabilities(xml).unwrap();
        assert!(caps.search);
        assert!(caps.tv_search);
        assert!(!caps.movie_search);
        assert!(!caps.music_search);
        assert_eq!(caps.categories, vec![2000, 5000]);
    }
}
