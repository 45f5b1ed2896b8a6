use serde::{Deserialize, Serialize};

/// Media kind a search targets, mirrors Torznab's `t=` query categories at a coarser grain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaKind {
    Movie,
    Tv,
    Music,
    Book,
}

impl MediaKind {
    #[must_use]
    pub const fn torznab_type(self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Tv => "tvsearch",
            Self::Music => "music",
            Self::Book => "book",
        }
    }
}

/// Parameters for a single search fanned out to every enabled indexer.
#[derive(Debug, Clone, Default)]
pub struct SearchParams {
    pub kind: Option<MediaKind>,
    pub query: String,
    pub imdb_id: Option<String>,
    pub tvdb_id: Option<i64>,
    pub tmdb_id: Option<i64>,
    pub season: Option<i32>,
    pub episode: Option<i32>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl SearchParams {
    #[must_use]
    pub fn for_query(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }
}

/// An indexer's advertised search capabilities, parsed from its Torznab `t=caps` response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Capabilities {
    pub search: bool,
    pub tv_search: bool,
    pub movie_search: bool,
    pub music_search: bool,
    pub book_search: bool,
    pub categories: Vec<i32>,
}

/// A single release surfaced by an indexer, tagged with its origin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub download_url: String,
    pub info_hash: Option<String>,
    pub size: Option<i64>,
    pub seeders: Option<i32>,
    pub leechers: Option<i32>,
    pub published_at: Option<String>,
    pub categories: Vec<String>,
    pub indexer_id: i32,
    pub indexer_name: String,
}
