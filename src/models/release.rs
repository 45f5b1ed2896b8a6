use serde::{Deserialize, Serialize};

/// Everything the filename/title parser (and, for `seeders`, the indexer search result)
/// can tell us about a single release, before it is matched against the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ParsedRelease {
    pub original_filename: String,

    pub title: String,
    pub year: Option<i32>,

    pub season: Option<i32>,
    pub episode_number: f32,
    pub episode_end: Option<i32>,
    /// Anime absolute episode numbering, independent of season.
    pub absolute: Option<i32>,

    pub resolution: Option<String>,
    pub source: Option<String>,
    pub codec: Option<String>,
    pub audio_format: Option<String>,
    pub audio_channels: Option<String>,
    pub bit_depth: Option<i32>,
    pub hdr: Option<String>,
    pub edition: Option<String>,
    pub release_group: Option<String>,
    pub container: Option<String>,

    pub is_proper: bool,
    pub is_repack: bool,
    pub is_rerip: bool,
    pub is_syncfix: bool,
    pub is_ds4k: bool,
    pub is_upscaled: bool,
    pub is_sample: bool,
    pub is_disc: bool,
    pub is_archive: bool,
    pub is_compressed_audio: bool,
    pub is_hardcoded_subs: bool,
    pub is_dubbed: bool,
    pub is_anime: bool,
    pub has_dual_audio: bool,
    pub has_soft_subs: bool,

    pub version: Option<i32>,

    /// Only ever set by the indexer search result, never by filename parsing.
    pub seeders: Option<i32>,
}

impl ParsedRelease {
    #[must_use]
    pub fn effective_season(&self) -> i32 {
        self.season.unwrap_or(1)
    }

    #[must_use]
    pub fn effective_version(&self) -> i32 {
        self.version.unwrap_or(1)
    }

    #[must_use]
    pub fn is_revised(&self) -> bool {
        self.version.is_some_and(|v| v > 1) || self.is_repack || self.is_rerip
    }

    /// Returns the episode number as an integer by truncating the fractional part.
    /// This is the default behavior for most operations (e.g., episode 6.5 becomes 6).
    /// Use this when you need to match against database episode records.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn episode_number_truncated(&self) -> i32 {
        self.episode_number as i32
    }

    /// Returns the episode number as an integer by rounding to the nearest whole number.
    /// Use this when you want more intuitive handling of partial episodes
    /// (e.g., episode 6.5 becomes 7 instead of 6).
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn episode_number_rounded(&self) -> i32 {
        self.episode_number.round() as i32
    }

    /// Returns true if this is a partial episode (has a fractional component).
    /// Examples: 6.5, 13.5 (often used for OVAs or specials between regular episodes)
    #[must_use]
    pub fn is_partial_episode(&self) -> bool {
        self.episode_number.fract() != 0.0
    }
}
