use crate::models::release::ParsedRelease;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QualitySource {
    Remux,
    BluRay,
    WebDl,
    WebRip,
    Hdtv,
    Pdtv,
    Dvd,
    Sdtv,
    Satellite,
    Cam,
    Unknown,
}

impl QualitySource {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Remux => "Remux",
            Self::BluRay => "Bluray",
            Self::WebDl => "WEBDL",
            Self::WebRip => "WEBRip",
            Self::Hdtv => "HDTV",
            Self::Pdtv => "PDTV",
            Self::Dvd => "DVD",
            Self::Sdtv => "SDTV",
            Self::Satellite => "Satellite",
            Self::Cam => "CAM",
            Self::Unknown => "Unknown",
        }
    }

    /// Rank used for `cutoff_source` comparisons: higher is better.
    #[must_use]
    pub const fn rank(&self) -> i32 {
        match self {
            Self::Remux => 8,
            Self::BluRay => 7,
            Self::WebDl => 6,
            Self::WebRip => 5,
            Self::Hdtv => 4,
            Self::Pdtv => 3,
            Self::Dvd => 2,
            Self::Sdtv | Self::Unknown => 1,
            Self::Satellite => 0,
            Self::Cam => -1,
        }
    }

    #[must_use]
    pub fn from_release(release: &ParsedRelease) -> Self {
        let Some(source) = release.source.as_deref() else {
            return Self::Unknown;
        };

        let upper = source.to_uppercase();
        if upper.contains("REMUX") {
            Self::Remux
        } else if upper.contains("BD") || upper.contains("BLURAY") {
            Self::BluRay
        } else if upper.contains("WEBRIP") {
            Self::WebRip
        } else if upper.contains("WEB") {
            Self::WebDl
        } else if upper.contains("CAM") {
            Self::Cam
        } else if upper.contains("SATELLITE") {
            Self::Satellite
        } else if upper.contains("PDTV") {
            Self::Pdtv
        } else if upper.contains("HDTV") {
            Self::Hdtv
        } else if upper.contains("SDTV") {
            Self::Sdtv
        } else if upper.contains("DVD") {
            Self::Dvd
        } else {
            Self::Unknown
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "remux" => Self::Remux,
            "bluray" | "bd" => Self::BluRay,
            "webdl" | "web" | "web-dl" => Self::WebDl,
            "webrip" => Self::WebRip,
            "hdtv" => Self::Hdtv,
            "pdtv" => Self::Pdtv,
            "dvd" => Self::Dvd,
            "sdtv" => Self::Sdtv,
            "satellite" | "sat" => Self::Satellite,
            "cam" => Self::Cam,
            _ => Self::Unknown,
        }
    }
}

impl std::fmt::Display for QualitySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A resolution/source pairing with a fixed base score, roughly log-spaced so that no
/// combination of modifiers can push a worse tier above a better one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityTier {
    pub resolution: u16,
    pub source: QualitySource,
    pub base_score: i64,
}

impl QualityTier {
    #[must_use]
    pub fn name(&self) -> String {
        if self.resolution == 0 {
            return "Unknown".to_string();
        }
        format!("{}-{}p", self.source, self.resolution)
    }
}

macro_rules! tier {
    ($source:expr, $res:expr, $score:expr) => {
        QualityTier {
            resolution: $res,
            source: $source,
            base_score: $score,
        }
    };
}

pub static TIERS: &[QualityTier] = &[
    tier!(QualitySource::Remux, 2160, 100_000),
    tier!(QualitySource::BluRay, 2160, 50_000),
    tier!(QualitySource::WebDl, 2160, 40_000),
    tier!(QualitySource::WebRip, 2160, 35_000),
    tier!(QualitySource::Hdtv, 2160, 25_000),
    tier!(QualitySource::Remux, 1080, 20_000),
    tier!(QualitySource::BluRay, 1080, 10_000),
    tier!(QualitySource::WebDl, 1080, 8_000),
    tier!(QualitySource::WebRip, 1080, 7_000),
    tier!(QualitySource::Hdtv, 1080, 5_000),
    tier!(QualitySource::BluRay, 720, 2_000),
    tier!(QualitySource::WebDl, 720, 1_600),
    tier!(QualitySource::WebRip, 720, 1_400),
    tier!(QualitySource::Hdtv, 720, 1_200),
    tier!(QualitySource::Dvd, 480, 1_100),
    tier!(QualitySource::Sdtv, 480, 1_050),
    tier!(QualitySource::Pdtv, 480, 1_030),
    tier!(QualitySource::Satellite, 480, 1_010),
    // PAL DVD/broadcast releases report 576 lines rather than 480; same SD bracket as the
    // NTSC tiers above.
    tier!(QualitySource::Dvd, 576, 1_100),
    tier!(QualitySource::Sdtv, 576, 1_050),
    tier!(QualitySource::Pdtv, 576, 1_030),
    tier!(QualitySource::Satellite, 576, 1_010),
    tier!(QualitySource::Unknown, 0, 1_000),
    tier!(QualitySource::Cam, 0, 100),
];

#[must_use]
pub fn resolve_tier(resolution: u16, source: QualitySource) -> QualityTier {
    TIERS
        .iter()
        .find(|t| t.resolution == resolution && t.source == source)
        .copied()
        .unwrap_or_else(|| {
            TIERS
                .iter()
                .filter(|t| t.resolution == resolution)
                .min_by_key(|t| t.source.rank())
                .copied()
                .unwrap_or(TIERS[TIERS.len() - 1])
        })
}

#[must_use]
pub fn parse_resolution(s: &str) -> u16 {
    let lower = s.to_lowercase();
    if lower.contains("2160") || lower.contains("4k") {
        2160
    } else if lower.contains("1080") {
        1080
    } else if lower.contains("720") {
        720
    } else if lower.contains("576") {
        576
    } else if lower.contains("480") {
        480
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_ordering() {
        let remux = resolve_tier(2160, QualitySource::Remux);
        let bluray = resolve_tier(2160, QualitySource::BluRay);
        assert!(remux.base_score > bluray.base_score);
    }

    #[test]
    fn test_tier_name() {
        let t = resolve_tier(1080, QualitySource::WebDl);
        assert_eq!(t.name(), "WEBDL-1080p");
    }

    #[test]
    fn test_576p_dvd_scores_as_sd_not_cam() {
        assert_eq!(parse_resolution("PAL.576p.DVDRip"), 576);
        let tier = resolve_tier(576, QualitySource::Dvd);
        assert_eq!(tier.source, QualitySource::Dvd);
        assert!(tier.base_score > resolve_tier(0, QualitySource::Cam).base_score);
    }

    #[test]
    fn test_source_rank_order() {
        assert!(QualitySource::Remux.rank() > QualitySource::BluRay.rank());
        assert!(QualitySource::BluRay.rank() > QualitySource::WebDl.rank());
        assert!(QualitySource::WebDl.rank() > QualitySource::WebRip.rank());
        assert!(QualitySource::WebRip.rank() > QualitySource::Hdtv.rank());
    }
}
