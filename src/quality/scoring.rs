use crate::entities::quality_preset;
use crate::models::release::ParsedRelease;
use crate::quality::definition::{self, QualitySource, QualityTier};

const HARD_REJECT_SCORE: i64 = -1000;

/// Additive modifiers layered on top of a release's base tier score.
fn modifiers(release: &ParsedRelease, preset: &quality_preset::Model) -> i64 {
    let mut score: i64 = 0;

    score += match release.hdr.as_deref() {
        Some("DV") => 20,
        Some("HDR10+") => 15,
        Some("HDR10") => 10,
        Some("HLG") => 5,
        _ => 0,
    };

    score += match release.audio_format.as_deref() {
        Some(a) if a.eq_ignore_ascii_case("ATMOS") => 20,
        Some(a) if a.eq_ignore_ascii_case("TRUEHD") => 15,
        Some(a) if a.eq_ignore_ascii_case("DTSHD") || a.eq_ignore_ascii_case("DTS-HD") => 15,
        Some(a) if a.eq_ignore_ascii_case("DTSX") || a.eq_ignore_ascii_case("DTS:X") => 15,
        Some(a) if a.eq_ignore_ascii_case("FLAC") => 10,
        Some(a) if a.eq_ignore_ascii_case("EAC3") || a.eq_ignore_ascii_case("DDP") => 5,
        Some(a) if a.eq_ignore_ascii_case("DTS") => 3,
        Some(a) if a.eq_ignore_ascii_case("AC3") || a.eq_ignore_ascii_case("DD") => 2,
        _ => 0,
    };

    score += match release.codec.as_deref() {
        Some("h265") | Some("hevc") => 5,
        Some("av1") => 5,
        Some("h264") | Some("avc") => 3,
        _ => 0,
    };

    if release.bit_depth == Some(10) {
        score += 5;
    }

    if let Some(trusted) = preset.trusted_groups.as_deref()
        && let Some(group) = release.release_group.as_deref()
        && trusted
            .split(',')
            .any(|g| g.trim().eq_ignore_ascii_case(group))
    {
        score += 5;
    }

    if release.is_proper || release.is_repack {
        score += 5;
    }

    if release.is_rerip || release.is_syncfix {
        score += 5;
    }

    if release.is_ds4k {
        score += 3;
    }

    if release.is_anime
        && let Some(v) = release.version
        && v > 1
    {
        score += 3 * i64::from(v - 1);
    }

    if preset.prefer_dual_audio && release.has_dual_audio {
        score += 10;
    }

    if let Some(seeders) = release.seeders {
        score += i64::from(seeders / 10).min(10);
    }

    let title_lower = release.title.to_lowercase();
    if title_lower.contains("fullscreen") {
        score -= 20;
    }
    if release.is_dubbed {
        score -= 10;
    }
    if title_lower.contains("fansub") {
        score -= 5;
    }

    score
}

fn is_hard_rejected(release: &ParsedRelease, preset: &quality_preset::Model) -> bool {
    let upper = release.original_filename.to_uppercase();

    if QualitySource::from_release(release) == QualitySource::Cam
        || upper.contains("CAM")
        || upper.contains("TS-")
        || upper.contains("TELESYNC")
    {
        return true;
    }
    if release.is_hardcoded_subs {
        return true;
    }
    if release.is_compressed_audio {
        return true;
    }
    if release.is_sample {
        return true;
    }
    if let Some(min_seeders) = preset.min_seeders
        && release.seeders.unwrap_or(0) < min_seeders
    {
        return true;
    }
    if let Some(min_res) = preset.min_resolution.as_deref() {
        let min = definition::parse_resolution(min_res);
        let actual = release
            .resolution
            .as_deref()
            .map_or(0, definition::parse_resolution);
        if actual < min {
            return true;
        }
    }

    false
}

fn release_tier(release: &ParsedRelease) -> QualityTier {
    let resolution = release
        .resolution
        .as_deref()
        .map_or(0, definition::parse_resolution);
    let source = QualitySource::from_release(release);
    definition::resolve_tier(resolution, source)
}

/// Applies hard-rejection rules and the minimum-resolution floor, returning the final score.
#[must_use]
pub fn matches_target(release: &ParsedRelease, preset: &quality_preset::Model) -> (bool, i64) {
    if is_hard_rejected(release, preset) {
        return (false, HARD_REJECT_SCORE);
    }

    let tier = release_tier(release);
    let score = tier.base_score + modifiers(release, preset);
    (true, score)
}

/// Verifies the release meets the preset's explicit target: resolution, source list, and
/// (when listed) HDR/audio/codec.
#[must_use]
pub fn check_target_match(release: &ParsedRelease, preset: &quality_preset::Model) -> bool {
    if let Some(target_res) = preset.resolution.as_deref() {
        let target = definition::parse_resolution(target_res);
        let actual = release
            .resolution
            .as_deref()
            .map_or(0, definition::parse_resolution);
        if actual < target {
            return false;
        }
    }

    if let Some(sources) = preset.sources.as_deref() {
        let release_source = QualitySource::from_release(release);
        let allowed = sources
            .split(',')
            .map(|s| QualitySource::parse(s.trim()))
            .any(|s| s == release_source);
        if !allowed {
            return false;
        }
    }

    if let Some(hdr_formats) = preset.hdr_formats.as_deref() {
        let matches = release
            .hdr
            .as_deref()
            .is_some_and(|hdr| hdr_formats.split(',').any(|h| h.trim().eq_ignore_ascii_case(hdr)));
        if !matches {
            return false;
        }
    }

    if let Some(audio_formats) = preset.audio_formats.as_deref() {
        let matches = release.audio_format.as_deref().is_some_and(|a| {
            audio_formats.split(',').any(|f| f.trim().eq_ignore_ascii_case(a))
        });
        if !matches {
            return false;
        }
    }

    if let Some(codec) = preset.codec.as_deref()
        && !release
            .codec
            .as_deref()
            .is_some_and(|c| c.eq_ignore_ascii_case(codec))
    {
        return false;
    }

    true
}

/// Resolution and source rank both at or above the preset's cutoff.
#[must_use]
pub fn meets_cutoff(release: &ParsedRelease, preset: &quality_preset::Model) -> bool {
    let actual_res = release
        .resolution
        .as_deref()
        .map_or(0, definition::parse_resolution);
    let cutoff_res = preset
        .cutoff_resolution
        .as_deref()
        .map_or(0, definition::parse_resolution);
    if actual_res < cutoff_res {
        return false;
    }

    let actual_source = QualitySource::from_release(release);
    let cutoff_source = preset
        .cutoff_source
        .as_deref()
        .map_or(QualitySource::Unknown, QualitySource::parse);

    actual_source.rank() >= cutoff_source.rank()
}

#[derive(Debug, Clone)]
pub struct RankedRelease<'a> {
    pub release: &'a ParsedRelease,
    pub meets_cutoff: bool,
    pub matches_target: bool,
    pub score: i64,
}

/// Ranks by (1) meets-cutoff desc, (2) matches-target desc, (3) score desc.
#[must_use]
pub fn rank_releases<'a>(
    candidates: &'a [ParsedRelease],
    preset: &quality_preset::Model,
) -> Vec<RankedRelease<'a>> {
    let mut ranked: Vec<RankedRelease<'a>> = candidates
        .iter()
        .map(|release| {
            let (accepted, score) = matches_target(release, preset);
            RankedRelease {
                release,
                meets_cutoff: accepted && meets_cutoff(release, preset),
                matches_target: accepted && check_target_match(release, preset),
                score,
            }
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.meets_cutoff
            .cmp(&a.meets_cutoff)
            .then(b.matches_target.cmp(&a.matches_target))
            .then(b.score.cmp(&a.score))
    });

    ranked
}

#[must_use]
pub fn select_best_release<'a>(
    candidates: &'a [ParsedRelease],
    preset: &quality_preset::Model,
) -> Option<&'a ParsedRelease> {
    rank_releases(candidates, preset)
        .into_iter()
        .next()
        .map(|r| r.release)
}

/// Scores a synthetic release built from stored current-file fields and returns true iff the
/// new release's score strictly exceeds it.
#[must_use]
pub fn is_upgrade(
    new_release: &ParsedRelease,
    current: &ParsedRelease,
    preset: &quality_preset::Model,
) -> bool {
    let (_, new_score) = matches_target(new_release, preset);
    let (_, current_score) = matches_target(current, preset);
    new_score > current_score
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_preset() -> quality_preset::Model {
        quality_preset::Model {
            id: 1,
            name: "Test".to_string(),
            is_default: true,
            resolution: Some("1080p".to_string()),
            min_resolution: Some("720p".to_string()),
            sources: Some("webdl,bluray".to_string()),
            hdr_formats: None,
            codec: None,
            audio_formats: None,
            audio_channels: None,
            preferred_edition: None,
            min_seeders: Some(1),
            cutoff_resolution: Some("1080p".to_string()),
            cutoff_source: Some("bluray".to_string()),
            cutoff_met_behavior: "stop".to_string(),
            auto_upgrade: true,
            prefer_smaller_size: false,
            prefer_dual_audio: false,
            trusted_groups: None,
        }
    }

    fn release(resolution: &str, source: &str) -> ParsedRelease {
        ParsedRelease {
            resolution: Some(resolution.to_string()),
            source: Some(source.to_string()),
            seeders: Some(10),
            ..Default::default()
        }
    }

    #[test]
    fn test_reject_below_min_resolution() {
        let preset = test_preset();
        let r = release("480p", "webdl");
        let (accepted, score) = matches_target(&r, &preset);
        assert!(!accepted);
        assert_eq!(score, HARD_REJECT_SCORE);
    }

    #[test]
    fn test_reject_sample() {
        let preset = test_preset();
        let mut r = release("1080p", "webdl");
        r.is_sample = true;
        let (accepted, _) = matches_target(&r, &preset);
        assert!(!accepted);
    }

    #[test]
    fn test_meets_cutoff() {
        let preset = test_preset();
        let r = release("1080p", "bluray");
        assert!(meets_cutoff(&r, &preset));

        let lower = release("1080p", "webdl");
        assert!(!meets_cutoff(&lower, &preset));
    }

    #[test]
    fn test_check_target_match() {
        let preset = test_preset();
        let r = release("1080p", "webdl");
        assert!(check_target_match(&r, &preset));

        let wrong_source = release("1080p", "hdtv");
        assert!(!check_target_match(&wrong_source, &preset));
    }

    #[test]
    fn test_is_upgrade() {
        let preset = test_preset();
        let current = release("720p", "webdl");
        let new = release("1080p", "bluray");
        assert!(is_upgrade(&new, &current, &preset));
        assert!(!is_upgrade(&current, &new, &preset));
    }

    #[test]
    fn test_atmos_outscores_plain_dd() {
        let preset = test_preset();
        let mut atmos = release("1080p", "webdl");
        atmos.audio_format = Some("ATMOS".to_string());
        let mut dd = release("1080p", "webdl");
        dd.audio_format = Some("AC3".to_string());
        let (_, atmos_score) = matches_target(&atmos, &preset);
        let (_, dd_score) = matches_target(&dd, &preset);
        assert!(atmos_score > dd_score);
    }

    #[test]
    fn test_cam_hard_rejected_via_source_field() {
        let preset = test_preset();
        let mut r = release("1080p", "cam");
        r.original_filename = "Some.Movie.2024.1080p.x264-GROUP.mkv".to_string();
        let (accepted, score) = matches_target(&r, &preset);
        assert!(!accepted);
        assert_eq!(score, HARD_REJECT_SCORE);
    }

    #[test]
    fn test_pdtv_and_satellite_tier_below_dvd() {
        let r_dvd = release("480p", "dvd");
        let r_pdtv = release("480p", "pdtv");
        let r_sat = release("480p", "satellite");
        assert!(release_tier(&r_dvd).base_score > release_tier(&r_pdtv).base_score);
        assert!(release_tier(&r_pdtv).base_score > release_tier(&r_sat).base_score);
    }

    #[test]
    fn test_select_best_release() {
        let preset = test_preset();
        let candidates = vec![release("720p", "webdl"), release("1080p", "bluray"), release("1080p", "webdl")];
        let best = select_best_release(&candidates, &preset).unwrap();
        assert_eq!(best.source.as_deref(), Some("bluray"));
    }
}
