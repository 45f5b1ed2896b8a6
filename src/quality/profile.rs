use crate::entities::quality_preset;
use crate::models::release::ParsedRelease;
use crate::quality::scoring;

/// Evaluates whether `release` should be downloaded against `preset`, given the currently
/// stored release (if any) reconstructed as a synthetic `ParsedRelease`.
#[must_use]
pub fn evaluate(
    release: &ParsedRelease,
    preset: &quality_preset::Model,
    current: Option<&ParsedRelease>,
) -> DownloadDecision {
    let (accepted, score) = scoring::matches_target(release, preset);
    if !accepted {
        return DownloadDecision::Reject(RejectReason::QualityNotAllowed);
    }

    let Some(current) = current else {
        return DownloadDecision::Accept;
    };

    if !preset.auto_upgrade {
        return DownloadDecision::Reject(RejectReason::UpgradesDisabled);
    }

    let current_meets_cutoff = scoring::meets_cutoff(current, preset);

    if current_meets_cutoff && preset.cutoff_met_behavior == "stop" {
        return DownloadDecision::Reject(RejectReason::AlreadyAtCutoff);
    }

    if scoring::is_upgrade(release, current, preset) {
        if score > 0 && current.is_anime && !current.has_dual_audio && release.has_dual_audio {
            return DownloadDecision::Upgrade(UpgradeReason::DualAudio);
        }
        return DownloadDecision::Upgrade(UpgradeReason::BetterQuality);
    }

    DownloadDecision::Reject(RejectReason::NoImprovement)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadDecision {
    Accept,
    Upgrade(UpgradeReason),
    Reject(RejectReason),
}

impl DownloadDecision {
    #[must_use]
    pub const fn should_download(&self) -> bool {
        matches!(self, Self::Accept | Self::Upgrade(_))
    }

    #[must_use]
    pub const fn is_upgrade(&self) -> bool {
        matches!(self, Self::Upgrade(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpgradeReason {
    BetterQuality,
    DualAudio,
}

impl std::fmt::Display for UpgradeReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BetterQuality => write!(f, "better quality available"),
            Self::DualAudio => write!(f, "dual-audio release available"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    QualityNotAllowed,
    UpgradesDisabled,
    AlreadyAtCutoff,
    NoImprovement,
    AlreadyDownloaded,
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::QualityNotAllowed => write!(f, "quality not allowed by preset"),
            Self::UpgradesDisabled => write!(f, "upgrades disabled"),
            Self::AlreadyAtCutoff => write!(f, "already at quality cutoff"),
            Self::NoImprovement => write!(f, "no quality improvement"),
            Self::AlreadyDownloaded => write!(f, "already downloaded"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_preset() -> quality_preset::Model {
        quality_preset::Model {
            id: 1,
            name: "Default".to_string(),
            is_default: true,
            resolution: Some("1080p".to_string()),
            min_resolution: Some("480p".to_string()),
            sources: None,
            hdr_formats: None,
            codec: None,
            audio_formats: None,
            audio_channels: None,
            preferred_edition: None,
            min_seeders: None,
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
            ..Default::default()
        }
    }

    #[test]
    fn test_accept_new_download() {
        let preset = test_preset();
        let r = release("1080p", "webdl");
        assert_eq!(evaluate(&r, &preset, None), DownloadDecision::Accept);
    }

    #[test]
    fn test_upgrade_better_quality() {
        let preset = test_preset();
        let current = release("720p", "webdl");
        let new = release("1080p", "bluray");
        assert_eq!(
            evaluate(&new, &preset, Some(&current)),
            DownloadDecision::Upgrade(UpgradeReason::BetterQuality)
        );
    }

    #[test]
    fn test_reject_at_cutoff() {
        let preset = test_preset();
        let current = release("1080p", "bluray");
        let new = release("1080p", "webdl");
        assert_eq!(
            evaluate(&new, &preset, Some(&current)),
            DownloadDecision::Reject(RejectReason::AlreadyAtCutoff)
        );
    }

    #[test]
    fn test_reject_upgrades_disabled() {
        let mut preset = test_preset();
        preset.auto_upgrade = false;
        let current = release("720p", "webdl");
        let new = release("1080p", "bluray");
        assert_eq!(
            evaluate(&new, &preset, Some(&current)),
            DownloadDecision::Reject(RejectReason::UpgradesDisabled)
        );
    }

    #[test]
    fn test_reject_quality_not_allowed() {
        let preset = test_preset();
        let r = release("240p", "webdl");
        assert_eq!(
            evaluate(&r, &preset, None),
            DownloadDecision::Reject(RejectReason::QualityNotAllowed)
        );
    }
}
