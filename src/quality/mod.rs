pub mod definition;
pub mod profile;
pub mod scoring;

pub use definition::{QualitySource, QualityTier, resolve_tier};
pub use profile::{DownloadDecision, RejectReason, UpgradeReason, evaluate};
pub use scoring::{check_target_match, is_upgrade, matches_target, meets_cutoff, rank_releases, select_best_release};
