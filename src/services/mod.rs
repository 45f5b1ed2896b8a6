pub mod media;
pub use media::{MediaProbe, MediaService};

pub mod scanner;
pub use scanner::Scanner;

pub mod import_pipeline;
pub use import_pipeline::ImportPipeline;

pub mod upgrade_controller;
pub use upgrade_controller::UpgradeController;

pub mod download_tracker;
pub use download_tracker::DownloadTracker;
