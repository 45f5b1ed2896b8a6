pub mod book;
pub mod chapter;
pub mod download;
pub mod import_history;
pub mod indexer;
pub mod library;
pub mod movie;
pub mod music;
pub mod naming_template;
pub mod quality_preset;
pub mod show;
