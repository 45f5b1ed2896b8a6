pub mod prelude;

pub mod album;
pub mod artist;
pub mod book;
pub mod chapter;
pub mod download;
pub mod episode;
pub mod import_history;
pub mod indexer;
pub mod library;
pub mod movie;
pub mod naming_template;
pub mod quality_preset;
pub mod season;
pub mod show;
pub mod track;
