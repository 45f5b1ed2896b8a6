pub use super::album::Entity as Album;
pub use super::artist::Entity as Artist;
pub use super::book::Entity as Book;
pub use super::chapter::Entity as Chapter;
pub use super::download::Entity as Download;
pub use super::episode::Entity as Episode;
pub use super::import_history::Entity as ImportHistory;
pub use super::indexer::Entity as Indexer;
pub use super::library::Entity as Library;
pub use super::movie::Entity as Movie;
pub use super::naming_template::Entity as NamingTemplate;
pub use super::quality_preset::Entity as QualityPreset;
pub use super::season::Entity as Season;
pub use super::show::Entity as Show;
pub use super::track::Entity as Track;
