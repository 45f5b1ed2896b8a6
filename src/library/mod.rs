pub mod recycle;

use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub use recycle::RecycleBin;

/// Fields substitutable into a folder/file naming template. Any combination may be
/// blank; unset placeholders render as an empty string before `cleanup_path` collapses
/// the resulting doubled separators.
#[derive(Debug, Clone, Default)]
pub struct NamingContext<'a> {
    pub title: &'a str,
    pub year: Option<i32>,
    pub season: Option<i32>,
    pub episode: Option<i32>,
    pub episode_title: Option<&'a str>,
    pub resolution: Option<&'a str>,
    pub source: Option<&'a str>,
    pub codec: Option<&'a str>,
    pub air_date: Option<&'a str>,
}

/// Renders a naming template (see the naming template grammar: `{Title}`, `{Year}`,
/// `{Season:00}`, `{Episode:00}`, `{EpisodeTitle}`, `{Resolution}`, `{Source}`,
/// `{Codec}`, `{Air-Date}`) against a context, sanitizing each substituted value for
/// filesystem safety and collapsing any doubled separators left by unset placeholders.
#[must_use]
pub fn render_template(template: &str, ctx: &NamingContext<'_>) -> String {
    let season_pad = ctx.season.map(|s| format!("{s:02}")).unwrap_or_default();
    let episode_pad = ctx.episode.map(|e| format!("{e:02}")).unwrap_or_default();

    let rendered = template
        .replace("{Title}", &sanitize_filename(ctx.title))
        .replace(
            "{Year}",
            &ctx.year.map(|y| y.to_string()).unwrap_or_default(),
        )
        .replace("{Season:00}", &season_pad)
        .replace("{Episode:00}", &episode_pad)
        .replace(
            "{EpisodeTitle}",
            &ctx.episode_title.map(sanitize_filename).unwrap_or_default(),
        )
        .replace("{Resolution}", ctx.resolution.unwrap_or_default())
        .replace("{Source}", ctx.source.unwrap_or_default())
        .replace("{Codec}", ctx.codec.unwrap_or_default())
        .replace("{Air-Date}", ctx.air_date.unwrap_or_default());

    cleanup_path(rendered)
}

fn cleanup_path(path: String) -> String {
    let mut p = path;
    let mut prev_len = 0;

    while p.len() != prev_len {
        prev_len = p.len();
        p = p
            .replace("[]", "")
            .replace("()", "")
            .replace("  ", " ")
            .replace(" - - ", " - ")
            .replace(" .", ".");
    }

    let p = p.trim();
    let p = p.trim_end_matches(" - ").trim_end_matches('-');
    let p = p.trim_start_matches(" - ").trim_start_matches('-');

    p.trim().to_string()
}

fn sanitize_filename(name: &str) -> String {
    name.replace(['/', '\\', ':', '*', '?', '"', '<', '>', '|'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Moves `source` to `destination`, renaming (same filesystem) first and falling back
/// to a copy-then-delete when the rename fails (e.g. a cross-device move).
pub async fn move_into_place(source: &Path, destination: &Path) -> Result<()> {
    if let Some(parent) = destination.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    info!("Importing {:?} -> {:?}", source, destination);

    if tokio::fs::rename(source, destination).await.is_ok() {
        return Ok(());
    }

    warn!("Rename failed (likely cross-device), falling back to copy: {:?}", source);
    tokio::fs::copy(source, destination).await?;
    tokio::fs::remove_file(source).await?;
    Ok(())
}

#[must_use]
pub fn with_extension(path: PathBuf, extension: &str) -> PathBuf {
    path.with_extension(extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_movie_template() {
        let ctx = NamingContext {
            title: "Some Movie",
            year: Some(2024),
            resolution: Some("1080p"),
            source: Some("BluRay"),
            ..Default::default()
        };
        let rendered = render_template("{Title} ({Year}) [{Resolution} {Source}]", &ctx);
        assert_eq!(rendered, "Some Movie (2024) [1080p BluRay]");
    }

    #[test]
    fn renders_episode_template_with_zero_padding() {
        let ctx = NamingContext {
            title: "Some Show",
            season: Some(2),
            episode: Some(5),
            episode_title: Some("The Episode"),
            ..Default::default()
        };
        let rendered = render_template(
            "{Title} - S{Season:00}E{Episode:00} - {EpisodeTitle}",
            &ctx,
        );
        assert_eq!(rendered, "Some Show - S02E05 - The Episode");
    }

    #[test]
    fn collapses_empty_bracket_groups_from_unset_placeholders() {
        let ctx = NamingContext {
            title: "Title Only",
            ..Default::default()
        };
        let rendered = render_template("{Title} [{Resolution}]", &ctx);
        assert_eq!(rendered, "Title Only");
    }
}
