use crate::models::release::ParsedRelease;
use regex::{Captures, Regex};
use std::sync::OnceLock;

#[must_use]
pub fn parse_filename(filename: &str) -> Option<ParsedRelease> {
    parse_standard_bracket(filename)
        .or_else(|| parse_sxxexx_bracket(filename))
        .or_else(|| parse_simple_sxxexx(filename))
        .or_else(|| parse_plex_format(filename))
        .or_else(|| parse_dot_separated(filename))
        .or_else(|| parse_dot_separated_range(filename))
        .or_else(|| parse_group_at_end(filename))
        .or_else(|| parse_fallback(filename))
        .or_else(|| parse_movie_title(filename))
        .map(|mut release| {
            apply_tag_fields(&mut release, filename);
            release
        })
}

fn get_regex(re: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    re.get_or_init(|| Regex::new(pattern).expect("Invalid regex pattern defined in code"))
}

fn parse_standard_bracket(filename: &str) -> Option<ParsedRelease> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = get_regex(
        &RE,
        r"^\[(?P<group>[^\]]+)\]\s*(?P<title>.+?)\s*-\s*(?P<episode>\d+(?:\.\d+)?)(?:-(?P<episode_end>\d+))?\s*(?:v(?P<version>\d+))?\s*(?:(?:\[(?P<tags>[^\]]*)\])|(?:\((?P<tags_paren>[^)]*)\)))?.*$",
    );

    let caps = re.captures(filename)?;
    extract_common_fields(&caps, filename, true)
}

fn parse_sxxexx_bracket(filename: &str) -> Option<ParsedRelease> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = get_regex(
        &RE,
        r"^\[(?P<group>[^\]]+)\]\s*(?P<title>.+?)\s*-?\s*S(?P<season>\d+)E(?P<episode>\d+(?:\.\d+)?)(?:-E?(?P<episode_end>\d+))?\s*(?:v(?P<version>\d+))?\s*(?:\[(?P<tags>[^\]]*)\])?.*$",
    );

    let caps = re.captures(filename)?;
    extract_common_fields(&caps, filename, true)
}

fn parse_simple_sxxexx(filename: &str) -> Option<ParsedRelease> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = get_regex(
        &RE,
        r"^(?P<title>.+?)\s*-\s*S(?P<season>\d+)E(?P<episode>\d+(?:\.\d+)?)(?:\s*-\s*.+)?.*$",
    );

    let caps = re.captures(filename)?;
    let title = caps.name("title")?.as_str().trim();

    if title.ends_with(')')
        && title
            .chars()
            .nth(title.len().saturating_sub(2))
            .is_some_and(char::is_numeric)
    {
        return None;
    }

    let mut release = extract_common_fields(&caps, filename, false)?;
    release.resolution = extract_resolution(filename);
    release.source = extract_source(filename);
    release.release_group = extract_group_from_rest(filename);

    Some(release)
}

fn parse_plex_format(filename: &str) -> Option<ParsedRelease> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = get_regex(
        &RE,
        r"^(?P<title>.+?)\s*(?:\((?P<year>\d{4})\))?\s*-\s*S(?P<season>\d+)E(?P<episode>\d+(?:\.\d+)?)\s*(?:-\s*.+?)?\s*(?:\[(?P<tags>[^\]]*)\])*.*$",
    );

    let caps = re.captures(filename)?;

    let mut release = extract_common_fields(&caps, filename, false)?;
    release.resolution = extract_resolution(filename);
    release.source = extract_source(filename);
    release.release_group = extract_group_from_rest(filename);

    Some(release)
}

fn parse_dot_separated(filename: &str) -> Option<ParsedRelease> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = get_regex(
        &RE,
        r"^(?P<title>.+?)\.S(?P<season>\d+)E(?P<episode>\d+(?:\.\d+)?)\.(?P<rest>.+)$",
    );

    let caps = re.captures(filename)?;

    let title_raw = caps.name("title")?.as_str();
    let title_clean = title_raw.replace('.', " ");

    let episode_number = caps.name("episode")?.as_str().parse::<f32>().ok()?;
    let season = caps.name("season").and_then(|m| m.as_str().parse().ok());
    let rest = caps.name("rest").map_or("", |m| m.as_str());

    Some(ParsedRelease {
        original_filename: filename.to_string(),
        title: clean_title(&title_clean),
        episode_number,
        season,
        release_group: extract_group_from_rest(rest),
        resolution: extract_resolution(rest),
        source: extract_source(rest),
        year: extract_year(title_raw),
        ..Default::default()
    })
}

/// Dot-separated title with a dash-joined multi-episode range, e.g.
/// `The.Expanse.S03E04-E05.2160p...`. `parse_dot_separated` requires a literal `.`
/// immediately after the episode digits, so it never matches a `-E05` range; this
/// variant accepts an optional `-E?NN` tail before the rest of the release tags.
fn parse_dot_separated_range(filename: &str) -> Option<ParsedRelease> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = get_regex(
        &RE,
        r"^(?P<title>.+?)\.S(?P<season>\d+)E(?P<episode>\d+)-E?(?P<episode_end>\d+)(?:\.(?P<rest>.+))?$",
    );

    let caps = re.captures(filename)?;

    let title_raw = caps.name("title")?.as_str();
    let title_clean = title_raw.replace('.', " ");

    let episode_number = caps.name("episode")?.as_str().parse::<f32>().ok()?;
    let episode_end = caps.name("episode_end").and_then(|m| m.as_str().parse().ok());
    let season = caps.name("season").and_then(|m| m.as_str().parse().ok());
    let rest = caps.name("rest").map_or("", |m| m.as_str());

    Some(ParsedRelease {
        original_filename: filename.to_string(),
        title: clean_title(&title_clean),
        episode_number,
        episode_end,
        season,
        release_group: extract_group_from_rest(rest),
        resolution: extract_resolution(rest),
        source: extract_source(rest),
        year: extract_year(title_raw),
        ..Default::default()
    })
}

fn parse_group_at_end(filename: &str) -> Option<ParsedRelease> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = get_regex(
        &RE,
        r"^(?P<title>.+?)\s*-\s*(?P<episode>\d+(?:\.\d+)?)\s*(?:v(?P<version>\d+))?\s*(?:\((?P<tags>[^)]*)\))?\s*\[(?P<group>[^\]]+)\].*$",
    );

    let caps = re.captures(filename)?;
    extract_common_fields(&caps, filename, true)
}

fn parse_fallback(filename: &str) -> Option<ParsedRelease> {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    let name = filename.rsplit_once('.').map_or(filename, |(name, _)| name);

    let patterns = PATTERNS.get_or_init(|| {
        vec![
            Regex::new(
                r"-\s*(?P<episode>\d{1,4}(?:\.\d+)?)\s*(?:v(?P<version>\d+))?(?:\s|$|\[|\()",
            )
            .expect("Invalid Regex"),
            Regex::new(
                r"[Ee](?:p(?:isode)?)?\s*(?P<episode>\d{1,4}(?:\.\d+)?)\s*(?:v(?P<version>\d+))?",
            )
            .expect("Invalid Regex"),
            Regex::new(r"[_\s](?P<episode>\d{1,3}(?:\.\d+)?)\s*(?:v(?P<version>\d+))?[_\s\[\(]")
                .expect("Invalid Regex"),
        ]
    });

    for pattern in patterns {
        if let Some(caps) = pattern.captures_iter(name).last() {
            let episode_str = caps.name("episode")?.as_str();
            let episode_number = episode_str.parse::<f32>().ok()?;

            #[allow(clippy::cast_possible_truncation)]
            let ep_int = episode_number as i32;
            if (1990..=2099).contains(&ep_int) || [720, 1080, 2160, 480].contains(&ep_int) {
                continue;
            }

            let version = caps.name("version").and_then(|m| m.as_str().parse().ok());

            let title = extract_title_before_episode(name, episode_str)
                .unwrap_or_else(|| "Unknown".to_string());

            return Some(ParsedRelease {
                original_filename: filename.to_string(),
                title: clean_title(&title),
                episode_number,
                season: detect_season_from_title(&title),
                release_group: extract_bracket_group(filename),
                resolution: extract_resolution(filename),
                source: extract_source(filename),
                year: extract_year(&title),
                version,
                ..Default::default()
            });
        }
    }
    None
}

/// Last-resort parse for titles that carry no episode marker at all - a plain movie
/// release such as `Inception (2010).1080p.BluRay.x264-GROUP`. Title is everything
/// before the year (parenthesized or dot/space-delimited) or, failing that, before
/// the first recognized quality tag. Unlike the episode-oriented branches above this
/// never fails to match: an unparseable filename still yields a title (the cleaned
/// filename itself), since downstream code treats missing fields as unknown rather
/// than erroring.
fn parse_movie_title(filename: &str) -> Option<ParsedRelease> {
    let stem = filename.rsplit_once('.').map_or(filename, |(name, _)| name);

    static RE_PAREN_YEAR: OnceLock<Regex> = OnceLock::new();
    let re_paren = get_regex(&RE_PAREN_YEAR, r"^(?P<title>.+?)\s*\((?P<year>\d{4})\)");

    static RE_DOT_YEAR: OnceLock<Regex> = OnceLock::new();
    let re_dot = get_regex(&RE_DOT_YEAR, r"^(?P<title>.+?)[.\s](?P<year>(?:19|20)\d{2})(?:[.\s]|$)");

    let (title_raw, year) = if let Some(caps) = re_paren.captures(stem) {
        (caps.name("title")?.as_str().to_string(), caps.name("year").and_then(|m| m.as_str().parse().ok()))
    } else if let Some(caps) = re_dot.captures(stem) {
        (caps.name("title")?.as_str().to_string(), caps.name("year").and_then(|m| m.as_str().parse().ok()))
    } else {
        (title_before_first_tag(stem), None)
    };

    let cleaned = clean_title(&title_raw.replace(['.', '_'], " "));
    let title = if cleaned.is_empty() { "Unknown".to_string() } else { cleaned };

    Some(ParsedRelease {
        original_filename: filename.to_string(),
        title,
        year,
        ..Default::default()
    })
}

/// Everything before the first resolution/source/codec token, used when a movie release
/// carries no recognizable year at all.
fn title_before_first_tag(stem: &str) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = get_regex(
        &RE,
        r"(?i)(2160p|1080p|720p|480p|576p|4K|BD|Blu-?Ray|Remux|WEB-?(?:Rip|DL)?|HDTV|DVDRip|BDRip|WEBRip|x264|x265|h\.?264|h\.?265|hevc|av1)",
    );
    re.find(stem).map_or_else(|| stem.to_string(), |m| stem[..m.start()].to_string())
}

// Helper to consolidate common extraction logic
fn extract_common_fields(
    caps: &Captures,
    filename: &str,
    has_group_in_caps: bool,
) -> Option<ParsedRelease> {
    let title = caps.name("title")?.as_str().trim().to_string();
    let episode_number = caps.name("episode")?.as_str().parse::<f32>().ok()?;
    let episode_end = caps.name("episode_end").and_then(|m| m.as_str().parse().ok());

    let group = if has_group_in_caps {
        caps.name("group").map(|m| m.as_str().trim().to_string())
    } else {
        None
    };

    let season = caps
        .name("season")
        .and_then(|m| m.as_str().parse().ok())
        .or_else(|| detect_season_from_title(&title));

    let version = caps.name("version").and_then(|m| m.as_str().parse().ok());

    let tags = caps
        .name("tags")
        .map(|m| m.as_str())
        .or_else(|| caps.name("tags_paren").map(|m| m.as_str()));

    let resolution = tags.and_then(extract_resolution);
    let source = tags.and_then(extract_source);
    let year = caps
        .name("year")
        .and_then(|m| m.as_str().parse().ok())
        .or_else(|| extract_year(&title));

    Some(ParsedRelease {
        original_filename: filename.to_string(),
        title: clean_title(&title),
        episode_number,
        episode_end,
        season,
        release_group: group,
        resolution,
        source,
        year,
        version,
        ..Default::default()
    })
}

/// Fields that don't depend on which cascade branch matched: tie-break against the whole
/// filename regardless of which regex produced the release.
fn apply_tag_fields(release: &mut ParsedRelease, filename: &str) {
    if release.resolution.is_none() {
        release.resolution = extract_resolution(filename);
    }
    if release.source.is_none() {
        release.source = extract_source(filename);
    }
    if release.release_group.is_none() {
        release.release_group = extract_bracket_group(filename).or_else(|| extract_group_from_rest(filename));
    }

    release.codec = extract_codec(filename);
    release.audio_format = extract_audio_format(filename);
    release.audio_channels = extract_audio_channels(filename);
    release.bit_depth = extract_bit_depth(filename);
    release.hdr = extract_hdr(filename);
    release.edition = extract_edition(filename);
    release.container = extract_container(filename);
    release.absolute = extract_absolute_number(filename, release.episode_number);

    let upper = filename.to_uppercase();
    release.is_proper = upper.contains("PROPER");
    release.is_repack = upper.contains("REPACK");
    release.is_rerip = upper.contains("RERIP") || upper.contains("RE-RIP");
    release.is_syncfix = upper.contains("SYNCFIX") || upper.contains("SYNC FIX");
    release.is_ds4k = upper.contains("DS4K");
    release.is_upscaled = upper.contains("UPSCALE");
    release.is_sample = upper.contains("SAMPLE");
    release.is_disc = upper.contains("BDMV") || upper.contains("ISO") || upper.contains("VOB");
    release.is_archive = [".ZIP", ".RAR", ".7Z"].iter().any(|ext| upper.ends_with(ext));
    release.is_compressed_audio = ["MP3", "AAC", "OPUS", "VORBIS"]
        .iter()
        .any(|c| upper.contains(c));
    release.is_hardcoded_subs = upper.contains("HARDSUB") || upper.contains("HC");
    release.is_dubbed = upper.contains("DUAL AUDIO") || upper.contains("DUB");
    release.has_dual_audio = upper.contains("DUAL AUDIO") || upper.contains("DUAL-AUDIO");
    release.has_soft_subs = upper.contains("SOFTSUB") || upper.contains("MULTI-SUB");
    release.is_anime = release.release_group.is_some() && filename.trim_start().starts_with('[');
}

fn extract_resolution(s: &str) -> Option<String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = get_regex(&RE, r"(?i)(4K|2160p|1080p|720p|480p|576p)");

    re.find(s).map(|m| {
        let res = m.as_str();
        if res.eq_ignore_ascii_case("4K") {
            "4K".to_string()
        } else {
            res.to_lowercase()
        }
    })
}

fn extract_source(s: &str) -> Option<String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = get_regex(
        &RE,
        r"(?i)(Blu-?Ray|Remux|WEB-?(?:Rip|DL)?|HDTV|PDTV|DVDRip|BDRip|BD|WEBRip|DVD|CAM|Satellite|SATRip|AMZN|CR|DSNP|NF|HMAX)",
    );

    re.find(s).map(|m| {
        let src = m.as_str();
        if src.eq_ignore_ascii_case("BluRay") || src.eq_ignore_ascii_case("Blu-Ray") {
            "BD".to_string()
        } else if src.eq_ignore_ascii_case("Remux") {
            "REMUX".to_string()
        } else if src.eq_ignore_ascii_case("WEBRip") || src.eq_ignore_ascii_case("WEB-Rip") {
            "WEBRIP".to_string()
        } else if src.eq_ignore_ascii_case("WEBDL")
            || src.eq_ignore_ascii_case("WEB-DL")
            || src.eq_ignore_ascii_case("WEB")
        {
            "WEB".to_string()
        } else if src.eq_ignore_ascii_case("Satellite") || src.eq_ignore_ascii_case("SATRip") {
            "SATELLITE".to_string()
        } else {
            src.to_uppercase()
        }
    })
}

fn extract_codec(s: &str) -> Option<String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = get_regex(&RE, r"(?i)(x264|x265|h\.?264|h\.?265|hevc|avc|av1|vp9)");

    re.find(s).map(|m| {
        let c = m.as_str().to_lowercase().replace('.', "");
        match c.as_str() {
            "x264" | "h264" | "avc" => "h264".to_string(),
            "x265" | "h265" | "hevc" => "h265".to_string(),
            other => other.to_string(),
        }
    })
}

fn extract_audio_format(s: &str) -> Option<String> {
    static RE_ATMOS: OnceLock<Regex> = OnceLock::new();
    let re_atmos = get_regex(&RE_ATMOS, r"(?i)atmos");
    if re_atmos.is_match(s) {
        return Some("ATMOS".to_string());
    }

    static RE: OnceLock<Regex> = OnceLock::new();
    let re = get_regex(&RE, r"(?i)(TrueHD|DTS-HD|DTS-X|DTS|E-?AC-?3|AC-?3|FLAC|Opus|AAC)");

    re.find(s).map(|m| m.as_str().to_uppercase().replace('-', ""))
}

fn extract_audio_channels(s: &str) -> Option<String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = get_regex(&RE, r"(?i)\b([1-7]\.[01])\b");
    re.find(s).map(|m| m.as_str().to_string())
}

fn extract_bit_depth(s: &str) -> Option<i32> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = get_regex(&RE, r"(?i)\b(8|10|12)\s*-?\s*bit\b");
    re.captures(s)?.get(1)?.as_str().parse().ok()
}

fn extract_hdr(s: &str) -> Option<String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = get_regex(&RE, r"(?i)(HDR10\+|HDR10|HDR|Dolby ?Vision|DV)");
    re.find(s).map(|m| {
        let hdr = m.as_str();
        if hdr.eq_ignore_ascii_case("DV") || hdr.to_lowercase().contains("dolby") {
            "DV".to_string()
        } else {
            hdr.to_uppercase()
        }
    })
}

fn extract_edition(s: &str) -> Option<String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = get_regex(
        &RE,
        r"(?i)(Director'?s ?Cut|Extended|Unrated|Theatrical|Criterion|Remastered|IMAX)",
    );
    re.find(s).map(|m| m.as_str().to_string())
}

fn extract_container(s: &str) -> Option<String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = get_regex(&RE, r"(?i)\.(mkv|mp4|avi|m2ts|ts|flac|mp3|epub|mobi|cbz|cbr)$");
    re.captures(s)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_lowercase())
}

/// A bare 3-4 digit number elsewhere in the filename that differs from the matched episode
/// number is assumed to be the anime absolute episode count, never a year (4-digit numbers
/// in the 1990-2099 range are excluded, matching the fallback parser's own year guard).
fn extract_absolute_number(s: &str, episode_number: f32) -> Option<i32> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = get_regex(&RE, r"(?i)\bE(\d{2,4})\b");

    #[allow(clippy::cast_possible_truncation)]
    let ep_int = episode_number as i32;

    for caps in re.captures_iter(s) {
        if let Ok(n) = caps[1].parse::<i32>()
            && n != ep_int
            && !(1990..=2099).contains(&n)
        {
            return Some(n);
        }
    }
    None
}

fn extract_year(s: &str) -> Option<i32> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = get_regex(&RE, r"\((\d{4})\)");
    re.captures(s)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .filter(|y| (1900..=2099).contains(y))
}

fn extract_bracket_group(s: &str) -> Option<String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = get_regex(&RE, r"^\[([^\]]+)\]");

    re.captures(s)
        .and_then(|c| c.get(1).map(|m| m.as_str().trim().to_string()))
}

fn extract_group_from_rest(s: &str) -> Option<String> {
    if let Some(pos) = s.rfind('-') {
        let rest = &s[pos + 1..].trim();
        let path = std::path::Path::new(rest);
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or(rest);

        if stem.contains('[') && stem.contains(']') {
            static RE_BRACKETS: OnceLock<Regex> = OnceLock::new();
            let re = get_regex(&RE_BRACKETS, r"\[([^\]]+)\]");

            let matches: Vec<_> = re
                .captures_iter(stem)
                .filter_map(|c| c.get(1).map(|m| m.as_str().trim()))
                .collect();

            for val in matches.iter().rev() {
                let clean_val = val.trim_start_matches('[');
                if !is_metadata(clean_val) {
                    return Some(clean_val.to_string());
                }
            }
        }

        if !stem.is_empty() && !stem.starts_with('[') && !is_metadata(stem) {
            return Some(stem.to_string());
        }
    }
    None
}

fn is_metadata(s: &str) -> bool {
    if extract_resolution(s).is_some() {
        return true;
    }
    if extract_source(s).is_some() {
        return true;
    }
    let upper = s.to_uppercase();
    [
        "X264", "X265", "HEVC", "AV1", "AAC", "FLAC", "AC3", "EAC3", "DTS", "TRUEHD", "OPUS",
        "H.264", "H.265", "10BIT", "HDR", "REMUX", "DV",
    ]
    .contains(&upper.as_str())
}

fn extract_title_before_episode(filename: &str, episode_str: &str) -> Option<String> {
    let pos = filename.find(episode_str)?;
    let before = &filename[..pos];

    let title = before.trim_end_matches(|c: char| c == '-' || c == '_' || c.is_whitespace());

    let title = if title.starts_with('[') {
        title.find(']').map_or(title, |end| title[end + 1..].trim())
    } else {
        title
    };

    if title.is_empty() {
        None
    } else {
        Some(title.to_string())
    }
}

pub fn detect_season_from_title(title: &str) -> Option<i32> {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    let patterns = PATTERNS.get_or_init(|| {
        vec![
            Regex::new(r"(?i)\b(?:Season|S)\s*(\d+)\b").expect("Invalid Regex"),
            Regex::new(r"(?i)\b(\d+)(?:st|nd|rd|th)\s+Season\b").expect("Invalid Regex"),
            Regex::new(r"(?i)\bPart\s+(\d+|I{1,3}V?|VI{0,3})\b").expect("Invalid Regex"),
            Regex::new(r"(?i)\bCour\s+(\d+)\b").expect("Invalid Regex"),
            Regex::new(r"\b(I{2,3}V?|VI{0,3})\s*$").expect("Invalid Regex"),
        ]
    });

    for pattern in patterns {
        if let Some(caps) = pattern.captures(title)
            && let Some(m) = caps.get(1)
        {
            let num_str = m.as_str();

            if let Ok(n) = num_str.parse::<i32>() {
                return Some(n);
            }

            if let Some(n) = roman_to_int(num_str) {
                return Some(n);
            }
        }
    }

    None
}

fn roman_to_int(s: &str) -> Option<i32> {
    let s = s.to_uppercase();
    match s.as_str() {
        "I" => Some(1),
        "II" => Some(2),
        "III" => Some(3),
        "IV" => Some(4),
        "V" => Some(5),
        "VI" => Some(6),
        "VII" => Some(7),
        "VIII" => Some(8),
        "IX" => Some(9),
        "X" => Some(10),
        _ => None,
    }
}

#[must_use]
pub fn clean_title(title: &str) -> String {
    let mut title = title.trim().trim_end_matches(['-', '_']).trim();

    if let Some(idx) = title.rfind('(')
        && let Some(end) = title.rfind(')')
        && end > idx
    {
        let inside = &title[idx + 1..end];
        if inside.len() == 4 && inside.chars().all(|c| c.is_ascii_digit()) {
            title = title[..idx].trim();
        }
    }

    let mut result = String::with_capacity(title.len());
    let mut last_was_space = true;
    for c in title.chars() {
        let is_sep = c.is_whitespace() || c == '_';
        if is_sep {
            if !last_was_space {
                result.push(' ');
                last_was_space = true;
            }
        } else {
            result.push(c);
            last_was_space = false;
        }
    }

    if result.ends_with(' ') {
        result.pop();
    }

    result
}

pub fn normalize_title(title: &str) -> String {
    static NORMALIZE_PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();

    let title = clean_title(title);

    let patterns = NORMALIZE_PATTERNS.get_or_init(|| {
        vec![
            Regex::new(r"(?i)\s*\d+(?:st|nd|rd|th)\s+Season\s*$").expect("Invalid Regex"),
            Regex::new(r"(?i)\s*(?:Season|S)\s*\d+\s*$").expect("Invalid Regex"),
            Regex::new(r"(?i)\s*Part\s+(?:\d+|I{1,3}V?|VI{0,3})\s*$").expect("Invalid Regex"),
            Regex::new(r"(?i)\s*Cour\s+\d+\s*$").expect("Invalid Regex"),
            Regex::new(r"\s+(?:I{2,3}V?|VI{0,3})\s*$").expect("Invalid Regex"),
            Regex::new(r"\s*\(\d{4}\)\s*$").expect("Invalid Regex"),
            Regex::new(r"\s*[:–—-]\s*$").expect("Invalid Regex"),
        ]
    });

    let mut result = title;
    for pattern in patterns {
        result = pattern.replace_all(&result, "").to_string();
    }

    let mut cleaned = String::with_capacity(result.len());
    let mut last_was_space = false;
    for c in result.chars() {
        if c.is_whitespace() {
            if !last_was_space {
                cleaned.push(' ');
                last_was_space = true;
            }
        } else {
            cleaned.push(c);
            last_was_space = false;
        }
    }

    cleaned.trim().to_string()
}

#[must_use]
pub fn normalize_for_matching(title: &str) -> String {
    normalize_title(title)
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_format() {
        let r = parse_filename("[SubsPlease] Frieren - 01 [1080p].mkv").unwrap();
        assert_eq!(r.title, "Frieren");
        assert!((r.episode_number - 1.0).abs() < f32::EPSILON);
        assert_eq!(r.release_group.as_deref(), Some("SubsPlease"));
        assert_eq!(r.resolution.as_deref(), Some("1080p"));
        assert_eq!(r.season, None);
        assert!(r.is_anime);
    }

    #[test]
    fn test_standard_with_version() {
        let r = parse_filename("[Erai-raws] Oshi no Ko - 05v2 [1080p].mkv").unwrap();
        assert_eq!(r.title, "Oshi no Ko");
        assert!((r.episode_number - 5.0).abs() < f32::EPSILON);
        assert_eq!(r.version, Some(2));
        assert!(r.is_revised());
    }

    #[test]
    fn test_decimal_episode() {
        let r = parse_filename("[Group] Anime - 6.5 [1080p].mkv").unwrap();
        assert!((r.episode_number - 6.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_sxxexx_format() {
        let r = parse_filename("[Group] My Hero Academia - S05E10 [1080p].mkv").unwrap();
        assert_eq!(r.title, "My Hero Academia");
        assert_eq!(r.season, Some(5));
        assert!((r.episode_number - 10.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_dot_separated() {
        let r = parse_filename("Attack.on.Titan.S04E28.1080p.WEB.x264-SENPAI.mkv").unwrap();
        assert_eq!(r.title, "Attack on Titan");
        assert_eq!(r.season, Some(4));
        assert!((r.episode_number - 28.0).abs() < f32::EPSILON);
        assert_eq!(r.resolution.as_deref(), Some("1080p"));
        assert_eq!(r.source.as_deref(), Some("WEB"));
        assert_eq!(r.release_group.as_deref(), Some("SENPAI"));
        assert_eq!(r.codec.as_deref(), Some("h264"));
    }

    #[test]
    fn test_group_at_end() {
        let r = parse_filename("Demon Slayer - 05 (1080p BD) [Cool-Group].mkv").unwrap();
        assert_eq!(r.title, "Demon Slayer");
        assert!((r.episode_number - 5.0).abs() < f32::EPSILON);
        assert_eq!(r.release_group.as_deref(), Some("Cool-Group"));
        assert_eq!(r.resolution.as_deref(), Some("1080p"));
        assert_eq!(r.source.as_deref(), Some("BD"));
    }

    #[test]
    fn test_season_in_title() {
        let r = parse_filename("[Group] Mob Psycho 100 Season 2 - 08 [1080p].mkv").unwrap();
        assert_eq!(r.season, Some(2));
        assert!((r.episode_number - 8.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_season_2nd_format() {
        let r = parse_filename("[Group] Title 2nd Season - 05 [1080p].mkv").unwrap();
        assert_eq!(r.season, Some(2));
    }

    #[test]
    fn test_roman_numeral_season() {
        let r = parse_filename("[Group] Re Zero II - 10 [1080p].mkv").unwrap();
        assert_eq!(r.season, Some(2));
    }

    #[test]
    fn test_part_format() {
        let r = parse_filename("[Group] Attack on Titan Part 2 - 05 [1080p].mkv").unwrap();
        assert_eq!(r.season, Some(2));
    }

    #[test]
    fn test_extract_resolution() {
        assert_eq!(extract_resolution("1080p HEVC"), Some("1080p".to_string()));
        assert_eq!(extract_resolution("4K HDR"), Some("4K".to_string()));
        assert_eq!(extract_resolution("720P web"), Some("720p".to_string()));
    }

    #[test]
    fn test_extract_source() {
        assert_eq!(extract_source("1080p BD x265"), Some("BD".to_string()));
        assert_eq!(extract_source("WEBRip 720p"), Some("WEBRIP".to_string()));
        assert_eq!(extract_source("BluRay"), Some("BD".to_string()));
    }

    #[test]
    fn test_fallback_parser() {
        let r = parse_filename("Some Anime - 15.mkv").unwrap();
        assert!((r.episode_number - 15.0).abs() < f32::EPSILON);
        assert_eq!(r.title, "Some Anime");

        let r2 = parse_filename("Anime Title E05.mkv").unwrap();
        assert!((r2.episode_number - 5.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_underscores() {
        let r = parse_filename("[Group]_Anime_Title_-_05_[1080p].mkv").unwrap();
        assert_eq!(r.title, "Anime Title");
        assert!((r.episode_number - 5.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_bd_source_variations() {
        assert_eq!(extract_source("BD 1080p"), Some("BD".to_string()));
        assert_eq!(extract_source("Blu-Ray"), Some("BD".to_string()));
        assert_eq!(extract_source("BluRay"), Some("BD".to_string()));
    }

    #[test]
    fn test_bdrip_and_dvdrip_not_truncated_by_shorter_token() {
        assert_eq!(extract_source("Movie.2020.BDRip.x264-GROUP"), Some("BDRIP".to_string()));
        assert_eq!(extract_source("Movie.2020.DVDRip.x264-GROUP"), Some("DVDRIP".to_string()));
    }

    #[test]
    fn test_extract_source_low_quality_tokens() {
        assert_eq!(extract_source("Movie.2020.CAM.x264-GROUP"), Some("CAM".to_string()));
        assert_eq!(extract_source("Movie.2020.PDTV.x264-GROUP"), Some("PDTV".to_string()));
        assert_eq!(extract_source("Movie.2020.DVD.x264-GROUP"), Some("DVD".to_string()));
        assert_eq!(extract_source("Movie.2020.Satellite.x264-GROUP"), Some("SATELLITE".to_string()));
        assert_eq!(extract_source("Movie.2020.SATRip.x264-GROUP"), Some("SATELLITE".to_string()));
    }

    #[test]
    fn test_extract_audio_format_atmos() {
        assert_eq!(extract_audio_format("Movie.2020.2160p.BluRay.TrueHD.Atmos-GROUP"), Some("ATMOS".to_string()));
        assert_eq!(extract_audio_format("Movie.2020.2160p.Atmos.x265-GROUP"), Some("ATMOS".to_string()));
    }

    #[test]
    fn test_detect_season_from_title() {
        assert_eq!(detect_season_from_title("Title Season 3"), Some(3));
        assert_eq!(detect_season_from_title("Title S2"), Some(2));
        assert_eq!(detect_season_from_title("Title 2nd Season"), Some(2));
        assert_eq!(detect_season_from_title("Title Part 2"), Some(2));
        assert_eq!(detect_season_from_title("Title Part II"), Some(2));
        assert_eq!(detect_season_from_title("Title III"), Some(3));
        assert_eq!(detect_season_from_title("Title Cour 2"), Some(2));
        assert_eq!(detect_season_from_title("Just a Title"), None);
    }

    #[test]
    fn test_normalize_title() {
        assert_eq!(normalize_title("Oshi no Ko 2nd Season"), "Oshi no Ko");
        assert_eq!(
            normalize_title("My Hero Academia Season 5"),
            "My Hero Academia"
        );
        assert_eq!(normalize_title("Re:Zero Part 2"), "Re:Zero");
        assert_eq!(normalize_title("Title S2"), "Title");
        assert_eq!(normalize_title("Demon Slayer (2019)"), "Demon Slayer");
        assert_eq!(normalize_title("Attack on Titan III"), "Attack on Titan");
        assert_eq!(normalize_title("Call of the Night"), "Call of the Night");
    }

    #[test]
    fn test_normalize_for_matching() {
        assert_eq!(
            normalize_for_matching("Oshi no Ko 2nd Season"),
            "oshi no ko"
        );
        assert_eq!(
            normalize_for_matching("My Hero Academia!"),
            "my hero academia"
        );
        assert_eq!(normalize_for_matching("Re:Zero"), "rezero");
    }

    #[test]
    fn test_plex_format() {
        let r = parse_filename(
            "The Apothecary Diaries (2023) - S01E01 - Maomao [Bluray-1080p][Opus 2.0][x265]-MTBB.mkv",
        )
        .unwrap();
        assert_eq!(r.title, "The Apothecary Diaries");
        assert_eq!(r.season, Some(1));
        assert!((r.episode_number - 1.0).abs() < f32::EPSILON);
        assert_eq!(r.resolution.as_deref(), Some("1080p"));
        assert_eq!(r.source.as_deref(), Some("BD"));
        assert_eq!(r.release_group.as_deref(), Some("MTBB"));
        assert_eq!(r.year, Some(2023));

        let r2 = parse_filename(
            "The Apothecary Diaries (2023) - S02E05 - The Moon Fairy [WEBDL-1080p][AAC 2.0][x264]-VARYG.mkv",
        )
        .unwrap();
        assert_eq!(r2.season, Some(2));
        assert!((r2.episode_number - 5.0).abs() < f32::EPSILON);
        assert_eq!(r2.source.as_deref(), Some("WEB"));
    }

    #[test]
    fn test_extract_group_complex_from_issue() {
        let filename = "Chitose.Is.in.the.Ramune.Bottle.S01E01.The.Hazy.Spring.Moon.Above.1080p.CR.WEB-DL.AAC2.0.H.264-VARYG.mkv";
        let r = parse_filename(filename).unwrap();
        assert_eq!(r.release_group.as_deref(), Some("VARYG"));
    }

    #[test]
    fn test_proper_and_hdr_flags() {
        let r = parse_filename("Movie.Title.2023.2160p.UHD.BluRay.PROPER.DV.HDR10.x265-GROUP.mkv").unwrap();
        assert!(r.is_proper);
        assert_eq!(r.hdr.as_deref(), Some("DV"));
        assert_eq!(r.resolution.as_deref(), Some("2160p"));
    }

    #[test]
    fn test_episode_range() {
        let r = parse_filename("[Group] Title - 01-02 [1080p].mkv").unwrap();
        assert_eq!(r.episode_end, Some(2));
    }

    #[test]
    fn test_dash_joined_multi_episode_range() {
        let r = parse_filename("The.Expanse.S03E04-E05.2160p.AMZN.WEB-DL.DDP5.1.HDR.HEVC-NTb")
            .unwrap();
        assert_eq!(r.title, "The Expanse");
        assert_eq!(r.season, Some(3));
        assert!((r.episode_number - 4.0).abs() < f32::EPSILON);
        assert_eq!(r.episode_end, Some(5));
        assert_eq!(r.resolution.as_deref(), Some("2160p"));
        assert_eq!(r.source.as_deref(), Some("WEB"));
        assert_eq!(r.codec.as_deref(), Some("h265"));
        assert_eq!(r.release_group.as_deref(), Some("NTb"));
    }

    #[test]
    fn test_movie_title_parenthesized_year() {
        let r = parse_filename("Inception (2010).1080p.BluRay.x264-GROUP.mkv").unwrap();
        assert_eq!(r.title, "Inception");
        assert_eq!(r.year, Some(2010));
        assert_eq!(r.season, None);
        assert!((r.episode_number).abs() < f32::EPSILON);
        assert_eq!(r.resolution.as_deref(), Some("1080p"));
        assert_eq!(r.source.as_deref(), Some("BD"));
        assert_eq!(r.codec.as_deref(), Some("h264"));
        assert_eq!(r.release_group.as_deref(), Some("GROUP"));
    }

    #[test]
    fn test_movie_title_dot_separated_year() {
        let r = parse_filename("The.Matrix.1999.1080p.WEB-DL.DD5.1.x264-GROUP.mkv").unwrap();
        assert_eq!(r.title, "The Matrix");
        assert_eq!(r.year, Some(1999));
        assert_eq!(r.season, None);
    }

    #[test]
    fn test_movie_title_no_year() {
        let r = parse_filename("Plain Movie Title 1080p BluRay x264-GROUP.mkv").unwrap();
        assert_eq!(r.title, "Plain Movie Title");
        assert_eq!(r.year, None);
        assert_eq!(r.resolution.as_deref(), Some("1080p"));
    }
}
