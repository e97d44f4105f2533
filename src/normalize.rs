//! Filename normalization for series detection.
//!
//! Turns a raw audio filename into a display name, a comparison key and an
//! optional episode number. The steps run in a fixed order: later patterns
//! assume the earlier removals already happened.
//!
//! CRITICAL: Any change here shifts grouping keys for every strategy. Run tests after changes.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::models::NormalizedName;

// ============================================================================
// REGEX PATTERNS
// ============================================================================

/// Matches known audio extensions at the end of a filename
pub static FILE_EXTENSION: Lazy<Regex> = Lazy::new(||
    Regex::new(r"(?i)\.(?:mp3|flac|wav|m4a|aac|ogg)$").unwrap()
);

/// Regex to collapse whitespace runs into a single space
pub static MULTI_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Date cleanup patterns (priority order, each fires at most once).
pub static DATE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        // Month name with year in parens: "(20 July 2016)", "(July 2016)"
        Regex::new(r"(?i)\s*\([^)]*(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[^)]*\d{4}[^)]*\)").unwrap(),
        // Bare year in parens: "(2016)"
        Regex::new(r"\s*\(\d{4}\)").unwrap(),
        // Radio recorder stamp: "(2019-05-06 10.58.00 Monday)"
        Regex::new(r"\s*\(\d{4}-\d{2}-\d{2}\s+\d{2}\.\d{2}\.\d{2}\s+\w+\)").unwrap(),
        // Radio recorder stamp: "(05.06.19 Mon. 9:58)"
        Regex::new(r"\s*\(\d{2}\.\d{2}\.\d{2}\s+\w+\.?\s+\d{1,2}[:.]\d{2}\)").unwrap(),
        // ISO-ish dates, bare or bracketed: "2024-01-15", "[2024.01.15]"
        Regex::new(r"\s*[\(\[]?\d{4}[-.]\d{2}[-.]\d{2}[\)\]]?").unwrap(),
        // Trailing dash date: "- 2024-01-15"
        Regex::new(r"\s*-\s*\d{4}-\d{2}-\d{2}\s*$").unwrap(),
        // Leftover time/day fragment: "10.58.00 Monday)"
        Regex::new(r"\s+\d{2}\.\d{2}\.\d{2}\s+\w+\)?").unwrap(),
    ]
});

/// Month + year phrases: "January 2006 Mix", "July 2005"
pub static MONTH_YEAR_PHRASE: Lazy<Regex> = Lazy::new(||
    Regex::new(r"(?i)\s*(?:january|february|march|april|may|june|july|august|september|october|november|december)\s+\d{4}\s*(?:mix\b)?\s*").unwrap()
);

/// Matches a trailing "Part 2" suffix
pub static PART_SUFFIX: Lazy<Regex> = Lazy::new(||
    Regex::new(r"(?i)\s*part\s*\d+\s*$").unwrap()
);

/// Trailing episode number: "Show Name 123"
pub static TRAILING_EPISODE: Lazy<Regex> = Lazy::new(||
    Regex::new(r"\s+([0-9]{2,4})\s*$").unwrap()
);

/// Explicit episode marker anywhere: "Episode 12", "EP. 7", "#045"
pub static EPISODE_MARKER: Lazy<Regex> = Lazy::new(||
    Regex::new(r"(?i)[\s\-_]*(?:episode|ep\.?|#)\s*([0-9]{1,4})").unwrap()
);

/// Matches track number prefixes like "01 - ", "3_", "12 "
pub static TRACK_NUMBER_PREFIX: Lazy<Regex> = Lazy::new(||
    Regex::new(r"^\d{1,2}[\s\-_]+").unwrap()
);

/// Matches trailing separator characters
pub static TRAILING_SEPARATORS: Lazy<Regex> = Lazy::new(||
    Regex::new(r"[\s\-_]+$").unwrap()
);

/// Numbered folder prefix: "01 - Show", "3_Show"
pub static DIRECTORY_NUMBER_PREFIX: Lazy<Regex> = Lazy::new(||
    Regex::new(r"^\d+\s*[-_]\s*").unwrap()
);

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Replace a hyphen with a space when it joins two letters.
/// "Hi-Fi" → "Hi Fi", while "2016-07-20" keeps its hyphens.
fn split_letter_hyphens(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    chars
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            let joins_letters = c == '-'
                && i > 0
                && i + 1 < chars.len()
                && chars[i - 1].is_alphabetic()
                && chars[i + 1].is_alphabetic();
            if joins_letters {
                ' '
            } else {
                c
            }
        })
        .collect()
}

/// Comparison form of arbitrary text: lowercase, alphanumerics and spaces
/// only, single-spaced. Used for filename keys, album names and folder names.
pub fn normalize_text(s: &str) -> String {
    let stripped: String = s
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Keys of three characters or fewer are too generic to group on.
pub fn is_significant_key(key: &str) -> bool {
    key.chars().count() > 3
}

/// Remove the date classes in priority order, each at most once.
fn strip_dates(name: &str) -> String {
    let mut result = name.to_string();
    for pattern in DATE_PATTERNS.iter() {
        result = pattern.replace(&result, "").into_owned();
    }
    result
}

/// Split off an episode number, returning the remaining name and the digits.
fn extract_episode(name: &str) -> (String, Option<String>) {
    let found = TRAILING_EPISODE
        .captures(name)
        .or_else(|| EPISODE_MARKER.captures(name));

    match found {
        Some(caps) => {
            let whole = caps.get(0).map_or(name.len(), |m| m.start());
            let episode = caps.get(1).map(|m| m.as_str().to_string());
            (name[..whole].trim().to_string(), episode)
        }
        None => (name.to_string(), None),
    }
}

// ============================================================================
// NORMALIZATION FUNCTIONS
// ============================================================================

/// Light cleanup: NFC composition, extension removal, underscores and
/// letter-joining hyphens to spaces, whitespace collapse.
pub fn clean_filename(filename: &str) -> String {
    let composed: String = filename.nfc().collect();
    let without_ext = FILE_EXTENSION.replace(&composed, "");
    let spaced = split_letter_hyphens(&without_ext.replace('_', " "));
    MULTI_SPACE.replace_all(&spaced, " ").trim().to_string()
}

/// Derive display name, comparison key and episode from a filename.
pub fn normalize(filename: &str) -> NormalizedName {
    let mut name = clean_filename(filename);

    name = strip_dates(&name);
    name = MONTH_YEAR_PHRASE.replace_all(&name, " ").trim().to_string();
    name = PART_SUFFIX.replace(&name, "").to_string();

    let (remaining, episode) = extract_episode(&name);
    name = remaining;

    name = TRACK_NUMBER_PREFIX.replace(&name, "").to_string();
    name = TRAILING_SEPARATORS.replace(&name, "").to_string();
    let display_name = name.trim().to_string();

    NormalizedName {
        comparison_key: normalize_text(&display_name),
        display_name,
        episode,
    }
}

/// Series name seed for a folder: last path segment without a "01 - " style prefix.
pub fn directory_series_name(directory: &str) -> String {
    let is_separator = |c: char| c == '/' || c == '\\';
    let trimmed = directory.trim_end_matches(is_separator);
    let last = trimmed.rsplit(is_separator).next().unwrap_or(trimmed);
    DIRECTORY_NUMBER_PREFIX.replace(last, "").trim().to_string()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_underscored_episode() {
        let name = normalize("Late_Night_Sessions_045.mp3");
        assert_eq!(name.display_name, "Late Night Sessions");
        assert_eq!(name.comparison_key, "late night sessions");
        assert_eq!(name.episode.as_deref(), Some("045"));
    }

    #[test]
    fn test_normalize_strips_month_date() {
        let name = normalize("Mix (20 July 2016).mp3");
        assert_eq!(name.display_name, "Mix");
        assert_eq!(name.episode, None);
        // "mix" is too short to group on
        assert!(!name.has_significant_key());
    }

    #[test]
    fn test_normalize_date_formats() {
        assert_eq!(normalize("Technotopia 2016-03-04.mp3").display_name, "Technotopia");
        assert_eq!(normalize("Technotopia [2016.03.04].flac").display_name, "Technotopia");
        assert_eq!(normalize("Technotopia (2016).mp3").display_name, "Technotopia");
        assert_eq!(
            normalize("Radio_Show_(2019-05-06_10.58.00_Monday).mp3").display_name,
            "Radio Show"
        );
        assert_eq!(
            normalize("Radio Show (05.06.19 Mon. 9:58).m4a").display_name,
            "Radio Show"
        );
    }

    #[test]
    fn test_normalize_leftover_time_fragment() {
        // The bare date goes first, leaving "10.58.00 Monday)" behind
        let name = normalize("Radio Show 2019-05-06 10.58.00 Monday).mp3");
        assert_eq!(name.display_name, "Radio Show");
        assert_eq!(name.episode, None);
    }

    #[test]
    fn test_normalize_month_year_phrase() {
        let name = normalize("Anjunadeep Edition January 2006 Mix.mp3");
        assert_eq!(name.display_name, "Anjunadeep Edition");
        assert_eq!(name.comparison_key, "anjunadeep edition");
    }

    #[test]
    fn test_normalize_part_suffix() {
        assert_eq!(normalize("Essential Selection Part 2.mp3").display_name, "Essential Selection");
    }

    #[test]
    fn test_normalize_episode_markers() {
        let name = normalize("Deep-House_Mix #12.mp3");
        assert_eq!(name.display_name, "Deep House Mix");
        assert_eq!(name.episode.as_deref(), Some("12"));

        let name = normalize("Group Therapy Episode 7 with Guest.mp3");
        assert_eq!(name.display_name, "Group Therapy");
        assert_eq!(name.episode.as_deref(), Some("7"));

        let name = normalize("Solarstone Pure Trance Ep.301.wav");
        assert_eq!(name.episode.as_deref(), Some("301"));
        assert_eq!(name.display_name, "Solarstone Pure Trance");
    }

    #[test]
    fn test_normalize_trailing_episode_needs_space() {
        // Five digits are not an episode number
        let name = normalize("Show 12345.mp3");
        assert_eq!(name.episode, None);
        assert_eq!(name.display_name, "Show 12345");
    }

    #[test]
    fn test_normalize_track_number_prefix() {
        let name = normalize("03 - Some Show.mp3");
        assert_eq!(name.display_name, "Some Show");
        assert_eq!(name.episode, None);
    }

    #[test]
    fn test_normalize_hyphens() {
        let name = normalize("Gai Barone - Patterns 123.mp3");
        assert_eq!(name.display_name, "Gai Barone - Patterns");
        assert_eq!(name.comparison_key, "gai barone patterns");
        assert_eq!(name.episode.as_deref(), Some("123"));

        assert_eq!(normalize("Hi-Fi Sessions.ogg").display_name, "Hi Fi Sessions");
    }

    #[test]
    fn test_normalize_empty_filename() {
        let name = normalize("");
        assert_eq!(name, NormalizedName::default());
        assert!(!name.has_significant_key());
    }

    #[test]
    fn test_normalize_composes_unicode() {
        let decomposed = normalize("Cafe\u{301} Sessions 01.mp3");
        let composed = normalize("Caf\u{e9} Sessions 02.mp3");
        assert_eq!(decomposed.comparison_key, composed.comparison_key);
        assert_eq!(composed.comparison_key, "caf\u{e9} sessions");
    }

    #[test]
    fn test_clean_filename() {
        assert_eq!(clean_filename("A_State_Of_Trance.FLAC"), "A State Of Trance");
        assert_eq!(clean_filename("  spaced   out  .mp3"), "spaced out");
        assert_eq!(clean_filename("Live 2016-07-20.mp3"), "Live 2016-07-20");
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("Gai Barone - Patterns!"), "gai barone patterns");
        assert_eq!(normalize_text("  A.S.O.T.  "), "asot");
    }

    #[test]
    fn test_directory_series_name() {
        assert_eq!(directory_series_name("/music/radio/01 - Group Therapy"), "Group Therapy");
        assert_eq!(directory_series_name("/music/radio/3_Essential Mix/"), "Essential Mix");
        assert_eq!(directory_series_name("C:\\Music\\Patterns"), "Patterns");
        assert_eq!(directory_series_name("Patterns"), "Patterns");
    }
}
