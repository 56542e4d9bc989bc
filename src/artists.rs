//! Artist extraction: turn a raw artist string plus a track title into an
//! ordered, de-duplicated list of individual artist names.
//!
//! "A & B, C" with title "Song (feat. D & E)" → ["A", "B", "C", "D", "E"].

use once_cell::sync::Lazy;
use regex::Regex;
use rustc_hash::FxHashSet;

use crate::config::ArtistRenames;
use crate::models::Artist;

// ============================================================================
// REGEX PATTERNS
// ============================================================================

/// Bracketed or parenthesized title segments: "(feat. X)", "[Y Remix]".
pub static BRACKET_SEGMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\[(](.*?)[\])]").unwrap());

/// Leading "feat.", "feat" or "with" token of a featured-artist segment.
pub static FEAT_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:feat\.?|with)\s+").unwrap());

/// Separators inside a featured-artist segment.
pub static FEAT_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"[,&]").unwrap());

/// Remix phrases whose preceding text names a remixing artist.
/// Longest phrases first so "vip remix" wins over "remix".
pub const REMIX_PHRASES: [&str; 7] = [
    "night beat remix",
    "house remix",
    "dance remix",
    "vip remix",
    "vip mix",
    "remix",
    "mix",
];

/// "<artist> <remix phrase>" at the start of a bracket segment.
pub static REMIX_ARTIST: Lazy<Regex> = Lazy::new(|| {
    let phrases: Vec<String> = REMIX_PHRASES.iter().map(|p| regex::escape(p)).collect();
    Regex::new(&format!(r"(?i)^(.*?)\s+(?:{})", phrases.join("|"))).unwrap()
});

/// Stands in for the comma of a protected artist name while splitting.
const COMMA_SENTINEL: &str = "\u{1A}";

// ============================================================================
// EXTRACTION HELPERS
// ============================================================================

/// Split a raw artist string on commas and " & ", keeping the configured
/// comma-containing names whole. Pieces are trimmed and empty ones dropped,
/// so "A, " yields `["A"]`.
pub fn split_artists(artist: &str, artists_with_comma: &[String]) -> Vec<String> {
    let mut protected = artist.to_string();
    for name in artists_with_comma {
        protected = protected.replace(name.as_str(), &name.replace(',', COMMA_SENTINEL));
    }

    protected
        .replace(" & ", ", ")
        .split(',')
        .map(|piece| piece.trim().replace(COMMA_SENTINEL, ","))
        .filter(|piece| !piece.is_empty())
        .collect()
}

/// Featured and remixing artists named in bracketed title segments.
pub fn extract_featured_artists(title: &str) -> Vec<String> {
    let mut found = Vec::new();

    for caps in BRACKET_SEGMENT.captures_iter(title) {
        let content = &caps[1];
        let check = content.trim().to_lowercase();

        if check.contains("feat") || check.contains("with") {
            let cleaned = FEAT_PREFIX.replace(content, "");
            found.extend(
                FEAT_SEPARATOR
                    .split(&cleaned)
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(str::to_string),
            );
        } else if REMIX_PHRASES.iter().any(|phrase| check.contains(phrase)) {
            if let Some(remix) = REMIX_ARTIST.captures(content) {
                let remixer = remix[1].trim();
                if !remixer.is_empty() {
                    found.push(remixer.to_string());
                }
            }
        }
    }

    found
}

fn dedupe(names: Vec<String>) -> Vec<String> {
    let mut seen = FxHashSet::default();
    names
        .into_iter()
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

// ============================================================================
// EXTRACTOR
// ============================================================================

/// Artist extraction configured with a rename table and the list of artist
/// names that contain commas.
#[derive(Clone, Debug)]
pub struct ArtistExtractor<'a> {
    renames: &'a ArtistRenames,
    artists_with_comma: &'a [String],
}

impl<'a> ArtistExtractor<'a> {
    pub fn new(renames: &'a ArtistRenames, artists_with_comma: &'a [String]) -> Self {
        Self {
            renames,
            artists_with_comma,
        }
    }

    /// Main artists, then featured/remix artists from the title, renamed and
    /// de-duplicated. A list-valued artist is returned as-is.
    pub fn extract(&self, artist: &Artist, title: &str) -> Vec<String> {
        let raw = match artist {
            Artist::List(names) => return names.clone(),
            Artist::Name(raw) => raw,
        };

        let mut credited = split_artists(raw, self.artists_with_comma);
        credited.extend(extract_featured_artists(title));

        let renamed = self.renames.apply(credited.iter().map(String::as_str));
        dedupe(renamed)
    }

    /// Rename an already extracted artist list, flattening expansions.
    pub fn rename_list(&self, names: &[String]) -> Vec<String> {
        self.renames.apply(names.iter().map(String::as_str))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(artist: &str, title: &str) -> Vec<String> {
        let renames = ArtistRenames::default();
        ArtistExtractor::new(&renames, &[]).extract(&Artist::Name(artist.into()), title)
    }

    #[test]
    fn test_split_and_featured() {
        assert_eq!(extract("A & B, C", "Song (feat. D & E)"), vec!["A", "B", "C", "D", "E"]);
    }

    #[test]
    fn test_split_drops_empty_pieces() {
        assert_eq!(split_artists("A, ", &[]), vec!["A"]);
        assert_eq!(split_artists(" , A &  , B", &[]), vec!["A", "B"]);
        assert!(split_artists("", &[]).is_empty());
    }

    #[test]
    fn test_comma_protected_name() {
        let renames = ArtistRenames::default();
        let protected = vec!["Big, Band".to_string()];
        let extractor = ArtistExtractor::new(&renames, &protected);
        assert_eq!(
            extractor.extract(&Artist::Name("Big, Band, Solo Artist".into()), "Tune"),
            vec!["Big, Band", "Solo Artist"]
        );
    }

    #[test]
    fn test_with_segment() {
        assert_eq!(extract("A", "Song [with B, C]"), vec!["A", "B", "C"]);
        assert_eq!(extract("A", "Song (Feat B)"), vec!["A", "B"]);
    }

    #[test]
    fn test_remix_artists() {
        assert_eq!(extract("A", "Song (B Remix)"), vec!["A", "B"]);
        assert_eq!(extract("A", "Song (DJ C VIP Mix)"), vec!["A", "DJ C"]);
        assert_eq!(extract("A", "Song [D Night Beat Remix]"), vec!["A", "D"]);
        // No artist in front of the phrase.
        assert_eq!(extract("A", "Song (Remix)"), vec!["A"]);
    }

    #[test]
    fn test_unrelated_and_empty_brackets() {
        assert_eq!(extract("A", "Song (Live)"), vec!["A"]);
        assert_eq!(extract("A", "Song ()"), vec!["A"]);
        assert_eq!(extract("", "Song"), Vec::<String>::new());
    }

    #[test]
    fn test_dedupe_keeps_first() {
        assert_eq!(extract("A, B", "Song (feat. A)"), vec!["A", "B"]);
    }

    #[test]
    fn test_rename_and_expand() {
        let mut renames = ArtistRenames::default();
        renames.direct.insert("Jay".into(), "JAY".into());
        renames.expand.insert("Duo".into(), vec!["First".into(), "Second".into()]);
        let extractor = ArtistExtractor::new(&renames, &[]);

        let names = extractor.extract(&Artist::Name("Jay & Duo".into()), "Song (feat. First)");
        assert_eq!(names, vec!["JAY", "First", "Second"]);
    }

    #[test]
    fn test_list_passes_through() {
        let renames = ArtistRenames::default();
        let extractor = ArtistExtractor::new(&renames, &[]);
        let list = Artist::List(vec!["X".into(), "Y".into()]);
        assert_eq!(extractor.extract(&list, "Song (feat. Z)"), vec!["X", "Y"]);
    }
}
