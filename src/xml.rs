//! Loader for the XML property-list library export.
//!
//! The export is a dictionary with a `Tracks` dictionary keyed by track id and
//! a `Playlists` array. Each track's tag set holds the names of the non-empty
//! playlists that contain it.

use std::collections::BTreeSet;
use std::path::Path;
use std::time::SystemTime;

use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};
use plist::{Dictionary, Value as PlistValue};
use rustc_hash::FxHashMap;
use tracing::{info, warn};

use crate::catalog::Catalog;
use crate::error::{CatalogError, Result};
use crate::models::{
    Artist, ArtistShape, Ordinal, OrdinalKind, Schema, Track, ALBUM, ARTIST, COMPOSER,
    DATE_ADDED, DATE_MODIFIED, DISC_NUMBER, GENRE, NAME, PLAY_COUNT, SIZE, TOTAL_TIME, TRACK_ID,
    TRACK_NUMBER, YEAR,
};

const TRACKS_KEY: &str = "Tracks";
const PLAYLISTS_KEY: &str = "Playlists";
const PLAYLIST_NAME_KEY: &str = "Name";
const PLAYLIST_ITEMS_KEY: &str = "Playlist Items";

impl Catalog {
    /// Load a catalog from an XML property-list export.
    pub fn from_xml(path: impl AsRef<Path>) -> Result<Catalog> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(CatalogError::InvalidPath(path.to_path_buf()));
        }

        let root = PlistValue::from_file(path)?;
        let catalog = from_plist(&root)?;
        info!("loaded {} tracks from {}", catalog.len(), path.display());
        Ok(catalog)
    }
}

/// Build a catalog from an already parsed property list.
pub fn from_plist(root: &PlistValue) -> Result<Catalog> {
    let root = root
        .as_dictionary()
        .ok_or_else(|| CatalogError::malformed("library export root is not a dictionary"))?;
    let entries = root
        .get(TRACKS_KEY)
        .and_then(PlistValue::as_dictionary)
        .ok_or_else(|| CatalogError::malformed("library export has no Tracks dictionary"))?;

    let memberships = playlist_memberships(root);

    let mut tracks = Vec::with_capacity(entries.len());
    for (key, entry) in entries {
        let Some(info) = entry.as_dictionary() else {
            warn!("skipping track entry '{}': not a dictionary", key);
            continue;
        };
        let Some(id) = integer(info, TRACK_ID) else {
            warn!("skipping track entry '{}': no Track ID", key);
            continue;
        };

        let mut track = Track {
            id,
            name: text(info, NAME).unwrap_or_default(),
            artist: text(info, ARTIST).map(Artist::Name),
            composer: text(info, COMPOSER),
            album: text(info, ALBUM),
            genre: text(info, GENRE),
            year: integer(info, YEAR),
            date_modified: date(info, DATE_MODIFIED),
            date_added: date(info, DATE_ADDED),
            play_count: Some(count(info, PLAY_COUNT).unwrap_or(0)),
            size: count(info, SIZE),
            total_time: integer(info, TOTAL_TIME).map(TimeDelta::milliseconds),
            disc_number: ordinal(info, DISC_NUMBER),
            track_number: ordinal(info, TRACK_NUMBER),
            ..Default::default()
        };
        if let Some(tags) = memberships.get(&id) {
            track.tags = tags.clone();
        }
        tracks.push(track);
    }

    Ok(Catalog::new(
        Schema::standard(ArtistShape::Scalar, OrdinalKind::Text),
        tracks,
    ))
}

/// Track id → names of the non-empty playlists containing it.
fn playlist_memberships(root: &Dictionary) -> FxHashMap<i64, BTreeSet<String>> {
    let mut memberships: FxHashMap<i64, BTreeSet<String>> = FxHashMap::default();

    let playlists = root
        .get(PLAYLISTS_KEY)
        .and_then(PlistValue::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    for playlist in playlists.iter().filter_map(PlistValue::as_dictionary) {
        let Some(name) = text(playlist, PLAYLIST_NAME_KEY) else {
            continue;
        };
        let items = playlist
            .get(PLAYLIST_ITEMS_KEY)
            .and_then(PlistValue::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        for item in items.iter().filter_map(PlistValue::as_dictionary) {
            if let Some(id) = integer(item, TRACK_ID) {
                memberships.entry(id).or_default().insert(name.clone());
            }
        }
    }

    memberships
}

// ============================================================================
// Field Readers
// ============================================================================

fn text(dict: &Dictionary, key: &str) -> Option<String> {
    dict.get(key).and_then(PlistValue::as_string).map(str::to_string)
}

fn integer(dict: &Dictionary, key: &str) -> Option<i64> {
    match dict.get(key)? {
        PlistValue::Integer(n) => n.as_signed(),
        PlistValue::Real(x) if x.fract() == 0.0 => Some(*x as i64),
        PlistValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn count(dict: &Dictionary, key: &str) -> Option<u64> {
    integer(dict, key).and_then(|n| u64::try_from(n).ok())
}

fn date(dict: &Dictionary, key: &str) -> Option<NaiveDateTime> {
    let date = dict.get(key).and_then(PlistValue::as_date)?;
    Some(DateTime::<Utc>::from(SystemTime::from(date)).naive_utc())
}

/// Disc and track numbers are stored as text, as the export does.
fn ordinal(dict: &Dictionary, key: &str) -> Option<Ordinal> {
    integer(dict, key).map(|n| Ordinal::Text(n.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Write;

    const LIBRARY: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
    <key>Tracks</key>
    <dict>
        <key>101</key>
        <dict>
            <key>Track ID</key><integer>101</integer>
            <key>Name</key><string>Hello World</string>
            <key>Artist</key><string>A &amp; B</string>
            <key>Year</key><integer>2001</integer>
            <key>Date Added</key><date>2023-01-05T10:20:30Z</date>
            <key>Play Count</key><integer>4</integer>
            <key>Size</key><integer>5000000</integer>
            <key>Total Time</key><integer>225000</integer>
            <key>Track Number</key><integer>3</integer>
        </dict>
        <key>102</key>
        <dict>
            <key>Track ID</key><integer>102</integer>
            <key>Name</key><string>Goodbye</string>
        </dict>
        <key>103</key>
        <dict>
            <key>Name</key><string>Orphan</string>
        </dict>
    </dict>
    <key>Playlists</key>
    <array>
        <dict>
            <key>Name</key><string>Workout</string>
            <key>Playlist Items</key>
            <array>
                <dict><key>Track ID</key><integer>101</integer></dict>
            </array>
        </dict>
        <dict>
            <key>Name</key><string>Chill</string>
            <key>Playlist Items</key>
            <array>
                <dict><key>Track ID</key><integer>101</integer></dict>
                <dict><key>Track ID</key><integer>102</integer></dict>
            </array>
        </dict>
        <dict>
            <key>Name</key><string>Empty</string>
            <key>Playlist Items</key>
            <array/>
        </dict>
    </array>
</dict>
</plist>
"#;

    fn write_library() -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".xml").tempfile().unwrap();
        file.write_all(LIBRARY.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_from_xml() {
        let file = write_library();
        let catalog = Catalog::from_xml(file.path()).unwrap();

        assert!(catalog.is_valid());
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.schema().artist, ArtistShape::Scalar);
        assert_eq!(catalog.schema().ordinals, OrdinalKind::Text);

        let hello = &catalog.tracks()[0];
        assert_eq!(hello.id, 101);
        assert_eq!(hello.artist, Some(Artist::Name("A & B".into())));
        assert_eq!(hello.year, Some(2001));
        assert_eq!(hello.play_count, Some(4));
        assert_eq!(hello.total_time, Some(TimeDelta::seconds(225)));
        assert_eq!(hello.track_number, Some(Ordinal::Text("3".into())));
        assert_eq!(
            hello.date_added,
            NaiveDate::from_ymd_opt(2023, 1, 5).and_then(|d| d.and_hms_opt(10, 20, 30))
        );
        let tags: Vec<&str> = hello.tags.iter().map(String::as_str).collect();
        assert_eq!(tags, vec!["Chill", "Workout"]);
    }

    #[test]
    fn test_missing_play_count_defaults_to_zero() {
        let file = write_library();
        let catalog = Catalog::from_xml(file.path()).unwrap();
        let goodbye = &catalog.tracks()[1];
        assert_eq!(goodbye.play_count, Some(0));
        assert_eq!(goodbye.artist, None);
        assert_eq!(goodbye.tags.len(), 1);
    }

    #[test]
    fn test_invalid_path() {
        let err = Catalog::from_xml("/nonexistent/library.xml").unwrap_err();
        assert!(matches!(err, CatalogError::InvalidPath(_)));

        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Catalog::from_xml(dir.path()),
            Err(CatalogError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_root_without_tracks() {
        let root = PlistValue::Dictionary(Dictionary::new());
        assert!(matches!(from_plist(&root), Err(CatalogError::MalformedInput(_))));
    }
}
