//! Core data models for library catalogs.
//!
//! This module contains the track record, the dynamically typed cell value used
//! for generic column access, and the tagged schema that describes how a
//! catalog variant stores its artist and ordinal columns.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta};
use serde::Serialize;

use crate::error::{CatalogError, Result};

// ============================================================================
// Column Names
// ============================================================================

pub const TRACK_ID: &str = "Track ID";
pub const NAME: &str = "Name";
pub const ARTIST: &str = "Artist";
pub const COMPOSER: &str = "Composer";
pub const ALBUM: &str = "Album";
pub const GENRE: &str = "Genre";
pub const YEAR: &str = "Year";
pub const DATE_MODIFIED: &str = "Date Modified";
pub const DATE_ADDED: &str = "Date Added";
pub const PLAY_COUNT: &str = "Play Count";
pub const SIZE: &str = "Size";
pub const TOTAL_TIME: &str = "Total Time";
pub const DISC_NUMBER: &str = "Disc Number";
pub const TRACK_NUMBER: &str = "Track Number";
pub const TAGS: &str = "Tags";

/// Columns every valid catalog must carry.
pub const REQUIRED_COLUMNS: [&str; 14] = [
    TRACK_ID,
    NAME,
    ARTIST,
    COMPOSER,
    ALBUM,
    GENRE,
    YEAR,
    DATE_MODIFIED,
    DATE_ADDED,
    PLAY_COUNT,
    SIZE,
    TOTAL_TIME,
    DISC_NUMBER,
    TRACK_NUMBER,
];

/// A catalog column. Anything outside the fixed set (e.g. "Vocal", "Language")
/// is an extra column stored in [`Track::extra`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Column {
    TrackId,
    Name,
    Artist,
    Composer,
    Album,
    Genre,
    Year,
    DateModified,
    DateAdded,
    PlayCount,
    Size,
    TotalTime,
    DiscNumber,
    TrackNumber,
    Tags,
    Extra(String),
}

impl Column {
    pub fn parse(name: &str) -> Column {
        match name {
            TRACK_ID => Column::TrackId,
            NAME => Column::Name,
            ARTIST => Column::Artist,
            COMPOSER => Column::Composer,
            ALBUM => Column::Album,
            GENRE => Column::Genre,
            YEAR => Column::Year,
            DATE_MODIFIED => Column::DateModified,
            DATE_ADDED => Column::DateAdded,
            PLAY_COUNT => Column::PlayCount,
            SIZE => Column::Size,
            TOTAL_TIME => Column::TotalTime,
            DISC_NUMBER => Column::DiscNumber,
            TRACK_NUMBER => Column::TrackNumber,
            TAGS => Column::Tags,
            other => Column::Extra(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Column::TrackId => TRACK_ID,
            Column::Name => NAME,
            Column::Artist => ARTIST,
            Column::Composer => COMPOSER,
            Column::Album => ALBUM,
            Column::Genre => GENRE,
            Column::Year => YEAR,
            Column::DateModified => DATE_MODIFIED,
            Column::DateAdded => DATE_ADDED,
            Column::PlayCount => PLAY_COUNT,
            Column::Size => SIZE,
            Column::TotalTime => TOTAL_TIME,
            Column::DiscNumber => DISC_NUMBER,
            Column::TrackNumber => TRACK_NUMBER,
            Column::Tags => TAGS,
            Column::Extra(name) => name,
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Schema
// ============================================================================

/// How a catalog variant stores the artist field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArtistShape {
    /// One raw artist string per track, e.g. "A & B, C".
    Scalar,
    /// An ordered list of individual artist names per track.
    List,
}

/// How a catalog variant stores disc and track numbers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrdinalKind {
    Numeric,
    Text,
}

impl OrdinalKind {
    pub fn combine(self, other: OrdinalKind) -> OrdinalKind {
        if self == OrdinalKind::Text || other == OrdinalKind::Text {
            OrdinalKind::Text
        } else {
            OrdinalKind::Numeric
        }
    }
}

/// Tagged schema of a catalog: the artist representation, the ordinal
/// representation, and the ordered column set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Schema {
    pub artist: ArtistShape,
    pub ordinals: OrdinalKind,
    pub columns: Vec<String>,
}

impl Schema {
    pub fn new(artist: ArtistShape, ordinals: OrdinalKind, columns: Vec<String>) -> Self {
        Self {
            artist,
            ordinals,
            columns,
        }
    }

    /// Required columns followed by `Tags`.
    pub fn standard(artist: ArtistShape, ordinals: OrdinalKind) -> Self {
        let mut columns: Vec<String> = REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect();
        columns.push(TAGS.to_string());
        Self::new(artist, ordinals, columns)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn is_valid(&self) -> bool {
        REQUIRED_COLUMNS.iter().all(|c| self.has_column(c))
    }

    /// Union of two schemas, used when partitions are concatenated.
    /// Column order follows first appearance.
    pub fn union(&self, other: &Schema) -> Schema {
        let mut columns = self.columns.clone();
        for column in &other.columns {
            if !columns.contains(column) {
                columns.push(column.clone());
            }
        }
        let artist = if self.artist == other.artist {
            self.artist
        } else {
            ArtistShape::List
        };
        Schema::new(artist, self.ordinals.combine(other.ordinals), columns)
    }
}

// ============================================================================
// Cell Values
// ============================================================================

/// A dynamically typed cell, used for generic column access and for the
/// snapshot wire format.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<String>),
    Set(BTreeSet<String>),
    Timestamp(NaiveDateTime),
    Duration(TimeDelta),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// True for values a free-text search can look into.
    pub fn is_textual(&self) -> bool {
        matches!(self, Value::Text(_) | Value::List(_) | Value::Set(_))
    }

    /// Lookup key used by filter and map tables. `Null` has no key.
    pub fn key(&self) -> Option<String> {
        match self {
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }

    fn opt_text(value: Option<&String>) -> Value {
        value.map_or(Value::Null, |s| Value::Text(s.clone()))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{}", x),
            Value::Text(s) => f.write_str(s),
            Value::List(items) => f.write_str(&items.join(", ")),
            Value::Set(items) => {
                let items: Vec<&str> = items.iter().map(String::as_str).collect();
                f.write_str(&items.join(", "))
            }
            Value::Timestamp(ts) => write!(f, "{}", ts.format("%Y-%m-%d %H:%M:%S")),
            Value::Duration(td) => f.write_str(&format_timedelta(*td)),
        }
    }
}

// ============================================================================
// Track Fields
// ============================================================================

/// Artist field of a track: the raw export string or an extracted list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Artist {
    Name(String),
    List(Vec<String>),
}

impl Artist {
    pub fn names(&self) -> Vec<&str> {
        match self {
            Artist::Name(name) => vec![name.as_str()],
            Artist::List(names) => names.iter().map(String::as_str).collect(),
        }
    }

    /// Join key: a list is sorted and comma-joined, a scalar is used as-is.
    pub fn key(&self) -> String {
        match self {
            Artist::Name(name) => name.clone(),
            Artist::List(names) => {
                let mut sorted = names.clone();
                sorted.sort();
                sorted.join(",")
            }
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Artist::Name(name) => Value::Text(name.clone()),
            Artist::List(names) => Value::List(names.clone()),
        }
    }
}

/// Disc or track number. Spreadsheet and snapshot sources carry integers,
/// the XML export carries strings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Ordinal {
    Number(i64),
    Text(String),
}

impl Ordinal {
    fn to_value(&self) -> Value {
        match self {
            Ordinal::Number(n) => Value::Int(*n),
            Ordinal::Text(s) => Value::Text(s.clone()),
        }
    }
}

impl fmt::Display for Ordinal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ordinal::Number(n) => write!(f, "{}", n),
            Ordinal::Text(s) => f.write_str(s),
        }
    }
}

// ============================================================================
// Track
// ============================================================================

/// One row of a catalog.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Track {
    pub id: i64,
    pub name: String,
    pub artist: Option<Artist>,
    pub composer: Option<String>,
    pub album: Option<String>,
    pub genre: Option<String>,
    pub year: Option<i64>,
    pub date_modified: Option<NaiveDateTime>,
    pub date_added: Option<NaiveDateTime>,
    pub play_count: Option<u64>,
    pub size: Option<u64>,
    pub total_time: Option<TimeDelta>,
    pub disc_number: Option<Ordinal>,
    pub track_number: Option<Ordinal>,
    /// Names of the playlists containing this track.
    pub tags: BTreeSet<String>,
    /// Columns outside the fixed set (curated taxonomy such as "Vocal").
    pub extra: BTreeMap<String, Value>,
}

impl Track {
    pub fn new(id: i64, name: impl Into<String>, artist: Artist) -> Self {
        Self {
            id,
            name: name.into(),
            artist: Some(artist),
            ..Default::default()
        }
    }

    pub fn get(&self, column: &Column) -> Value {
        match column {
            Column::TrackId => Value::Int(self.id),
            Column::Name => Value::Text(self.name.clone()),
            Column::Artist => self.artist.as_ref().map_or(Value::Null, Artist::to_value),
            Column::Composer => Value::opt_text(self.composer.as_ref()),
            Column::Album => Value::opt_text(self.album.as_ref()),
            Column::Genre => Value::opt_text(self.genre.as_ref()),
            Column::Year => self.year.map_or(Value::Null, Value::Int),
            Column::DateModified => self.date_modified.map_or(Value::Null, Value::Timestamp),
            Column::DateAdded => self.date_added.map_or(Value::Null, Value::Timestamp),
            Column::PlayCount => self.play_count.map_or(Value::Null, |n| Value::Int(n as i64)),
            Column::Size => self.size.map_or(Value::Null, |n| Value::Int(n as i64)),
            Column::TotalTime => self.total_time.map_or(Value::Null, Value::Duration),
            Column::DiscNumber => self.disc_number.as_ref().map_or(Value::Null, Ordinal::to_value),
            Column::TrackNumber => self.track_number.as_ref().map_or(Value::Null, Ordinal::to_value),
            Column::Tags => Value::Set(self.tags.clone()),
            Column::Extra(name) => self.extra.get(name).cloned().unwrap_or(Value::Null),
        }
    }

    /// Store `value` into `column`, coercing it into the column's type.
    pub fn set(&mut self, column: &Column, value: Value) -> Result<()> {
        match column {
            Column::TrackId => {
                self.id = coerce_int(&value, column)?
                    .ok_or_else(|| CatalogError::malformed("Track ID cannot be missing"))?;
            }
            Column::Name => self.name = coerce_text(value).unwrap_or_default(),
            Column::Artist => {
                self.artist = match value {
                    Value::Null => None,
                    Value::List(names) => Some(Artist::List(names)),
                    Value::Set(names) => Some(Artist::List(names.into_iter().collect())),
                    other => Some(Artist::Name(other.to_string())),
                }
            }
            Column::Composer => self.composer = coerce_text(value),
            Column::Album => self.album = coerce_text(value),
            Column::Genre => self.genre = coerce_text(value),
            Column::Year => self.year = coerce_int(&value, column)?,
            Column::DateModified => self.date_modified = coerce_timestamp(&value, column)?,
            Column::DateAdded => self.date_added = coerce_timestamp(&value, column)?,
            Column::PlayCount => self.play_count = coerce_count(&value, column)?,
            Column::Size => self.size = coerce_count(&value, column)?,
            Column::TotalTime => {
                self.total_time = match value {
                    Value::Null => None,
                    Value::Duration(td) => Some(td),
                    Value::Text(ref s) => Some(parse_timedelta(s)?),
                    other => return Err(type_mismatch(column, &other)),
                }
            }
            Column::DiscNumber => self.disc_number = coerce_ordinal(value, column)?,
            Column::TrackNumber => self.track_number = coerce_ordinal(value, column)?,
            Column::Tags => {
                self.tags = match value {
                    Value::Null => BTreeSet::new(),
                    Value::Set(tags) => tags,
                    Value::List(tags) => tags.into_iter().collect(),
                    Value::Text(tag) => BTreeSet::from([tag]),
                    other => return Err(type_mismatch(column, &other)),
                }
            }
            Column::Extra(name) => {
                if value.is_null() {
                    self.extra.remove(name);
                } else {
                    self.extra.insert(name.clone(), value);
                }
            }
        }
        Ok(())
    }

    /// Artist names credited on this track (empty when the artist is missing).
    pub fn artist_names(&self) -> Vec<&str> {
        self.artist.as_ref().map(Artist::names).unwrap_or_default()
    }
}

fn type_mismatch(column: &Column, value: &Value) -> CatalogError {
    CatalogError::malformed(format!("cannot store {:?} in column '{}'", value, column))
}

fn coerce_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Text(s) => Some(s),
        other => Some(other.to_string()),
    }
}

fn coerce_int(value: &Value, column: &Column) -> Result<Option<i64>> {
    match value {
        Value::Null => Ok(None),
        Value::Int(n) => Ok(Some(*n)),
        Value::Float(x) if x.is_nan() => Ok(None),
        Value::Float(x) if x.fract() == 0.0 => Ok(Some(*x as i64)),
        Value::Text(s) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| type_mismatch(column, value)),
        other => Err(type_mismatch(column, other)),
    }
}

fn coerce_count(value: &Value, column: &Column) -> Result<Option<u64>> {
    match coerce_int(value, column)? {
        Some(n) if n < 0 => Err(type_mismatch(column, value)),
        other => Ok(other.map(|n| n as u64)),
    }
}

fn coerce_timestamp(value: &Value, column: &Column) -> Result<Option<NaiveDateTime>> {
    match value {
        Value::Null => Ok(None),
        Value::Timestamp(ts) => Ok(Some(*ts)),
        Value::Text(s) => parse_timestamp(s).map(Some),
        other => Err(type_mismatch(column, other)),
    }
}

fn coerce_ordinal(value: Value, column: &Column) -> Result<Option<Ordinal>> {
    match value {
        Value::Null => Ok(None),
        Value::Int(n) => Ok(Some(Ordinal::Number(n))),
        Value::Float(x) if x.is_nan() => Ok(None),
        Value::Float(x) if x.fract() == 0.0 => Ok(Some(Ordinal::Number(x as i64))),
        Value::Text(s) => Ok(Some(Ordinal::Text(s))),
        other => Err(type_mismatch(column, &other)),
    }
}

// ============================================================================
// Time Formatting
// ============================================================================

const MICROS_PER_SECOND: i64 = 1_000_000;
const MICROS_PER_DAY: i64 = 86_400 * MICROS_PER_SECOND;

/// ISO-8601 form used by snapshots, e.g. "2023-01-05T10:20:30".
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format("%Y-%m-%dT%H:%M:%S%.f").to_string()
}

pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.naive_utc());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(ts);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| CatalogError::malformed(format!("invalid timestamp '{}'", s)))
}

/// Clock portion of a duration: "HH:MM:SS" with microseconds when non-zero.
/// The day count is discarded.
pub fn format_clock(td: TimeDelta) -> String {
    let micros = td
        .num_microseconds()
        .unwrap_or(i64::MAX)
        .rem_euclid(MICROS_PER_DAY);
    let secs = micros / MICROS_PER_SECOND;
    let frac = micros % MICROS_PER_SECOND;
    let clock = format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60);
    if frac == 0 {
        clock
    } else {
        format!("{}.{:06}", clock, frac)
    }
}

/// Text form of a duration, e.g. "0 days 00:03:45" or "-1 days +23:59:59".
pub fn format_timedelta(td: TimeDelta) -> String {
    let micros = td.num_microseconds().unwrap_or(i64::MAX);
    let days = micros.div_euclid(MICROS_PER_DAY);
    let sign = if days < 0 { "+" } else { "" };
    format!("{} days {}{}", days, sign, format_clock(td))
}

/// Parse the text produced by [`format_timedelta`]. A bare clock is accepted too.
pub fn parse_timedelta(s: &str) -> Result<TimeDelta> {
    let invalid = || CatalogError::malformed(format!("invalid duration '{}'", s));
    let trimmed = s.trim();

    let (days, clock) = match trimmed.split_once(" day") {
        Some((days, rest)) => {
            let days: i64 = days.trim().parse().map_err(|_| invalid())?;
            let rest = rest.trim_start_matches('s').trim();
            (days, rest.trim_start_matches('+'))
        }
        None => (0, trimmed),
    };

    let mut micros = days.checked_mul(MICROS_PER_DAY).ok_or_else(invalid)?;
    if !clock.is_empty() {
        let (hms, frac) = clock.split_once('.').unwrap_or((clock, ""));
        let parts: Vec<&str> = hms.split(':').collect();
        if parts.len() != 3 {
            return Err(invalid());
        }
        let mut secs = 0i64;
        for part in parts {
            let n: i64 = part.parse().map_err(|_| invalid())?;
            secs = secs
                .checked_mul(60)
                .and_then(|s| s.checked_add(n))
                .ok_or_else(invalid)?;
        }
        micros = secs
            .checked_mul(MICROS_PER_SECOND)
            .and_then(|us| micros.checked_add(us))
            .ok_or_else(invalid)?;
        if !frac.is_empty() {
            if !frac.chars().all(|c| c.is_ascii_digit()) {
                return Err(invalid());
            }
            let digits: String = frac.chars().chain(std::iter::repeat('0')).take(6).collect();
            let frac_micros = digits.parse::<i64>().map_err(|_| invalid())?;
            micros = micros.checked_add(frac_micros).ok_or_else(invalid)?;
        }
    }
    Ok(TimeDelta::microseconds(micros))
}

/// Whole duration in seconds as a float.
pub fn total_seconds(td: TimeDelta) -> f64 {
    td.num_microseconds()
        .map(|us| us as f64 / MICROS_PER_SECOND as f64)
        .unwrap_or_else(|| td.num_seconds() as f64)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_validity() {
        let schema = Schema::standard(ArtistShape::Scalar, OrdinalKind::Text);
        assert!(schema.is_valid());

        let mut broken = schema.clone();
        broken.columns.retain(|c| c != PLAY_COUNT);
        assert!(!broken.is_valid());
    }

    #[test]
    fn test_schema_union_keeps_order() {
        let a = Schema::new(
            ArtistShape::List,
            OrdinalKind::Numeric,
            vec!["Track ID".into(), "Vocal".into()],
        );
        let b = Schema::new(
            ArtistShape::List,
            OrdinalKind::Text,
            vec!["Track ID".into(), "Tags".into()],
        );
        let merged = a.union(&b);
        assert_eq!(merged.columns, vec!["Track ID", "Vocal", "Tags"]);
        assert_eq!(merged.ordinals, OrdinalKind::Text);
    }

    #[test]
    fn test_artist_key_sorts_list() {
        let artist = Artist::List(vec!["B".into(), "A".into()]);
        assert_eq!(artist.key(), "A,B");
        assert_eq!(Artist::Name("B, A".into()).key(), "B, A");
    }

    #[test]
    fn test_set_coerces_text() {
        let mut track = Track::new(1, "Song", Artist::Name("A".into()));
        track.set(&Column::Year, Value::Text("2001".into())).unwrap();
        assert_eq!(track.year, Some(2001));

        track.set(&Column::TrackNumber, Value::Int(4)).unwrap();
        assert_eq!(track.track_number, Some(Ordinal::Number(4)));

        assert!(track.set(&Column::PlayCount, Value::Text("many".into())).is_err());
        assert!(track.set(&Column::TrackId, Value::Null).is_err());
    }

    #[test]
    fn test_extra_columns_round_trip() {
        let mut track = Track::default();
        let vocal = Column::parse("Vocal");
        track.set(&vocal, Value::Text("Female".into())).unwrap();
        assert_eq!(track.get(&vocal), Value::Text("Female".into()));
        track.set(&vocal, Value::Null).unwrap();
        assert_eq!(track.get(&vocal), Value::Null);
    }

    #[test]
    fn test_timedelta_text_form() {
        let td = TimeDelta::seconds(225);
        assert_eq!(format_timedelta(td), "0 days 00:03:45");
        assert_eq!(parse_timedelta("0 days 00:03:45").unwrap(), td);

        let td = TimeDelta::milliseconds(90_061_500);
        assert_eq!(format_timedelta(td), "1 days 01:01:01.500000");
        assert_eq!(parse_timedelta("1 days 01:01:01.500000").unwrap(), td);
        assert_eq!(parse_timedelta("00:00:07").unwrap(), TimeDelta::seconds(7));
    }

    #[test]
    fn test_timedelta_overflow_is_malformed() {
        for text in [
            "9999999999999 days 00:00:00",
            "0 days 9999999999999:00:00",
            "106751991 days 23:59:59",
            "0 days 00:00:9223372036854775807",
        ] {
            assert!(
                matches!(parse_timedelta(text), Err(CatalogError::MalformedInput(_))),
                "{}",
                text
            );
        }
    }

    #[test]
    fn test_nan_numbers_are_missing() {
        let mut track = Track::new(1, "Song", Artist::Name("A".into()));
        track.year = Some(1999);
        track.set(&Column::Year, Value::Float(f64::NAN)).unwrap();
        assert_eq!(track.year, None);

        track.set(&Column::DiscNumber, Value::Float(f64::NAN)).unwrap();
        assert_eq!(track.disc_number, None);
        track.set(&Column::DiscNumber, Value::Float(2.0)).unwrap();
        assert_eq!(track.disc_number, Some(Ordinal::Number(2)));
    }

    #[test]
    fn test_clock_drops_day_count() {
        let td = TimeDelta::seconds(86_400 + 3_725);
        assert_eq!(format_clock(td), "01:02:05");
    }

    #[test]
    fn test_parse_timestamp_variants() {
        let expected = NaiveDate::from_ymd_opt(2023, 1, 5)
            .unwrap()
            .and_hms_opt(10, 20, 30)
            .unwrap();
        assert_eq!(parse_timestamp("2023-01-05T10:20:30").unwrap(), expected);
        assert_eq!(parse_timestamp("2023-01-05 10:20:30").unwrap(), expected);
        assert_eq!(parse_timestamp("2023-01-05T10:20:30Z").unwrap(), expected);
        assert_eq!(format_timestamp(&expected), "2023-01-05T10:20:30");
        assert!(parse_timestamp("yesterday").is_err());
    }
}
