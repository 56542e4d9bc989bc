//! Binary catalog snapshots (MessagePack).
//!
//! A snapshot is an array of row maps keyed by column name. Timestamps are ISO
//! strings, durations use the "D days HH:MM:SS" text form and sets are wrapped
//! as `{"__set__": [...]}`. NaN floats and nil list entries read as missing.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::info;

use crate::catalog::Catalog;
use crate::error::{CatalogError, Result};
use crate::models::{
    format_timedelta, format_timestamp, ArtistShape, Column, OrdinalKind, Schema, Track, Value,
    ARTIST, DISC_NUMBER, TRACK_NUMBER,
};

/// One cell on the wire. `Set` must stay first so a `__set__` map is not
/// taken for anything else.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
enum WireCell {
    Set {
        #[serde(rename = "__set__")]
        items: Vec<String>,
    },
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<Option<String>>),
}

/// A row map that keeps its column order on the wire.
#[derive(Debug, Default)]
struct WireRow(Vec<(String, Option<WireCell>)>);

impl Serialize for WireRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(name, cell)| (name, cell)))
    }
}

impl<'de> Deserialize<'de> for WireRow {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct RowVisitor;

        impl<'de> Visitor<'de> for RowVisitor {
            type Value = WireRow;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of column names to cells")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<WireRow, A::Error> {
                let mut cells = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some(entry) = access.next_entry()? {
                    cells.push(entry);
                }
                Ok(WireRow(cells))
            }
        }

        deserializer.deserialize_map(RowVisitor)
    }
}

fn to_wire(value: Value) -> Option<WireCell> {
    Some(match value {
        Value::Null => return None,
        Value::Bool(b) => WireCell::Bool(b),
        Value::Int(n) => WireCell::Int(n),
        Value::Float(x) => WireCell::Float(x),
        Value::Text(s) => WireCell::Text(s),
        Value::List(items) => WireCell::List(items.into_iter().map(Some).collect()),
        Value::Set(items) => WireCell::Set {
            items: items.into_iter().collect(),
        },
        Value::Timestamp(ts) => WireCell::Text(format_timestamp(&ts)),
        Value::Duration(td) => WireCell::Text(format_timedelta(td)),
    })
}

fn from_wire(cell: Option<WireCell>) -> Value {
    match cell {
        None => Value::Null,
        Some(WireCell::Bool(b)) => Value::Bool(b),
        Some(WireCell::Int(n)) => Value::Int(n),
        Some(WireCell::Float(x)) if x.is_nan() => Value::Null,
        Some(WireCell::Float(x)) => Value::Float(x),
        Some(WireCell::Text(s)) => Value::Text(s),
        Some(WireCell::List(items)) => Value::List(items.into_iter().flatten().collect()),
        Some(WireCell::Set { items }) => Value::Set(items.into_iter().collect()),
    }
}

// ============================================================================
// Write
// ============================================================================

impl Catalog {
    /// Encode the catalog as a snapshot. Fails on an invalid catalog.
    pub fn to_binary(&self) -> Result<Vec<u8>> {
        self.ensure_valid()?;

        let columns: Vec<Column> = self
            .schema()
            .columns
            .iter()
            .map(|name| Column::parse(name))
            .collect();

        let rows: Vec<WireRow> = self
            .tracks()
            .iter()
            .map(|track| {
                WireRow(
                    columns
                        .iter()
                        .map(|column| (column.to_string(), to_wire(track.get(column))))
                        .collect(),
                )
            })
            .collect();

        Ok(rmp_serde::to_vec_named(&rows)?)
    }

    pub fn write_binary(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.to_binary()?;
        fs::write(path, bytes)?;
        info!("wrote {} tracks to {}", self.len(), path.display());
        Ok(())
    }

    // ========================================================================
    // Read
    // ========================================================================

    /// Decode a snapshot. The artist shape is `List` when any row holds an
    /// artist list, and ordinals are `Text` when any of them is a string.
    pub fn from_binary(bytes: &[u8]) -> Result<Catalog> {
        let rows: Vec<WireRow> = rmp_serde::from_slice(bytes)?;

        let mut columns: Vec<String> = Vec::new();
        let mut artist = ArtistShape::Scalar;
        let mut ordinals = OrdinalKind::Numeric;
        let mut tracks = Vec::with_capacity(rows.len());

        for row in rows {
            let mut track = Track::default();
            for (name, cell) in row.0 {
                if !columns.contains(&name) {
                    columns.push(name.clone());
                }
                match (name.as_str(), &cell) {
                    (ARTIST, Some(WireCell::List(_))) => artist = ArtistShape::List,
                    (DISC_NUMBER | TRACK_NUMBER, Some(WireCell::Text(_))) => {
                        ordinals = OrdinalKind::Text
                    }
                    _ => {}
                }
                track.set(&Column::parse(&name), from_wire(cell))?;
            }
            tracks.push(track);
        }

        Ok(Catalog::new(Schema::new(artist, ordinals, columns), tracks))
    }

    pub fn read_binary(path: impl AsRef<Path>) -> Result<Catalog> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(CatalogError::FileNotFound(path.to_path_buf()));
        }
        let catalog = Catalog::from_binary(&fs::read(path)?)?;
        info!("loaded {} tracks from {}", catalog.len(), path.display());
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Artist, Ordinal};
    use chrono::{NaiveDate, TimeDelta};

    fn sample() -> Catalog {
        let mut track = Track::new(
            42,
            "Hello World",
            Artist::List(vec!["A".into(), "B".into()]),
        );
        track.year = Some(2001);
        track.date_added = NaiveDate::from_ymd_opt(2023, 1, 5).and_then(|d| d.and_hms_opt(10, 20, 30));
        track.play_count = Some(4);
        track.total_time = Some(TimeDelta::milliseconds(225_500));
        track.track_number = Some(Ordinal::Text("3".into()));
        track.tags.insert("Workout".into());
        track.extra.insert("Vocal".into(), Value::Text("Female".into()));

        let mut schema = Schema::standard(ArtistShape::List, OrdinalKind::Text);
        schema.columns.push("Vocal".into());
        Catalog::new(schema, vec![track, Track::new(43, "Bare", Artist::List(vec![]))])
    }

    #[test]
    fn test_round_trip() {
        let catalog = sample();
        let bytes = catalog.to_binary().unwrap();
        let restored = Catalog::from_binary(&bytes).unwrap();

        assert!(restored.is_valid());
        assert_eq!(restored.schema().artist, ArtistShape::List);
        assert_eq!(restored.schema().ordinals, OrdinalKind::Text);
        assert_eq!(restored.schema().columns, catalog.schema().columns);
        assert_eq!(restored.tracks(), catalog.tracks());
    }

    #[test]
    fn test_set_and_duration_wire_form() {
        let mut set = std::collections::BTreeSet::new();
        set.insert("Chill".to_string());
        assert_eq!(
            to_wire(Value::Set(set)),
            Some(WireCell::Set { items: vec!["Chill".into()] })
        );
        assert_eq!(
            to_wire(Value::Duration(TimeDelta::seconds(225))),
            Some(WireCell::Text("0 days 00:03:45".into()))
        );
        assert_eq!(to_wire(Value::Null), None);
    }

    #[test]
    fn test_scalar_snapshot() {
        let mut track = Track::new(1, "Song", Artist::Name("A & B".into()));
        track.disc_number = Some(Ordinal::Number(1));
        let catalog = Catalog::new(
            Schema::standard(ArtistShape::Scalar, OrdinalKind::Numeric),
            vec![track],
        );
        let restored = Catalog::from_binary(&catalog.to_binary().unwrap()).unwrap();
        assert_eq!(restored.schema().artist, ArtistShape::Scalar);
        assert_eq!(restored.schema().ordinals, OrdinalKind::Numeric);
        assert_eq!(restored.tracks()[0].disc_number, Some(Ordinal::Number(1)));
    }

    #[test]
    fn test_invalid_catalog_is_not_written() {
        let catalog = Catalog::new(
            Schema::new(ArtistShape::Scalar, OrdinalKind::Text, vec!["Name".into()]),
            Vec::new(),
        );
        assert!(matches!(catalog.to_binary(), Err(CatalogError::InvalidCatalog)));
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("library.msgpack");
        sample().write_binary(&path).unwrap();
        let restored = Catalog::read_binary(&path).unwrap();
        assert_eq!(restored.len(), 2);

        assert!(matches!(
            Catalog::read_binary(dir.path().join("missing.msgpack")),
            Err(CatalogError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_nan_and_nil_cells_read_as_missing() {
        let row = WireRow(vec![
            ("Track ID".into(), Some(WireCell::Int(9))),
            ("Name".into(), Some(WireCell::Text("Song".into()))),
            ("Artist".into(), Some(WireCell::Text("A".into()))),
            ("Year".into(), Some(WireCell::Float(f64::NAN))),
            ("Play Count".into(), Some(WireCell::Float(3.0))),
            ("Total Time".into(), Some(WireCell::Float(f64::NAN))),
            (
                "Sub Tags".into(),
                Some(WireCell::List(vec![Some("x".into()), None, None])),
            ),
            ("Rating".into(), Some(WireCell::Float(f64::NAN))),
        ]);
        let bytes = rmp_serde::to_vec_named(&vec![row]).unwrap();

        let catalog = Catalog::from_binary(&bytes).unwrap();
        let track = &catalog.tracks()[0];
        assert_eq!(track.year, None);
        assert_eq!(track.play_count, Some(3));
        assert_eq!(track.total_time, None);
        assert_eq!(track.extra.get("Sub Tags"), Some(&Value::List(vec!["x".into()])));
        assert_eq!(track.get(&Column::parse("Rating")), Value::Null);
    }

    #[test]
    fn test_garbage_is_a_decode_error() {
        assert!(matches!(
            Catalog::from_binary(&[0xc1]),
            Err(CatalogError::Decode(_))
        ));
    }
}
