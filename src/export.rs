//! CSV export.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use tracing::info;

use crate::catalog::Catalog;
use crate::error::Result;
use crate::models::{format_clock, Column, Value};

/// Separator for list and set cells.
const ITEM_SEPARATOR: &str = "; ";

fn csv_cell(column: &Column, value: &Value) -> String {
    match (column, value) {
        (Column::TotalTime, Value::Duration(td)) => format_clock(*td),
        (_, Value::List(items)) => items.join(ITEM_SEPARATOR),
        (_, Value::Set(items)) => {
            let items: Vec<&str> = items.iter().map(String::as_str).collect();
            items.join(ITEM_SEPARATOR)
        }
        (_, other) => other.to_string(),
    }
}

impl Catalog {
    /// Write every schema column as CSV with a header row. Fails on an invalid catalog.
    pub fn to_csv<W: Write>(&self, writer: W) -> Result<()> {
        self.ensure_valid()?;

        let columns: Vec<Column> = self
            .schema()
            .columns
            .iter()
            .map(|name| Column::parse(name))
            .collect();

        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(columns.iter().map(Column::as_str))?;
        for track in self.tracks() {
            wtr.write_record(columns.iter().map(|c| csv_cell(c, &track.get(c))))?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.to_csv(File::create(path)?)?;
        info!("exported {} tracks to {}", self.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CatalogError;
    use crate::models::{Artist, ArtistShape, OrdinalKind, Schema, Track};
    use chrono::{NaiveDate, TimeDelta};

    fn export(catalog: &Catalog) -> String {
        let mut out = Vec::new();
        catalog.to_csv(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_csv_cells() {
        let mut track = Track::new(1, "Song, Part 1", Artist::List(vec!["A".into(), "B".into()]));
        track.total_time = Some(TimeDelta::seconds(86_400 + 225));
        track.date_added = NaiveDate::from_ymd_opt(2023, 1, 5).and_then(|d| d.and_hms_opt(10, 20, 30));
        track.tags.insert("Chill".into());
        track.tags.insert("Workout".into());

        let catalog = Catalog::new(Schema::standard(ArtistShape::List, OrdinalKind::Text), vec![track]);
        let csv = export(&catalog);
        let mut lines = csv.lines();

        assert_eq!(
            lines.next(),
            Some(
                "Track ID,Name,Artist,Composer,Album,Genre,Year,Date Modified,Date Added,\
                 Play Count,Size,Total Time,Disc Number,Track Number,Tags"
            )
        );
        assert_eq!(
            lines.next(),
            Some("1,\"Song, Part 1\",A; B,,,,,,2023-01-05 10:20:30,,,00:03:45,,,Chill; Workout")
        );
    }

    #[test]
    fn test_invalid_catalog_is_not_exported() {
        let catalog = Catalog::new(
            Schema::new(ArtistShape::Scalar, OrdinalKind::Text, vec!["Name".into()]),
            Vec::new(),
        );
        let mut out = Vec::new();
        assert!(matches!(catalog.to_csv(&mut out), Err(CatalogError::InvalidCatalog)));
        assert!(out.is_empty());
    }

    #[test]
    fn test_write_csv_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("library.csv");
        let catalog = Catalog::new(
            Schema::standard(ArtistShape::Scalar, OrdinalKind::Text),
            vec![Track::new(7, "Solo", Artist::Name("A".into()))],
        );
        catalog.write_csv(&path).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.lines().nth(1).unwrap().starts_with("7,Solo,A,"));
    }
}
