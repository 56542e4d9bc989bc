//! Parser for exported playlist files: UTF-16 text, tab separated, header first.

use std::fs;
use std::io::Write;
use std::path::Path;

use tracing::debug;

use crate::error::{CatalogError, Result};

const BOM_LE: [u8; 2] = [0xFF, 0xFE];
const BOM_BE: [u8; 2] = [0xFE, 0xFF];

/// A playlist export as a rectangular table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlaylistTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Decode UTF-16 bytes. The byte order comes from the BOM, little-endian without one.
pub fn decode_utf16(bytes: &[u8]) -> Result<String> {
    let (body, big_endian) = if bytes.starts_with(&BOM_LE) {
        (&bytes[2..], false)
    } else if bytes.starts_with(&BOM_BE) {
        (&bytes[2..], true)
    } else {
        (bytes, false)
    };

    if body.len() % 2 != 0 {
        return Err(CatalogError::malformed("UTF-16 input has an odd number of bytes"));
    }

    let units: Vec<u16> = body
        .chunks_exact(2)
        .map(|pair| {
            let pair = [pair[0], pair[1]];
            if big_endian {
                u16::from_be_bytes(pair)
            } else {
                u16::from_le_bytes(pair)
            }
        })
        .collect();

    String::from_utf16(&units).map_err(|e| CatalogError::malformed(format!("invalid UTF-16: {}", e)))
}

impl PlaylistTable {
    pub fn read(path: impl AsRef<Path>) -> Result<PlaylistTable> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(CatalogError::FileNotFound(path.to_path_buf()));
        }
        let text = decode_utf16(&fs::read(path)?)?;
        PlaylistTable::parse(&text)
    }

    /// Parse decoded text. Cells are trimmed, short rows are padded with empty
    /// cells, and `Extra_{n}` header columns are added for rows wider than the header.
    pub fn parse(text: &str) -> Result<PlaylistTable> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .flexible(true)
            .from_reader(text.as_bytes());

        let mut records = Vec::new();
        for record in reader.records() {
            let record = record?;
            records.push(record.iter().map(|cell| cell.trim().to_string()).collect::<Vec<_>>());
        }

        let mut records = records.into_iter();
        let mut header = records
            .next()
            .ok_or_else(|| CatalogError::malformed("playlist file has no rows"))?;
        let mut rows: Vec<Vec<String>> = records.collect();

        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        while header.len() < width {
            header.push(format!("Extra_{}", header.len() + 1));
        }
        for row in &mut rows {
            row.resize(header.len(), String::new());
        }

        debug!("parsed playlist with {} columns and {} rows", header.len(), rows.len());
        Ok(PlaylistTable { header, rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cells of the named column, top to bottom.
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let index = self.header.iter().position(|h| h == name)?;
        Some(self.rows.iter().map(|row| row[index].as_str()).collect())
    }

    pub fn to_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(&self.header)?;
        for row in &self.rows {
            wtr.write_record(row)?;
        }
        wtr.flush()?;
        Ok(())
    }
}
