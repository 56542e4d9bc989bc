//! The catalog container: an immutable table of tracks plus its schema.
//!
//! Every operation returns a new `Catalog` and leaves the receiver untouched.

use std::fmt;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use tracing::debug;

use crate::artists::ArtistExtractor;
use crate::config::ArtistRenames;
use crate::error::{CatalogError, Result};
use crate::models::{total_seconds, Artist, ArtistShape, Column, OrdinalKind, Schema, Track, Value};
use crate::normalize::{custom_sort, normalize_text};
use crate::scoring::{score_row, SearchMode};

#[derive(Clone, Debug, PartialEq)]
pub struct Catalog {
    schema: Schema,
    tracks: Vec<Track>,
}

/// One line of the artist chart.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartEntry {
    pub artist: String,
    /// Σ play count × seconds / number of credited artists, rounded to 2 decimals.
    pub score: f64,
    /// Number of tracks crediting the artist.
    pub occurrences: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SearchHit {
    pub index: usize,
    pub score: f64,
}

impl Catalog {
    pub fn new(schema: Schema, tracks: Vec<Track>) -> Self {
        Self { schema, tracks }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn is_valid(&self) -> bool {
        self.schema.is_valid()
    }

    /// Owned copy of the rows. Fails on an invalid catalog.
    pub fn data(&self) -> Result<Vec<Track>> {
        self.ensure_valid()?;
        Ok(self.tracks.clone())
    }

    pub fn into_parts(self) -> (Schema, Vec<Track>) {
        (self.schema, self.tracks)
    }

    pub(crate) fn ensure_valid(&self) -> Result<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(CatalogError::InvalidCatalog)
        }
    }

    fn resolve_column(&self, name: &str) -> Result<Column> {
        if self.schema.has_column(name) {
            Ok(Column::parse(name))
        } else {
            Err(CatalogError::ColumnNotFound(name.to_string()))
        }
    }

    fn with_tracks(&self, tracks: Vec<Track>) -> Catalog {
        Catalog::new(self.schema.clone(), tracks)
    }

    // ========================================================================
    // Filter / Map
    // ========================================================================

    /// Keep rows by value membership. The blacklist wins over the whitelist.
    ///
    /// On `Tags` rows are tested by set intersection, and a non-empty
    /// whitelist also narrows each kept tag set to the whitelisted tags.
    pub fn filter(
        &self,
        column: &str,
        whitelist: Option<&[String]>,
        blacklist: Option<&[String]>,
    ) -> Result<Catalog> {
        self.ensure_valid()?;
        let column = self.resolve_column(column)?;

        let black: FxHashSet<&str> = blacklist
            .unwrap_or_default()
            .iter()
            .map(String::as_str)
            .collect();
        let white: FxHashSet<&str> = whitelist
            .unwrap_or_default()
            .iter()
            .map(String::as_str)
            .collect();

        let tracks: Vec<Track> = if column == Column::Tags {
            self.tracks
                .iter()
                .filter(|t| !t.tags.iter().any(|tag| black.contains(tag.as_str())))
                .filter(|t| white.is_empty() || t.tags.iter().any(|tag| white.contains(tag.as_str())))
                .map(|t| {
                    let mut track = t.clone();
                    if !white.is_empty() {
                        track.tags.retain(|tag| white.contains(tag.as_str()));
                    }
                    track
                })
                .collect()
        } else {
            self.tracks
                .iter()
                .filter(|t| {
                    let keys = cell_keys(&t.get(&column));
                    let banned = keys.iter().any(|k| black.contains(k.as_str()));
                    let allowed = white.is_empty() || keys.iter().any(|k| white.contains(k.as_str()));
                    !banned && allowed
                })
                .cloned()
                .collect()
        };

        debug!("filter on '{}' kept {}/{} tracks", column, tracks.len(), self.len());
        Ok(self.with_tracks(tracks))
    }

    /// Map values of a column through `table`.
    ///
    /// Tags missing from the table pass through unchanged. For any other
    /// column a value missing from the table becomes missing.
    pub fn map(&self, column: &str, table: &FxHashMap<String, String>) -> Result<Catalog> {
        self.ensure_valid()?;
        let column = self.resolve_column(column)?;

        if column == Column::Artist && self.schema.artist == ArtistShape::List {
            return Err(CatalogError::malformed(
                "cannot map a list-valued artist column; use artist renames instead",
            ));
        }

        let mut tracks = Vec::with_capacity(self.len());
        for t in &self.tracks {
            let mut track = t.clone();
            if column == Column::Tags {
                track.tags = t
                    .tags
                    .iter()
                    .map(|tag| table.get(tag).unwrap_or(tag).clone())
                    .collect();
            } else {
                let mapped = t
                    .get(&column)
                    .key()
                    .and_then(|key| table.get(&key))
                    .map_or(Value::Null, |to| Value::Text(to.clone()));
                track.set(&column, mapped)?;
            }
            tracks.push(track);
        }

        Ok(self.with_tracks(tracks))
    }

    // ========================================================================
    // Artists
    // ========================================================================

    /// Replace every raw artist string with its extracted artist list.
    pub fn nested_artists(
        &self,
        renames: &ArtistRenames,
        artists_with_comma: &[String],
    ) -> Result<Catalog> {
        self.ensure_valid()?;
        let extractor = ArtistExtractor::new(renames, artists_with_comma);

        let mut tracks = Vec::with_capacity(self.len());
        for t in &self.tracks {
            let artist = t.artist.as_ref().ok_or_else(|| {
                CatalogError::malformed(format!(
                    "track {} has no artist; the artist field must be a string or a list",
                    t.id
                ))
            })?;
            let mut track = t.clone();
            track.artist = Some(Artist::List(extractor.extract(artist, &t.name)));
            tracks.push(track);
        }

        let mut schema = self.schema.clone();
        schema.artist = ArtistShape::List;
        Ok(Catalog::new(schema, tracks))
    }

    /// Distinct artist names in display order.
    pub fn artists(&self) -> Vec<String> {
        let mut seen = FxHashSet::default();
        let unique: Vec<Option<String>> = self
            .tracks
            .iter()
            .flat_map(|t| t.artist_names())
            .filter(|name| seen.insert(*name))
            .map(|name| Some(name.to_string()))
            .collect();
        custom_sort(unique, true).into_iter().flatten().collect()
    }

    /// Artists ranked by play-weighted listening time.
    ///
    /// Rows without a play count or duration still count as occurrences but
    /// contribute no score.
    pub fn artist_chart(&self) -> Vec<ChartEntry> {
        let mut occurrences: FxHashMap<&str, usize> = FxHashMap::default();
        let mut scores: FxHashMap<&str, f64> = FxHashMap::default();
        let mut order: Vec<&str> = Vec::new();

        for track in &self.tracks {
            let artists = track.artist_names();
            for &artist in &artists {
                *occurrences.entry(artist).or_insert(0) += 1;
            }

            let (Some(play_count), Some(total_time)) = (track.play_count, track.total_time) else {
                continue;
            };
            if artists.is_empty() {
                continue;
            }

            let seconds = total_seconds(total_time);
            let share = play_count as f64 * seconds / artists.len() as f64;
            for &artist in &artists {
                let score = scores.entry(artist).or_insert_with(|| {
                    order.push(artist);
                    0.0
                });
                *score += share;
            }
        }

        let mut chart: Vec<ChartEntry> = order
            .into_iter()
            .map(|artist| ChartEntry {
                artist: artist.to_string(),
                score: (scores.get(artist).copied().unwrap_or(0.0) * 100.0).round() / 100.0,
                occurrences: occurrences.get(artist).copied().unwrap_or(0),
            })
            .collect();
        chart.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| b.occurrences.cmp(&a.occurrences))
        });
        chart
    }

    // ========================================================================
    // Search
    // ========================================================================

    /// Columns a free-text search can look into.
    pub fn text_columns(&self) -> Vec<Column> {
        self.schema
            .columns
            .iter()
            .map(|name| Column::parse(name))
            .filter(|column| match column {
                Column::Name
                | Column::Artist
                | Column::Composer
                | Column::Album
                | Column::Genre
                | Column::Tags => true,
                Column::DiscNumber | Column::TrackNumber => {
                    self.schema.ordinals == OrdinalKind::Text
                }
                Column::Extra(name) => self
                    .tracks
                    .iter()
                    .all(|t| t.extra.get(name).map_or(true, Value::is_textual)),
                _ => false,
            })
            .collect()
    }

    /// Score every row against `query` and return the accepted rows, best first.
    /// Rows with equal scores keep their catalog order.
    ///
    /// `columns` restricts the search to those text columns; when none of them
    /// is a text column of this catalog, every text column is searched.
    pub fn rank(&self, query: &str, columns: &[String], mode: SearchMode) -> Result<Vec<SearchHit>> {
        self.ensure_valid()?;

        let available = self.text_columns();
        let mut selected: Vec<Column> = available
            .iter()
            .filter(|c| columns.iter().any(|name| name == c.as_str()))
            .cloned()
            .collect();
        if selected.is_empty() {
            selected = available;
        }

        let query_norm = normalize_text(query, false);
        let mut hits: Vec<SearchHit> = self
            .tracks
            .iter()
            .enumerate()
            .map(|(index, track)| {
                let cells: Vec<Value> = selected.iter().map(|c| track.get(c)).collect();
                SearchHit {
                    index,
                    score: score_row(&query_norm, cells.iter(), mode),
                }
            })
            .filter(|hit| mode.accepts(hit.score))
            .collect();
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));

        debug!("search '{}' matched {} tracks", query, hits.len());
        Ok(hits)
    }

    /// Matching rows as a new catalog, best match first.
    pub fn search(&self, query: &str, columns: &[String], contains: bool) -> Result<Catalog> {
        let hits = self.rank(query, columns, SearchMode::from_contains(contains))?;
        let tracks = hits.iter().map(|hit| self.tracks[hit.index].clone()).collect();
        Ok(self.with_tracks(tracks))
    }
}

/// Membership keys of a cell: one per list/set item, none for `Null`.
fn cell_keys(value: &Value) -> Vec<String> {
    match value {
        Value::Null => Vec::new(),
        Value::List(items) => items.clone(),
        Value::Set(items) => items.iter().cloned().collect(),
        other => other.key().into_iter().collect(),
    }
}

impl fmt::Display for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "Catalog <{} tracks>", self.len())
        } else {
            write!(f, "Catalog <invalid>")
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
