//! Merge engine: reconcile a previous catalog with a newer one.
//!
//! Tracks are matched on (title, sorted artist list) after artist extraction
//! and title aliasing. A matched track keeps its curated metadata from the
//! previous catalog and takes the freshness fields (play count, dates, ids,
//! tags) from the newer one.

use std::fmt;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, info};

use crate::artists::ArtistExtractor;
use crate::catalog::Catalog;
use crate::config::MergeConfig;
use crate::error::{CatalogError, Result};
use crate::models::{
    Artist, ArtistShape, Schema, Track, COMPOSER, DATE_ADDED, DATE_MODIFIED, DISC_NUMBER,
    PLAY_COUNT, SIZE, TAGS, TOTAL_TIME, TRACK_ID, TRACK_NUMBER,
};

/// Columns a matched track takes from the newer catalog.
pub const FRESHNESS_COLUMNS: [&str; 10] = [
    COMPOSER,
    DATE_ADDED,
    DATE_MODIFIED,
    DISC_NUMBER,
    PLAY_COUNT,
    SIZE,
    TAGS,
    TOTAL_TIME,
    TRACK_ID,
    TRACK_NUMBER,
];

/// (title, sorted artists joined by ",")
type MergeKey = (String, String);

fn merge_key(track: &Track) -> MergeKey {
    let artists = track.artist.as_ref().map(Artist::key).unwrap_or_default();
    (track.name.clone(), artists)
}

fn copy_freshness(target: &mut Track, source: &Track) {
    target.composer = source.composer.clone();
    target.date_added = source.date_added;
    target.date_modified = source.date_modified;
    target.disc_number = source.disc_number.clone();
    target.play_count = source.play_count;
    target.size = source.size;
    target.tags = source.tags.clone();
    target.total_time = source.total_time;
    target.id = source.id;
    target.track_number = source.track_number.clone();
}

// ============================================================================
// Merge Result
// ============================================================================

/// The three partitions of a merge. Read-only once built.
#[derive(Clone, Debug)]
pub struct MergeResult {
    matched: Catalog,
    added: Catalog,
    removed: Catalog,
}

impl MergeResult {
    /// Tracks found in both catalogs.
    pub fn matched(&self) -> &Catalog {
        &self.matched
    }

    /// Tracks only in the newer catalog.
    pub fn added(&self) -> &Catalog {
        &self.added
    }

    /// Tracks only in the previous catalog.
    pub fn removed(&self) -> &Catalog {
        &self.removed
    }

    /// Concatenate the matched tracks with the requested partitions, sorted by
    /// track id. Tracks with the same id keep their partition order.
    pub fn as_catalog(&self, include_added: bool, include_removed: bool) -> Catalog {
        let mut schema = self.matched.schema().clone();
        let mut tracks = self.matched.tracks().to_vec();

        if include_added {
            schema = schema.union(self.added.schema());
            tracks.extend_from_slice(self.added.tracks());
        }
        if include_removed {
            schema = schema.union(self.removed.schema());
            tracks.extend_from_slice(self.removed.tracks());
        }

        tracks.sort_by_key(|t| t.id);
        Catalog::new(schema, tracks)
    }
}

impl fmt::Display for MergeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Merge Result <Matched/Added/Removed: {}/{}/{}>",
            self.matched.len(),
            self.added.len(),
            self.removed.len()
        )
    }
}

// ============================================================================
// Merge
// ============================================================================

/// Bring a catalog to list-valued artists and apply the title aliases.
fn prepare(catalog: &Catalog, config: &MergeConfig) -> Result<Catalog> {
    let nested = match catalog.schema().artist {
        ArtistShape::Scalar => {
            catalog.nested_artists(&config.artist_renames, &config.artists_with_comma)?
        }
        ArtistShape::List => {
            let extractor =
                ArtistExtractor::new(&config.artist_renames, &config.artists_with_comma);
            let tracks = catalog
                .tracks()
                .iter()
                .map(|t| {
                    let mut track = t.clone();
                    if let Some(Artist::List(names)) = &t.artist {
                        track.artist = Some(Artist::List(extractor.rename_list(names)));
                    }
                    track
                })
                .collect();
            Catalog::new(catalog.schema().clone(), tracks)
        }
    };

    if config.aliases.is_empty() {
        return Ok(nested);
    }

    let (schema, mut tracks) = nested.into_parts();
    for track in &mut tracks {
        let title = config.aliases.resolve(&track.artist_names(), &track.name);
        track.name = title;
    }
    Ok(Catalog::new(schema, tracks))
}

/// Merge `prev` with `next`.
///
/// When several tracks share a key, the first previous track is kept and takes
/// its freshness fields from the first newer track. Unmatched tracks are all
/// kept in source order.
pub fn merge(prev: &Catalog, next: &Catalog, config: &MergeConfig) -> Result<MergeResult> {
    if !(prev.is_valid() && next.is_valid()) {
        return Err(CatalogError::InvalidCatalog);
    }

    let prev = prepare(prev, config)?;
    let next = prepare(next, config)?;

    let mut next_index: FxHashMap<MergeKey, usize> = FxHashMap::default();
    for (i, track) in next.tracks().iter().enumerate() {
        next_index.entry(merge_key(track)).or_insert(i);
    }

    let mut prev_keys: FxHashSet<MergeKey> = FxHashSet::default();
    let mut matched = Vec::new();
    let mut removed = Vec::new();

    for track in prev.tracks() {
        let key = merge_key(track);
        match next_index.get(&key) {
            Some(&i) => {
                if prev_keys.insert(key) {
                    let mut merged = track.clone();
                    copy_freshness(&mut merged, &next.tracks()[i]);
                    matched.push(merged);
                } else {
                    debug!("dropping duplicate of '{}' (id {})", track.name, track.id);
                }
            }
            None => {
                prev_keys.insert(key);
                removed.push(track.clone());
            }
        }
    }

    let added: Vec<Track> = next
        .tracks()
        .iter()
        .filter(|t| !prev_keys.contains(&merge_key(t)))
        .cloned()
        .collect();

    let mut matched_columns = prev.schema().columns.clone();
    for column in FRESHNESS_COLUMNS {
        if next.schema().has_column(column) && !prev.schema().has_column(column) {
            matched_columns.push(column.to_string());
        }
    }
    let matched_schema = Schema::new(
        ArtistShape::List,
        prev.schema().ordinals.combine(next.schema().ordinals),
        matched_columns,
    );

    info!(
        "merge: {} matched, {} added, {} removed",
        matched.len(),
        added.len(),
        removed.len()
    );

    Ok(MergeResult {
        matched: Catalog::new(matched_schema, matched),
        added: Catalog::new(next.schema().clone(), added),
        removed: Catalog::new(prev.schema().clone(), removed),
    })
}

// ============================================================================
// TESTS
// ============================================================================
