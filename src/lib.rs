//! Catalog merge library: reconcile media-library catalogs, normalize artist
//! credits, search and chart the result.

pub mod artists;
pub mod catalog;
pub mod config;
pub mod error;
pub mod export;
pub mod merge;
pub mod models;
pub mod normalize;
pub mod playlist;
pub mod progress;
pub mod safety;
pub mod scoring;
pub mod snapshot;
pub mod xml;

pub use catalog::{Catalog, ChartEntry, SearchHit};
pub use error::{CatalogError, Result};
pub use merge::{merge, MergeResult};
