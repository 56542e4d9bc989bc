use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Instant;

use catalog_merge::config::MergeConfig;
use catalog_merge::merge::merge;
use catalog_merge::models::TAGS;
use catalog_merge::playlist::PlaylistTable;
use catalog_merge::progress::{format_duration, set_log_only, Phase};
use catalog_merge::safety::validate_output_path;
use catalog_merge::scoring::SearchMode;
use catalog_merge::Catalog;

const SNAPSHOT_EXTENSIONS: [&str; 2] = ["msgpack", "mpk"];
const CATALOG_OUTPUT_EXTENSIONS: [&str; 3] = ["msgpack", "mpk", "csv"];
const PLAYLIST_PREVIEW: usize = 10;

#[derive(Parser)]
#[command(name = "catalog-merge")]
#[command(about = "Merge, search and chart media-library catalogs")]
struct Args {
    /// Hide spinners and log phase completions instead (tail-friendly output)
    #[arg(long, global = true)]
    log_only: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Merge a previous catalog with a newer export
    Merge {
        /// Previous catalog (.msgpack/.mpk snapshot or .xml export)
        #[arg(long)]
        prev: PathBuf,

        /// Newer catalog (.msgpack/.mpk snapshot or .xml export)
        #[arg(long)]
        next: PathBuf,

        /// YAML merge rules (artist renames, comma names, title aliases)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Merged snapshot to write
        #[arg(long)]
        output: PathBuf,

        /// Also export the merged catalog as CSV
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Include tracks only present in the newer catalog
        #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
        include_added: bool,

        /// Include tracks only present in the previous catalog
        #[arg(long)]
        include_removed: bool,
    },

    /// Convert a catalog to a snapshot or CSV, optionally filtering by tag
    Convert {
        input: PathBuf,

        output: PathBuf,

        /// Keep only tracks carrying one of these tags (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,

        /// Drop tracks carrying any of these tags (repeatable)
        #[arg(long = "exclude-tag")]
        exclude_tags: Vec<String>,
    },

    /// Search a catalog
    Search {
        input: PathBuf,

        query: String,

        /// Columns to search (comma-separated); defaults to every text column
        #[arg(long, value_delimiter = ',')]
        columns: Vec<String>,

        /// Fuzzy similarity instead of substring matching
        #[arg(long)]
        fuzzy: bool,

        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Rank artists by play-weighted listening time
    Chart {
        input: PathBuf,

        #[arg(long, default_value = "25")]
        top: usize,

        /// Print the chart as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the distinct artists of a catalog after extraction
    Artists {
        input: PathBuf,

        /// YAML merge rules used for renames and comma names
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Parse an exported playlist file
    Playlist {
        path: PathBuf,

        /// Write the table as CSV instead of printing a summary
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| extensions.iter().any(|x| e.eq_ignore_ascii_case(x)))
        .unwrap_or(false)
}

fn load_catalog(path: &Path) -> Result<Catalog> {
    let phase = Phase::start(&format!("Loading {}", path.display()));
    let loaded = if has_extension(path, &["xml"]) {
        Catalog::from_xml(path)
    } else if has_extension(path, &SNAPSHOT_EXTENSIONS) {
        Catalog::read_binary(path)
    } else {
        bail!(
            "Unsupported catalog format '{}': expected .xml, .msgpack or .mpk",
            path.display()
        );
    };
    let catalog = loaded.with_context(|| format!("Failed to load catalog {}", path.display()))?;
    phase.finish(&format!("{} tracks", catalog.len()));
    Ok(catalog)
}

fn load_config(path: Option<&Path>) -> Result<MergeConfig> {
    match path {
        Some(path) => MergeConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(MergeConfig::default()),
    }
}

fn write_catalog(catalog: &Catalog, output: &Path, inputs: &[&Path]) -> Result<()> {
    validate_output_path(output, &CATALOG_OUTPUT_EXTENSIONS, inputs)?;

    let phase = Phase::start(&format!("Writing {}", output.display()));
    let written = if has_extension(output, &["csv"]) {
        catalog.write_csv(output)
    } else {
        catalog.write_binary(output)
    };
    written.with_context(|| format!("Failed to write {}", output.display()))?;
    phase.finish(&format!("{} tracks", catalog.len()));
    Ok(())
}

// ============================================================================
// Commands
// ============================================================================

fn run_merge(
    prev: &Path,
    next: &Path,
    config: Option<&Path>,
    output: &Path,
    csv: Option<&Path>,
    include_added: bool,
    include_removed: bool,
) -> Result<()> {
    let config = load_config(config)?;
    let prev_catalog = load_catalog(prev)?;
    let next_catalog = load_catalog(next)?;

    let phase = Phase::start("Merging");
    let result = merge(&prev_catalog, &next_catalog, &config).context("Merge failed")?;
    phase.finish(&result.to_string());

    let merged = result.as_catalog(include_added, include_removed);
    write_catalog(&merged, output, &[prev, next])?;
    if let Some(csv) = csv {
        write_catalog(&merged, csv, &[prev, next])?;
    }

    println!("\n{:=<60}", "");
    println!("Merge complete!");
    println!("  Matched: {}", result.matched().len());
    println!("  Added:   {}", result.added().len());
    println!("  Removed: {}", result.removed().len());
    println!("  Written: {}", merged.len());
    println!("{:=<60}", "");
    Ok(())
}

fn run_convert(input: &Path, output: &Path, tags: &[String], exclude_tags: &[String]) -> Result<()> {
    let mut catalog = load_catalog(input)?;
    if !tags.is_empty() || !exclude_tags.is_empty() {
        catalog = catalog
            .filter(TAGS, Some(tags), Some(exclude_tags))
            .context("Tag filter failed")?;
    }
    write_catalog(&catalog, output, &[input])
}

fn run_search(input: &Path, query: &str, columns: &[String], fuzzy: bool, limit: usize) -> Result<()> {
    let catalog = load_catalog(input)?;
    let hits = catalog
        .rank(query, columns, SearchMode::from_contains(!fuzzy))
        .context("Search failed")?;

    println!("\nSearch results for '{}':", query);
    println!("{:-<80}", "");

    for hit in hits.iter().take(limit) {
        let track = &catalog.tracks()[hit.index];
        println!(
            "[{}] {} - {} ({}) score={:.1}",
            track.id,
            track.artist_names().join(", "),
            track.name,
            track.album.as_deref().unwrap_or("Unknown"),
            hit.score
        );
    }

    if hits.is_empty() {
        println!("No results found.");
    } else if hits.len() > limit {
        println!("... and {} more", hits.len() - limit);
    }
    Ok(())
}

fn run_chart(input: &Path, top: usize, json: bool) -> Result<()> {
    let catalog = load_catalog(input)?;
    let chart: Vec<_> = catalog.artist_chart().into_iter().take(top).collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&chart)?);
        return Ok(());
    }

    println!("\n{:>4}  {:<40} {:>14} {:>6}", "#", "Artist", "Score", "Tracks");
    println!("{:-<70}", "");
    for (rank, entry) in chart.iter().enumerate() {
        println!(
            "{:>4}  {:<40} {:>14.2} {:>6}",
            rank + 1,
            entry.artist,
            entry.score,
            entry.occurrences
        );
    }
    Ok(())
}

fn run_artists(input: &Path, config: Option<&Path>) -> Result<()> {
    let config = load_config(config)?;
    let catalog = load_catalog(input)?;
    let nested = catalog
        .nested_artists(&config.artist_renames, &config.artists_with_comma)
        .context("Artist extraction failed")?;

    for artist in nested.artists() {
        println!("{}", artist);
    }
    Ok(())
}

fn run_playlist(path: &Path, output: Option<&Path>) -> Result<()> {
    let table = PlaylistTable::read(path)
        .with_context(|| format!("Failed to read playlist {}", path.display()))?;

    match output {
        Some(output) => {
            validate_output_path(output, &["csv"], &[path])?;
            let file = std::fs::File::create(output)
                .with_context(|| format!("Failed to create {}", output.display()))?;
            table.to_csv(file)?;
            println!("Wrote {} rows to {}", table.len(), output.display());
        }
        None => {
            println!("Columns: {}", table.header.join(", "));
            println!("Rows:    {}", table.len());
            if let Some(names) = table.column("Name") {
                for name in names.iter().take(PLAYLIST_PREVIEW) {
                    println!("  {}", name);
                }
                if names.len() > PLAYLIST_PREVIEW {
                    println!("  ... and {} more", names.len() - PLAYLIST_PREVIEW);
                }
            }
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    set_log_only(args.log_only);

    let start = Instant::now();

    match &args.command {
        Command::Merge {
            prev,
            next,
            config,
            output,
            csv,
            include_added,
            include_removed,
        } => run_merge(
            prev,
            next,
            config.as_deref(),
            output,
            csv.as_deref(),
            *include_added,
            *include_removed,
        )?,
        Command::Convert {
            input,
            output,
            tags,
            exclude_tags,
        } => run_convert(input, output, tags, exclude_tags)?,
        Command::Search {
            input,
            query,
            columns,
            fuzzy,
            limit,
        } => run_search(input, query, columns, *fuzzy, *limit)?,
        Command::Chart { input, top, json } => run_chart(input, *top, *json)?,
        Command::Artists { input, config } => run_artists(input, config.as_deref())?,
        Command::Playlist { path, output } => run_playlist(path, output.as_deref())?,
    }

    tracing::debug!("done in {}", format_duration(start.elapsed()));
    Ok(())
}
