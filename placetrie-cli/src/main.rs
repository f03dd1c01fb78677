//! PlaceTrie CLI - Command-line interface
//!
//! This binary provides a command-line interface to the PlaceTrie library.
//!
//! # Architecture
//!
//! The CLI is organized into:
//! - `Cli` / `Commands`: Argument parsing (clap)
//! - `CliError`: Centralized error handling with user-friendly messages
//!
//! # Configuration
//!
//! Settings are loaded from `~/.placetrie/config.ini` on startup.
//! CLI arguments override config file values when specified.

mod error;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use error::CliError;
use placetrie::config::ConfigFile;
use placetrie::gzip::{is_gzip, FlateGunzip, Gunzip};
use placetrie::logging::init_logging;
use placetrie::service::{LookupConfig, LookupOutcome, LookupService};
use placetrie::shard::{decode_shard, PlaceKind, ShardStats};
use placetrie::transport::{FileTransport, HttpTransport};

// ============================================================================
// CLI Argument Definitions
// ============================================================================

#[derive(Parser)]
#[command(name = "placetrie")]
#[command(version = placetrie::VERSION)]
#[command(about = "Offline street and POI geocoding", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize configuration file at ~/.placetrie/config.ini
    Init,

    /// Look up a query against the shard set
    Lookup {
        /// The query; an optional ", city" part filters on place names
        query: String,

        /// Shard root: an HTTP(S) URL or a local directory (default: from config)
        #[arg(long)]
        shard_root: Option<String>,

        /// Only return places of these kinds (e.g. street, city, airport)
        #[arg(long)]
        kind: Vec<String>,

        /// Maximum number of results (default: from config)
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Print summary statistics for a shard file or directory of shards
    Stats {
        /// A .packed/.packed.gz file, or a directory containing them
        input: PathBuf,

        /// Print a line per shard in addition to the totals
        #[arg(long)]
        per_shard: bool,
    },
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init => run_init(),
        Commands::Lookup {
            query,
            shard_root,
            kind,
            limit,
        } => run_lookup(query, shard_root, kind, limit).await,
        Commands::Stats { input, per_shard } => run_stats(input, per_shard),
    };

    if let Err(e) = result {
        e.exit();
    }
}

// ============================================================================
// Command Implementations
// ============================================================================

/// Initialize configuration file.
fn run_init() -> Result<(), CliError> {
    let path = ConfigFile::ensure_exists()?;
    println!("Configuration file: {}", path.display());
    println!();
    println!("Edit this file to customize PlaceTrie settings.");
    println!("CLI arguments override config file values when specified.");
    Ok(())
}

/// Parse --kind flags into a kind set.
fn parse_kinds(names: &[String]) -> Result<Option<Vec<PlaceKind>>, CliError> {
    if names.is_empty() {
        return Ok(None);
    }
    let mut kinds = Vec::with_capacity(names.len());
    for name in names {
        let kind = PlaceKind::from_name(name).ok_or_else(|| {
            CliError::Config(format!(
                "Unknown kind '{}'. Valid kinds include: street, airport, \
                 train-station, bus-stop, ferry-terminal, university, museum, \
                 civic-building, sight, city, country, other",
                name
            ))
        })?;
        kinds.push(kind);
    }
    Ok(Some(kinds))
}

async fn run_lookup(
    query: String,
    shard_root: Option<String>,
    kind: Vec<String>,
    limit: Option<usize>,
) -> Result<(), CliError> {
    init_logging();

    let file_config = ConfigFile::load()?;
    let shard_root = shard_root.unwrap_or_else(|| file_config.shard_root.clone());
    if shard_root.is_empty() {
        return Err(CliError::Config(
            "No shard root configured. Set shards.root in config.ini or use --shard-root."
                .to_string(),
        ));
    }

    let mut config = file_config
        .to_lookup_config()
        .with_shard_root(shard_root.clone())
        .with_allowed_kinds(parse_kinds(&kind)?);
    if let Some(limit) = limit {
        config = config.with_max_results(limit);
    }

    // Print banner
    println!("PlaceTrie Lookup v{}", placetrie::VERSION);
    println!("==================");
    println!();
    println!("Shard root: {}", shard_root);
    println!("Query:      {}", query);
    println!();

    let outcome = if shard_root.starts_with("http://") || shard_root.starts_with("https://") {
        let transport = HttpTransport::new().map_err(CliError::Transport)?;
        LookupService::new(config, transport, FlateGunzip)
            .lookup(&query)
            .await
    } else {
        LookupService::new(config, FileTransport::new(), FlateGunzip)
            .lookup(&query)
            .await
    };

    print_outcome(&outcome);
    Ok(())
}

fn print_outcome(outcome: &LookupOutcome) {
    match outcome {
        LookupOutcome::Empty { min_length } | LookupOutcome::Short { min_length } => {
            println!(
                "Type at least {} letters or digits to search.",
                min_length
            );
        }
        LookupOutcome::Stale { .. } => {
            println!("Superseded by a newer lookup.");
        }
        LookupOutcome::Missing { shard_key } => {
            println!("No shard data for prefix '{}'.", shard_key);
        }
        LookupOutcome::Ready {
            shard_key,
            loaded,
            locations,
            results,
        } => {
            println!(
                "Shard '{}': {} locations ({})",
                shard_key,
                locations,
                if *loaded { "fetched" } else { "cached" }
            );
            println!();
            if results.is_empty() {
                println!("No matches.");
                return;
            }
            for (i, candidate) in results.iter().enumerate() {
                println!(
                    "{:3}. {}{} - {}  [{}]  ({:.4}, {:.4})",
                    i + 1,
                    candidate.display,
                    if candidate.exact { " *" } else { "" },
                    candidate.place_label,
                    candidate.kind,
                    candidate.location.lon,
                    candidate.location.lat,
                );
            }
        }
    }
}

/// Collect shard files the way the offline builder lays them out: a single
/// file, or `*.packed` and `*.packed.gz` directly under a directory.
fn shard_files(input: &Path) -> Result<Vec<PathBuf>, CliError> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }
    let entries = std::fs::read_dir(input).map_err(|error| CliError::FileRead {
        path: input.display().to_string(),
        error,
    })?;
    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
            name.ends_with(".packed") || name.ends_with(".packed.gz")
        })
        .collect();
    files.sort();
    Ok(files)
}

fn run_stats(input: PathBuf, per_shard: bool) -> Result<(), CliError> {
    let files = shard_files(&input)?;
    if files.is_empty() {
        return Err(CliError::Config(format!(
            "No shard files found in {}",
            input.display()
        )));
    }

    let mut totals = ShardStats::default();
    let mut total_bytes: u64 = 0;
    for path in &files {
        let raw = std::fs::read(path).map_err(|error| CliError::FileRead {
            path: path.display().to_string(),
            error,
        })?;
        total_bytes += raw.len() as u64;
        let plain = if is_gzip(&raw) {
            FlateGunzip.gunzip(&raw).map_err(|e| CliError::Config(e.to_string()))?
        } else {
            raw
        };
        let shard = decode_shard(&plain).map_err(|error| CliError::Decode {
            path: path.display().to_string(),
            error,
        })?;
        let stats = shard.stats();

        if per_shard {
            println!(
                "{}: v{} scale={} place_nodes={} place_cities={} locations={} \
                 trie_nodes={} trie_edges={} trie_values={}",
                path.display(),
                stats.version,
                stats.scale,
                stats.place_nodes,
                stats.place_cities,
                stats.locations,
                stats.trie_nodes,
                stats.trie_edges,
                stats.trie_values,
            );
        }

        totals.version = stats.version;
        totals.scale = stats.scale;
        totals.place_nodes += stats.place_nodes;
        totals.place_cities += stats.place_cities;
        totals.locations += stats.locations;
        totals.trie_nodes += stats.trie_nodes;
        totals.trie_edges += stats.trie_edges;
        totals.trie_values += stats.trie_values;
    }

    if per_shard {
        println!();
    }
    println!("TOTAL ({} shards, {} bytes on disk)", files.len(), total_bytes);
    println!("  version={} scale={}", totals.version, totals.scale);
    println!(
        "  place_nodes={} place_cities={} locations={} trie_nodes={} \
         trie_edges={} trie_values={}",
        totals.place_nodes,
        totals.place_cities,
        totals.locations,
        totals.trie_nodes,
        totals.trie_edges,
        totals.trie_values,
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kinds_empty_is_unfiltered() {
        assert_eq!(parse_kinds(&[]).unwrap(), None);
    }

    #[test]
    fn test_parse_kinds_known_names() {
        let kinds = parse_kinds(&["city".to_string(), "street".to_string()])
            .unwrap()
            .unwrap();
        assert_eq!(kinds, vec![PlaceKind::City, PlaceKind::Street]);
    }

    #[test]
    fn test_parse_kinds_rejects_unknown() {
        assert!(parse_kinds(&["volcano".to_string()]).is_err());
    }

    #[test]
    fn test_shard_files_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("street_trie.shard_mai.packed");
        std::fs::write(&path, b"x").unwrap();
        assert_eq!(shard_files(&path).unwrap(), vec![path]);
    }

    #[test]
    fn test_shard_files_directory_is_filtered_and_sorted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.packed.gz"), b"x").unwrap();
        std::fs::write(dir.path().join("a.packed"), b"x").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();

        let files = shard_files(dir.path()).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.packed", "b.packed.gz"]);
    }
}
