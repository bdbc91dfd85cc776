//! treesnap CLI - Command line interface for tree_snapshot
//!
//! Builds, inspects, verifies and slices snapshot files. Output goes to
//! stdout as JSON; logs go to stderr (`RUST_LOG=tree_snapshot=debug`).

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tree_snapshot::{SnapshotFile, StoreConfig, TreeSnapshot, TreeView};

#[derive(Parser)]
#[command(name = "treesnap")]
#[command(about = "Build and inspect node tree snapshots")]
#[command(version)]
struct Cli {
    /// Output format (json or text)
    #[arg(short, long, default_value = "json")]
    format: OutputFormat,

    /// Path to a JSON store config
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a snapshot file from a JSON tree view
    Build {
        /// JSON tree view
        view: PathBuf,
        /// Snapshot file to write
        output: PathBuf,
        /// Write the bare encoded snapshot without a file header
        #[arg(long)]
        raw: bool,
    },

    /// Print a snapshot as a JSON tree view
    Inspect {
        /// Snapshot file
        file: PathBuf,
        /// Input is a bare encoded snapshot
        #[arg(long)]
        raw: bool,
    },

    /// Parse every level of a snapshot and report its shape
    Verify {
        /// Snapshot file
        file: PathBuf,
        /// Input is a bare encoded snapshot
        #[arg(long)]
        raw: bool,
    },

    /// Write the subtree at an identity path as its own snapshot file
    Extract {
        /// Snapshot file
        file: PathBuf,
        /// Child identities from the root, e.g. `List` `Row:7`
        path: Vec<String>,
        /// Snapshot file to write
        #[arg(short, long)]
        output: PathBuf,
        /// Input and output are bare encoded snapshots
        #[arg(long)]
        raw: bool,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => StoreConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => StoreConfig::default(),
    };

    match cli.command {
        Commands::Build { view, output, raw } => {
            let content = std::fs::read_to_string(&view)
                .with_context(|| format!("Failed to read {}", view.display()))?;
            let view: TreeView = serde_json::from_str(&content)?;
            let snapshot = view.to_snapshot()?;
            let bytes = write_snapshot(&output, &snapshot, raw, &config)?;
            emit(
                cli.format,
                &serde_json::json!({
                    "status": "ok",
                    "nodes": snapshot.node_count()?,
                    "bytes": bytes,
                    "message": format!("Wrote snapshot to {}", output.display())
                }),
            )?;
        }

        Commands::Inspect { file, raw } => {
            let snapshot = read_snapshot(&file, raw, &config)?;
            let mut value = serde_json::json!({
                "tree": TreeView::from_snapshot(&snapshot)?,
            });
            if !raw {
                let header = SnapshotFile::read_header(&file)?;
                value["header"] = serde_json::json!({
                    "version": header.version,
                    "compressed": header.compressed,
                    "payload_len": header.payload_len,
                    "checksum": header.checksum_hex(),
                });
            }
            emit(cli.format, &value)?;
        }

        Commands::Verify { file, raw } => {
            let snapshot = read_snapshot(&file, raw, &config)?;
            snapshot.validate()?;
            let checksum = if raw {
                blake3::hash(&std::fs::read(&file)?).to_hex().to_string()
            } else {
                SnapshotFile::read_header(&file)?.checksum_hex()
            };
            emit(
                cli.format,
                &serde_json::json!({
                    "status": "ok",
                    "nodes": snapshot.node_count()?,
                    "depth": snapshot.depth()?,
                    "checksum": checksum,
                }),
            )?;
        }

        Commands::Extract {
            file,
            path,
            output,
            raw,
        } => {
            let snapshot = read_snapshot(&file, raw, &config)?;
            let subtree = resolve_path(&snapshot, &path)?;
            let bytes = write_snapshot(&output, subtree, raw, &config)?;
            emit(
                cli.format,
                &serde_json::json!({
                    "status": "ok",
                    "path": path,
                    "nodes": subtree.node_count()?,
                    "bytes": bytes,
                }),
            )?;
        }
    }

    Ok(())
}

fn read_snapshot(path: &Path, raw: bool, config: &StoreConfig) -> anyhow::Result<TreeSnapshot> {
    let snapshot = if raw {
        let data =
            std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        TreeSnapshot::parse(data)?
    } else {
        SnapshotFile::load(path, config)
            .with_context(|| format!("Failed to load {}", path.display()))?
    };
    Ok(snapshot)
}

/// Write a snapshot, returning the number of bytes written
fn write_snapshot(
    path: &Path,
    snapshot: &TreeSnapshot,
    raw: bool,
    config: &StoreConfig,
) -> anyhow::Result<u64> {
    if raw {
        let bytes = snapshot.to_bytes()?;
        std::fs::write(path, &bytes)?;
        Ok(bytes.len() as u64)
    } else {
        let header = SnapshotFile::save(path, snapshot, config)?;
        Ok(tree_snapshot::store::HEADER_SIZE as u64 + header.payload_len)
    }
}

/// Walk down by matching each segment against the children's display form
///
/// A name containing `:` can print the same as a keyed identity, so a
/// segment matching more than one child is an error rather than a guess.
fn resolve_path<'a>(root: &'a TreeSnapshot, path: &[String]) -> anyhow::Result<&'a TreeSnapshot> {
    let mut current = root;
    for (depth, segment) in path.iter().enumerate() {
        let at = path[..depth].join("/");
        let mut matches = current
            .children()?
            .iter()
            .filter(|(id, _)| id.to_string() == *segment);
        current = match (matches.next(), matches.next()) {
            (Some((_, child)), None) => child,
            (None, _) => anyhow::bail!("No child {} at /{}", segment, at),
            (Some(_), Some(_)) => {
                anyhow::bail!("Ambiguous child {} at /{}: several identities match", segment, at)
            }
        };
    }
    Ok(current)
}

fn emit(format: OutputFormat, value: &serde_json::Value) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string(value)?),
        OutputFormat::Text => println!("{}", serde_json::to_string_pretty(value)?),
    }
    Ok(())
}
