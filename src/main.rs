//! AppScout: finds installed application executables.
//!
//! Thin binary entry point. All logic lives in the `appscout-core` crate;
//! this front end runs one discovery session to completion and prints the
//! resulting list.

use anyhow::Context;
use appscout_core::catalog::{ProgramCatalog, SortOrder};
use appscout_core::config::TARGET_EXTENSION;
use appscout_core::locator::locate_default_roots;
use appscout_core::metadata::extract_item;
use appscout_core::scanner::start_discovery;
use appscout_core::selection::resolve_manual_override;
use appscout_core::DiscoveredItem;
use clap::{Parser, ValueEnum};
use std::collections::HashSet;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "appscout", version, about = "Find installed application executables")]
struct Cli {
    /// Use this executable directly instead of searching.
    #[arg(long, value_name = "EXE")]
    path: Option<String>,

    /// Additional directory to search. May be repeated.
    #[arg(long = "root", value_name = "DIR")]
    roots: Vec<PathBuf>,

    /// Skip launcher detection and search only the `--root` directories.
    #[arg(long)]
    no_probes: bool,

    /// Only list items whose name or path contains this text.
    #[arg(long, value_name = "TEXT", default_value = "")]
    filter: String,

    #[arg(long, value_enum, default_value_t = SortArg::Recent)]
    sort: SortArg,

    /// Print at most this many items.
    #[arg(long, value_name = "N")]
    limit: Option<usize>,

    /// Emit JSON instead of a table.
    #[arg(long)]
    json: bool,

    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SortArg {
    /// Most recently used first.
    Recent,
    /// By name, A to Z.
    Name,
    /// By name, Z to A.
    NameDesc,
}

impl From<SortArg> for SortOrder {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Recent => SortOrder::RecentlyUsed,
            SortArg::Name => SortOrder::NameAscending,
            SortArg::NameDesc => SortOrder::NameDescending,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays clean for the listing.
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();

    tracing::info!("AppScout starting");

    if let Some(input) = cli.path.as_deref() {
        let path = resolve_manual_override(input, TARGET_EXTENSION)?;
        let item = extract_item(&path);
        return print_items(&[&item], cli.json);
    }

    let mut roots: HashSet<PathBuf> = if cli.no_probes {
        HashSet::new()
    } else {
        locate_default_roots()
    };
    for root in &cli.roots {
        let absolute = std::path::absolute(root)
            .with_context(|| format!("invalid search root {}", root.display()))?;
        roots.insert(absolute);
    }

    let handle = start_discovery(roots).context("failed to start discovery thread")?;
    let mut catalog = ProgramCatalog::new();
    while !catalog.is_finished() {
        let event = handle
            .events_rx
            .recv()
            .context("discovery thread exited without reporting")?;
        catalog.apply(event);
        catalog.process_events(&handle.events_rx);
    }
    handle
        .join()
        .map_err(|_| anyhow::anyhow!("discovery thread panicked"))?;

    if let Some(summary) = catalog.summary() {
        tracing::info!(
            "Found {} applications in {} directories ({:.2?})",
            catalog.len(),
            summary.directories_walked,
            summary.elapsed
        );
    }

    let view = catalog.view(&cli.filter, cli.sort.into());
    let shown = cli.limit.map_or(view.len(), |n| n.min(view.len()));
    print_items(&view[..shown], cli.json)
}

fn print_items(items: &[&DiscoveredItem], json: bool) -> anyhow::Result<()> {
    let mut out = io::stdout().lock();
    if json {
        serde_json::to_writer_pretty(&mut out, items)?;
        writeln!(out)?;
        return Ok(());
    }

    for item in items {
        let accessed = match item.last_access() {
            "" => "-",
            stamp => stamp,
        };
        writeln!(
            out,
            "{accessed:<19}  {}  {}",
            item.display_name(),
            item.path().display()
        )?;
    }
    Ok(())
}
