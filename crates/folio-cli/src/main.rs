//! folio command-line driver.
//!
//! Loads a workspace (the built-in demo, a seed file, or an exported
//! snapshot), then inspects it, runs a command script against it, or exports
//! it.
//!
//! Usage:
//!   folio tree --blocks --as user-2
//!   folio run --as user-2 demos/script.ron
//!   folio --seed my-seed.ron export --format json --out workspace.json
//!   folio --snapshot workspace.json check
//!   folio menu

mod config;
mod render;
mod script;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{EnvFilter, fmt};

use folio_store::FolioStore;
use folio_types::User;

use crate::config::{Source, load_config, open_store};
use crate::render::TreeOptions;

/// Inspect and script folio workspaces.
#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(about = "Hierarchical page and block workspace, driven from the command line")]
struct Args {
    /// Store config (RON). Defaults to ~/.config/folio/config.ron if present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Label-keyed seed file to start from instead of the demo workspace
    #[arg(long, global = true)]
    seed: Option<PathBuf>,

    /// Exported snapshot (.json or .ron) to start from; wins over --seed
    #[arg(long, global = true)]
    snapshot: Option<PathBuf>,

    /// Allocate sequential ids so runs are reproducible
    #[arg(long, global = true)]
    deterministic: bool,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Print the page tree
    Tree {
        /// Include each page's blocks
        #[arg(long)]
        blocks: bool,
        /// Mark pages this user cannot edit
        #[arg(long = "as")]
        viewer: Option<String>,
    },
    /// Run a command script
    Run {
        /// Script file (RON list of steps)
        script: PathBuf,
        /// Who runs steps that do not name an actor
        #[arg(long = "as", default_value = "user-1")]
        actor: String,
        /// Write the resulting snapshot here (.json or .ron)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Export the workspace snapshot
    Export {
        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
        /// Write to a file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Validate the workspace's structural invariants
    Check,
    /// Show the block conversion menu
    Menu,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Json,
    Ron,
}

impl Format {
    fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Format::Json,
            _ => Format::Ron,
        }
    }
}

fn main() -> Result<()> {
    // Logs go to stderr; stdout carries the views and exports
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;
    let source = Source::from_args(args.seed, args.snapshot);
    let mut store = open_store(&source, config, args.deterministic)?;

    match args.command {
        Cmd::Tree { blocks, viewer } => {
            let viewer = viewer.map(|name| find_user(&store, &name)).transpose()?;
            let opts = TreeOptions {
                blocks,
                viewer: viewer.as_ref(),
            };
            print_lines(render::format_tree(&store, opts));
        }
        Cmd::Run {
            script,
            actor,
            out,
        } => {
            let actor = find_user(&store, &actor)?;
            let text = std::fs::read_to_string(&script)
                .with_context(|| format!("reading script {}", script.display()))?;
            let steps = script::parse(&text)?;
            tracing::info!(steps = steps.len(), actor = %actor.display_name, "running script");

            let reports = script::run(&mut store, &actor, steps)?;
            for report in &reports {
                println!("{}", render::format_report(report));
            }
            let applied = reports.iter().filter(|r| r.outcome.is_applied()).count();
            println!("{applied}/{} steps applied", reports.len());
            println!();
            let opts = TreeOptions {
                blocks: true,
                viewer: Some(&actor),
            };
            print_lines(render::format_tree(&store, opts));

            if let Some(path) = out {
                write_snapshot(&store, Format::from_path(&path), Some(&path))?;
            }
        }
        Cmd::Export { format, out } => write_snapshot(&store, format, out.as_deref())?,
        Cmd::Check => {
            let violations = store.violations();
            if !violations.is_empty() {
                for v in &violations {
                    println!("violation: {v}");
                }
                bail!("{} invariant violations", violations.len());
            }
            let orphans = store.orphans();
            for block in &orphans {
                println!("orphan: block {} (its toggle was deleted)", block.id.short());
            }
            println!(
                "ok: {} users, {} pages, {} blocks, {} orphans",
                store.users().len(),
                store.pages().count(),
                store.block_count(),
                orphans.len()
            );
        }
        Cmd::Menu => print_lines(render::format_menu(
            store.transition().trigger(),
            store.conversion_menu(),
        )),
    }
    Ok(())
}

fn find_user(store: &FolioStore, name: &str) -> Result<User> {
    store
        .users()
        .lookup(name)
        .cloned()
        .with_context(|| format!("no user matches '{name}'"))
}

fn write_snapshot(store: &FolioStore, format: Format, out: Option<&Path>) -> Result<()> {
    let snapshot = store.snapshot();
    let text = match format {
        Format::Json => snapshot.to_json()?,
        Format::Ron => snapshot.to_ron()?,
    };
    match out {
        Some(path) => {
            std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
            tracing::info!(path = %path.display(), "snapshot written");
        }
        None => println!("{text}"),
    }
    Ok(())
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{line}");
    }
}
