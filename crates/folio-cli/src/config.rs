//! Loading config, seeds and snapshots from disk.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use folio_store::{FolioStore, SeedWorkspace, SequentialIds, StoreConfig, WorkspaceSnapshot};

/// Seed used when no `--seed` or `--snapshot` is given.
pub const DEMO_SEED: &str = include_str!("../demos/seed.ron");

/// Get the config file path (~/.config/folio/config.ron).
pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("folio").join("config.ron"))
}

/// Load the store config.
///
/// An explicit path must exist and parse. The default path is optional: a
/// missing file (or no config directory at all) means defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<StoreConfig> {
    if let Some(path) = explicit {
        return read_config(path);
    }
    let Some(path) = config_file_path() else {
        info!("no config directory available, using default config");
        return Ok(StoreConfig::default());
    };
    if !path.exists() {
        info!(path = %path.display(), "config file not found, using defaults");
        return Ok(StoreConfig::default());
    }
    read_config(&path)
}

fn read_config(path: &Path) -> Result<StoreConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config = StoreConfig::from_ron(&text)
        .with_context(|| format!("parsing config {}", path.display()))?;
    info!(path = %path.display(), "loaded config");
    Ok(config)
}

/// Where the initial workspace comes from.
#[derive(Debug, Clone, Default)]
pub enum Source {
    /// The built-in demo seed.
    #[default]
    Demo,
    /// A label-keyed RON seed file.
    Seed(PathBuf),
    /// A snapshot exported by `folio export` (JSON or RON, by extension).
    Snapshot(PathBuf),
}

impl Source {
    pub fn from_args(seed: Option<PathBuf>, snapshot: Option<PathBuf>) -> Self {
        match (seed, snapshot) {
            (_, Some(path)) => Source::Snapshot(path),
            (Some(path), None) => Source::Seed(path),
            (None, None) => Source::Demo,
        }
    }

    pub fn load(&self) -> Result<WorkspaceSnapshot> {
        match self {
            Source::Demo => Ok(SeedWorkspace::from_ron(DEMO_SEED)?.into_snapshot()?),
            Source::Seed(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading seed {}", path.display()))?;
                let seed = SeedWorkspace::from_ron(&text)
                    .with_context(|| format!("parsing seed {}", path.display()))?;
                Ok(seed.into_snapshot()?)
            }
            Source::Snapshot(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading snapshot {}", path.display()))?;
                let is_json = path.extension().is_some_and(|ext| ext == "json");
                let snapshot = if is_json {
                    WorkspaceSnapshot::from_json(&text)
                } else {
                    WorkspaceSnapshot::from_ron(&text)
                };
                snapshot.with_context(|| format!("parsing snapshot {}", path.display()))
            }
        }
    }
}

/// Build the store the subcommands operate on.
pub fn open_store(source: &Source, config: StoreConfig, deterministic: bool) -> Result<FolioStore> {
    let snapshot = source.load()?;
    let store = FolioStore::from_snapshot(snapshot, config).context("invalid workspace data")?;
    if matches!(source, Source::Demo) {
        info!("using the built-in demo workspace");
    }
    Ok(if deterministic {
        store.with_ids(SequentialIds::new())
    } else {
        store
    })
}

// ============================================================================
// Tests
// ============================================================================
