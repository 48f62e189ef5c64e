use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use tracing::info;

use crate::pronunciation::viseme::{MatchOrder, VisemeTables};

const TABLES_FILE: &str = "visemes/tables.json";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub assets_root: PathBuf,
}

impl AppConfig {
    pub fn from_override(path: Option<PathBuf>) -> Result<Self> {
        let root = match path {
            Some(custom) => canonicalize_dir(&custom)?,
            None => default_assets_root()?,
        };
        Ok(Self { assets_root: root })
    }

    /// Location of the viseme tables inside the assets directory.
    pub fn tables_path(&self) -> PathBuf {
        self.assets_root.join(TABLES_FILE)
    }
}

/// Where viseme tables come from, most specific first.
#[derive(Debug, Clone, Default)]
pub struct TableSource {
    pub tables_file: Option<PathBuf>,
    pub assets_root: Option<PathBuf>,
    pub match_order: Option<MatchOrder>,
}

impl TableSource {
    /// Loads an explicit tables file, else the assets directory's copy, else
    /// the bundled defaults, then applies the match-order override.
    pub fn load(&self) -> Result<Arc<VisemeTables>> {
        let path = match (&self.tables_file, &self.assets_root) {
            (Some(file), _) => Some(file.clone()),
            (None, Some(root)) => Some(AppConfig::from_override(Some(root.clone()))?.tables_path()),
            (None, None) => None,
        };

        let tables = match path {
            Some(path) => {
                let tables = VisemeTables::from_path(&path)
                    .with_context(|| format!("failed to load viseme tables from {:?}", path))?;
                info!(path = %path.display(), "loaded viseme tables");
                Arc::new(tables)
            }
            None => VisemeTables::shared(),
        };

        Ok(match self.match_order {
            Some(order) if order != tables.diphthongs.order() => {
                Arc::new((*tables).clone().with_match_order(order))
            }
            _ => tables,
        })
    }
}

fn canonicalize_dir(path: &Path) -> Result<PathBuf> {
    let canonical = path
        .canonicalize()
        .with_context(|| format!("failed to resolve assets directory at {:?}", path))?;
    if canonical.is_dir() {
        Ok(canonical)
    } else {
        Err(anyhow!("assets path {:?} is not a directory", canonical))
    }
}

fn default_assets_root() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("unable to resolve current executable path")?;
    let assets = exe
        .ancestors()
        .find_map(|dir| {
            let candidate = dir.join("assets");
            candidate.is_dir().then_some(candidate)
        })
        .ok_or_else(|| anyhow!("could not locate default assets directory alongside binary"))?;
    Ok(assets)
}
