pub(crate) mod catalog;
pub(crate) mod config;
pub(crate) mod export;
pub(crate) mod generate;
pub(crate) mod resolve;
pub(crate) mod template;

use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use watch_porter_catalog::{CatalogStore, default_catalog_path};
use watch_porter_core::MappingConfig;

use crate::CliError;

const MAPPING_FILE: &str = "category_mapping.json";

/// `<config_dir>/watch-porter/category_mapping.json`
pub(crate) fn default_mapping_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("watch-porter").join(MAPPING_FILE))
}

/// Settings shared by every command.
pub(crate) struct AppContext {
    pub mapping: MappingConfig,
    mapping_path: Option<PathBuf>,
    catalog_path: Option<PathBuf>,
    pub quiet: bool,
}

impl AppContext {
    pub(crate) fn new(mapping: Option<PathBuf>, catalog: Option<PathBuf>, quiet: bool) -> Self {
        let mapping_path = mapping.or_else(default_mapping_path);
        let config = match &mapping_path {
            Some(path) => MappingConfig::load(path),
            None => MappingConfig::defaults(),
        };
        Self {
            mapping: config,
            mapping_path,
            catalog_path: catalog,
            quiet,
        }
    }

    pub(crate) fn mapping_path(&self) -> Option<&Path> {
        self.mapping_path.as_deref()
    }

    pub(crate) fn catalog_path(&self) -> Result<PathBuf, CliError> {
        match &self.catalog_path {
            Some(path) => Ok(path.clone()),
            None => Ok(default_catalog_path()?),
        }
    }

    /// Load the catalog. An unreadable file is an error rather than an
    /// empty catalog, since the next write would replace it.
    pub(crate) fn open_catalog(&self) -> Result<CatalogStore, CliError> {
        let path = self.catalog_path()?;
        log::debug!("Using catalog {}", path.display());
        Ok(CatalogStore::load(&path)?)
    }

    /// Progress bar for `len` steps, hidden in quiet mode.
    pub(crate) fn progress_bar(&self, len: u64) -> ProgressBar {
        let pb = if self.quiet {
            ProgressBar::with_draw_target(Some(len), ProgressDrawTarget::hidden())
        } else {
            ProgressBar::new(len)
        };
        pb.set_style(
            ProgressStyle::with_template("  {spinner:.cyan} [{bar:30.cyan/dim}] {pos}/{len} {msg}")
                .expect("static pattern")
                .tick_chars("/-\\|"),
        );
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

/// `<prefix>_YYYYMMDD_HHMMSS.csv` in the current directory.
pub(crate) fn timestamped_output(prefix: &str) -> PathBuf {
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    PathBuf::from(format!("{prefix}_{stamp}.csv"))
}
