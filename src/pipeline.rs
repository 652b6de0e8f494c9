//! The fetch-and-convert pipeline
//!
//! [`Pipeline::run`] walks every configured cycle in order; for each cycle
//! [`Pipeline::process_cycle`] walks its datasets in order and decides, from
//! what is already on disk, whether to download, convert, or load:
//!
//! 1. the transport file is downloaded unless already present; if that
//!    fails the dataset is skipped
//! 2. without a converted CSV on disk, the transport file is converted
//! 3. otherwise the existing CSV is loaded as-is
//!
//! Failures are logged and the dataset is left out of the results; nothing
//! stops the run. With [`Config::force_refresh`] every dataset is downloaded
//! and converted again.

use crate::cache::ArtifactPaths;
use crate::config::{Config, CycleConfig, DatasetConfig};
use crate::converter;
use crate::error::Result;
use crate::fetcher::Fetcher;
use crate::types::{CycleResult, LoadedDataset, Origin, RunSummary, Table};
use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use tracing::{Instrument, error, info, info_span};

const BANNER_WIDTH: usize = 60;

/// Everything a run produced
#[derive(Clone, Debug)]
pub struct RunReport {
    /// Per-cycle results, keyed by cycle id in configuration order
    pub results: IndexMap<String, CycleResult>,
    /// Shapes of every loaded dataset
    pub summary: RunSummary,
}

/// Runs the configured cycles against the artifact cache
pub struct Pipeline {
    config: Config,
    fetcher: Fetcher,
}

impl Pipeline {
    /// Create a pipeline; fails only if the HTTP client cannot be built
    pub fn new(config: Config) -> Result<Self> {
        let fetcher = Fetcher::new(&config.fetch)?;
        Ok(Self { config, fetcher })
    }

    /// The configuration this pipeline runs
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Process every cycle, then log the summary
    ///
    /// Always completes: partial and total failure are visible only in the
    /// log and in the returned report.
    pub async fn run(&self) -> RunReport {
        let rule = "=".repeat(BANNER_WIDTH);
        info!("{rule}");
        info!("NHANES data download starting");
        info!("{rule}");

        let mut results = IndexMap::with_capacity(self.config.cycles.len());
        for cycle in &self.config.cycles {
            info!(cycle = %cycle.id, datasets = cycle.datasets.len(), "processing cycle");
            let span = info_span!("cycle", id = %cycle.id);
            let result = self.process_cycle(cycle).instrument(span).await;
            results.insert(cycle.id.clone(), result);
        }

        let summary = RunSummary {
            data_dir: self.config.data_dir.clone(),
            cycles: results.values().map(CycleResult::summary).collect(),
        };

        info!("{rule}");
        for line in summary.to_string().lines() {
            info!("{line}");
        }
        info!("{rule}");
        info!("NHANES data download complete");

        RunReport { results, summary }
    }

    /// Fetch, convert or load every dataset of `cycle`
    ///
    /// Creates the cycle directory if needed. Only datasets that produced a
    /// table appear in the result.
    pub async fn process_cycle(&self, cycle: &CycleConfig) -> CycleResult {
        let dir = self.config.cycle_dir(cycle);
        let mut result = CycleResult {
            cycle: cycle.id.clone(),
            dir: dir.clone(),
            datasets: IndexMap::new(),
        };

        if let Err(e) = tokio::fs::create_dir_all(&dir).await {
            error!(path = %dir.display(), error = %e, "cannot create cycle directory");
            return result;
        }

        for dataset in &cycle.datasets {
            let span = info_span!("dataset", name = %dataset.name);
            if let Some(loaded) = self.process_dataset(&dir, dataset).instrument(span).await {
                result.datasets.insert(dataset.name.clone(), loaded);
            }
        }

        result
    }

    async fn process_dataset(&self, dir: &Path, dataset: &DatasetConfig) -> Option<LoadedDataset> {
        let paths = match ArtifactPaths::for_url(dir, &dataset.url) {
            Ok(paths) => paths,
            Err(e) => {
                error!(error = %e, "skipping dataset");
                return None;
            }
        };
        let refresh = self.config.force_refresh;

        if refresh || !paths.has_raw() {
            if !self.fetcher.fetch(&dataset.url, &paths.raw).await {
                return None;
            }
        } else {
            info!(path = %paths.raw.display(), "already downloaded, skipping download");
        }

        if refresh || !paths.has_converted() {
            let table = convert(paths.raw, paths.converted).await?;
            return Some(LoadedDataset {
                table,
                origin: Origin::Converted,
            });
        }

        info!(path = %paths.converted.display(), "already converted, loading");
        match load_converted(paths.converted.clone()).await {
            Ok(table) => Some(LoadedDataset {
                table,
                origin: Origin::Cached,
            }),
            Err(e) => {
                error!(path = %paths.converted.display(), error = %e, "failed to read converted file");
                None
            }
        }
    }
}

async fn load_converted(path: PathBuf) -> Result<Table> {
    tokio::task::spawn_blocking(move || converter::load_csv(&path)).await?
}

async fn convert(raw: PathBuf, converted: PathBuf) -> Option<Table> {
    match tokio::task::spawn_blocking(move || converter::convert(&raw, &converted)).await {
        Ok(table) => table,
        Err(e) => {
            error!(error = %e, "conversion task failed");
            None
        }
    }
}
