//! Configuration types for nhanes-dl

use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};

/// Base URL of the NHANES public data archive
const NHANES_ARCHIVE: &str = "https://wwwn.cdc.gov/Nchs/Nhanes";

/// HTTP behavior for dataset downloads
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Inactivity limit for connecting and for each read (default: 60 seconds)
    #[serde(default = "default_timeout", with = "duration_serde")]
    pub timeout: Duration,

    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// One dataset within a cycle: a name and the URL of its transport file
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Short name used in results and the summary (e.g., "demographics")
    pub name: String,
    /// Source URL; its last path segment becomes the cached filename
    pub url: String,
}

impl DatasetConfig {
    /// Create a dataset entry
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// A survey cycle and the datasets it groups
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleConfig {
    /// Cycle identifier (e.g., "2017-2018")
    pub id: String,
    /// Datasets, processed in this order
    #[serde(default)]
    pub datasets: Vec<DatasetConfig>,
}

impl CycleConfig {
    /// Directory name for this cycle's artifacts ("2017-2018" becomes "2017_2018")
    #[must_use]
    pub fn dir_name(&self) -> String {
        self.id.replace('-', "_")
    }
}

/// Main configuration for a pipeline run
///
/// The default value is the NHANES 2017-2018 cycle used for the
/// albuminuria/cardiovascular analysis, cached under `data/raw`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Root of the artifact cache; one subdirectory per cycle (default: "data/raw")
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// HTTP settings
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Re-fetch and re-convert every dataset even when cached artifacts exist
    ///
    /// Off by default: a converted CSV on disk is otherwise treated as
    /// authoritative and is never regenerated from its transport file.
    #[serde(default)]
    pub force_refresh: bool,

    /// Cycles to process, in order
    #[serde(default = "default_cycles")]
    pub cycles: Vec<CycleConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            fetch: FetchConfig::default(),
            force_refresh: false,
            cycles: default_cycles(),
        }
    }
}

impl Config {
    /// Directory holding the artifacts of `cycle`
    #[must_use]
    pub fn cycle_dir(&self, cycle: &CycleConfig) -> PathBuf {
        self.data_dir.join(cycle.dir_name())
    }

    /// Total number of configured datasets across all cycles
    #[must_use]
    pub fn dataset_count(&self) -> usize {
        self.cycles.iter().map(|c| c.datasets.len()).sum()
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data").join("raw")
}

fn default_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_user_agent() -> String {
    concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_cycles() -> Vec<CycleConfig> {
    let cycle = "2017-2018";
    let url = |file: &str| format!("{NHANES_ARCHIVE}/{cycle}/{file}");

    vec![CycleConfig {
        id: cycle.to_string(),
        datasets: vec![
            DatasetConfig::new("albuminuria", url("ALB_CR_J.XPT")),
            DatasetConfig::new("blood_pressure", url("BPX_J.XPT")),
            DatasetConfig::new("demographics", url("DEMO_J.XPT")),
            DatasetConfig::new("body_measures", url("BMX_J.XPT")),
            DatasetConfig::new("cholesterol", url("TCHOL_J.XPT")),
            DatasetConfig::new("diabetes", url("GHB_J.XPT")),
        ],
    }]
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
