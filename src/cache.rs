//! Cached artifact locations
//!
//! Each dataset owns two files in its cycle directory, both named after the
//! last path segment of its source URL: the raw transport file
//! (`DEMO_J.XPT`) and its CSV conversion (`DEMO_J.csv`). Whether a file
//! exists is the only cache state.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Extension of converted artifacts
pub const CONVERTED_EXTENSION: &str = "csv";

/// Raw and converted locations of one dataset
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArtifactPaths {
    /// The downloaded transport file
    pub raw: PathBuf,
    /// The CSV rendering of `raw`
    pub converted: PathBuf,
}

impl ArtifactPaths {
    /// Paths for the dataset at `url`, inside `cycle_dir`
    pub fn for_url(cycle_dir: &Path, url: &str) -> Result<Self> {
        let raw_name = raw_filename(url)?;
        let converted_name = converted_filename(&raw_name);
        Ok(Self {
            raw: cycle_dir.join(raw_name),
            converted: cycle_dir.join(converted_name),
        })
    }

    /// Whether the transport file is on disk
    #[must_use]
    pub fn has_raw(&self) -> bool {
        self.raw.is_file()
    }

    /// Whether the converted CSV is on disk
    #[must_use]
    pub fn has_converted(&self) -> bool {
        self.converted.is_file()
    }
}

/// Filename of the raw artifact: the final path segment of `url`
///
/// # Examples
///
/// ```
/// use nhanes_dl::cache::raw_filename;
///
/// let name = raw_filename("https://wwwn.cdc.gov/Nchs/Nhanes/2017-2018/DEMO_J.XPT").unwrap();
/// assert_eq!(name, "DEMO_J.XPT");
/// ```
pub fn raw_filename(url: &str) -> Result<String> {
    let parsed = url::Url::parse(url).map_err(|e| Error::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    let segment = parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or_default();

    // Reject anything that would escape the cycle directory
    if segment.is_empty() || segment == "." || segment == ".." {
        return Err(Error::InvalidUrl {
            url: url.to_string(),
            reason: "URL path has no file name".to_string(),
        });
    }

    Ok(segment.to_string())
}

/// Filename of the converted artifact: `raw_name` with its extension replaced
///
/// `FOO_J.XPT` becomes `FOO_J.csv`; a name without extension gains one.
#[must_use]
pub fn converted_filename(raw_name: &str) -> String {
    Path::new(raw_name)
        .with_extension(CONVERTED_EXTENSION)
        .to_string_lossy()
        .into_owned()
}
