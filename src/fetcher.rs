//! Streamed HTTP downloads of raw transport files

use crate::config::FetchConfig;
use crate::error::{Error, Result};
use std::path::Path;
use std::time::Duration;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, error, info};

/// Downloads dataset files over HTTP(S)
///
/// One client is built per run and reused for every dataset. Requests are
/// plain GETs: no authentication, no retry, no resume.
///
/// The configured timeout bounds inactivity, not the whole transfer: the
/// connection, the wait for response headers and each body read must finish
/// within it, so a large file that keeps streaming is never cut off.
#[derive(Clone, Debug)]
pub struct Fetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl Fetcher {
    /// Build the HTTP client from `config`
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| Error::Config {
                message: format!("failed to create HTTP client: {}", e),
                key: Some("fetch".to_string()),
            })?;

        Ok(Self {
            client,
            timeout: config.timeout,
        })
    }

    /// Download `url` to `destination`, logging any failure
    ///
    /// Returns whether the download completed. A failed download may leave a
    /// partial file behind; it is not removed.
    pub async fn fetch(&self, url: &str, destination: &Path) -> bool {
        info!(%url, "downloading");
        match self.try_fetch(url, destination).await {
            Ok(bytes) => {
                info!(path = %destination.display(), bytes, "download complete");
                true
            }
            Err(e) => {
                error!(%url, error = %e, "download failed");
                false
            }
        }
    }

    /// Download `url` to `destination`, returning the number of bytes written
    ///
    /// The body is written chunk by chunk as it arrives; the whole payload is
    /// never held in memory. `destination` is created or truncated.
    pub async fn try_fetch(&self, url: &str, destination: &Path) -> Result<u64> {
        let mut response = tokio::time::timeout(self.timeout, self.client.get(url).send())
            .await
            .map_err(|_| self.timed_out(url))??;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let file = tokio::fs::File::create(destination).await?;
        let mut writer = BufWriter::new(file);
        let mut written = 0u64;

        loop {
            let chunk = tokio::time::timeout(self.timeout, response.chunk())
                .await
                .map_err(|_| self.timed_out(url))??;
            let Some(chunk) = chunk else { break };
            writer.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }

        writer.flush().await?;
        debug!(%url, bytes = written, "response body written");
        Ok(written)
    }

    fn timed_out(&self, url: &str) -> Error {
        debug!(%url, timeout_secs = self.timeout.as_secs(), "no data within timeout");
        Error::Timeout {
            url: url.to_string(),
            timeout_secs: self.timeout.as_secs(),
        }
    }
}
