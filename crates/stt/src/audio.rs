//! Staging of request audio on local disk
//!
//! Each request owns exactly one [`TemporaryAudioFile`]. The file is removed
//! when the value is dropped, so every exit path (success, engine failure,
//! a `?` halfway through a download) releases it. Removal errors are ignored.

use std::path::Path;

use base64::Engine as _;
use tempfile::{NamedTempFile, TempPath};
use tokio::io::AsyncWriteExt;

use crate::error::{Result, SttError};

/// Suffix of files staged from a URL; the format is unknown until decoded
const DOWNLOAD_SUFFIX: &str = ".audio";

/// Suffix of files staged from inline base64 audio
const INLINE_SUFFIX: &str = ".wav";

const FILE_PREFIX: &str = "whisperpod-";

/// Audio file exclusively owned by one in-flight request
#[derive(Debug)]
pub struct TemporaryAudioFile {
    path: TempPath,
}

impl TemporaryAudioFile {
    /// Fetch `url` once and stream the body into a new temporary file
    ///
    /// No retry and no integrity check. A non-success status is a failure.
    pub async fn download(client: &reqwest::Client, url: &str) -> Result<Self> {
        let staged = create(DOWNLOAD_SUFFIX)?;

        let mut response = client
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| SttError::DownloadFailed(e.to_string()))?;

        let mut out = tokio::fs::File::from_std(staged.as_file().try_clone()?);
        let mut written = 0_usize;

        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| SttError::DownloadFailed(e.to_string()))?
        {
            out.write_all(&chunk).await?;
            written += chunk.len();
        }

        out.flush().await?;
        drop(out);

        tracing::debug!(bytes = written, path = %staged.path().display(), "audio downloaded");

        Ok(Self {
            path: staged.into_temp_path(),
        })
    }

    /// Decode inline base64 audio and write it to a new temporary file
    ///
    /// Nothing touches the filesystem when decoding fails.
    pub async fn from_base64(encoded: &str) -> Result<Self> {
        let bytes = decode_base64(encoded)?;
        let staged = create(INLINE_SUFFIX)?;

        let mut out = tokio::fs::File::from_std(staged.as_file().try_clone()?);
        out.write_all(&bytes).await?;
        out.flush().await?;
        drop(out);

        tracing::debug!(bytes = bytes.len(), path = %staged.path().display(), "inline audio staged");

        Ok(Self {
            path: staged.into_temp_path(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the file now rather than at drop
    pub fn cleanup(self) {
        let path = self.path.to_path_buf();
        if let Err(e) = self.path.close() {
            tracing::debug!(path = %path.display(), "ignoring temp file removal failure: {e}");
        }
    }
}

fn create(suffix: &str) -> Result<NamedTempFile> {
    Ok(tempfile::Builder::new().prefix(FILE_PREFIX).suffix(suffix).tempfile()?)
}

/// Decode standard base64, tolerating line wrapping and a `data:` URI prefix
fn decode_base64(encoded: &str) -> Result<Vec<u8>> {
    let payload = match encoded.split_once(";base64,") {
        Some((scheme, data)) if scheme.starts_with("data:") => data,
        _ => encoded,
    };

    let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();

    base64::engine::general_purpose::STANDARD
        .decode(compact)
        .map_err(|e| SttError::InvalidAudioEncoding(e.to_string()))
}
