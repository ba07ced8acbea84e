use crate::crawler::HttpSession;
use crate::url::sanitize_filename;
use crate::HarvestError;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// What a call to [`Downloader::save`] did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// The document was fetched and written
    Saved {
        path: PathBuf,
        /// Bytes written
        bytes: u64,
    },
    /// The destination already existed; nothing was fetched
    Skipped { path: PathBuf },
}

impl DownloadOutcome {
    /// The destination path, whether freshly written or already present
    pub fn path(&self) -> &Path {
        match self {
            Self::Saved { path, .. } | Self::Skipped { path } => path,
        }
    }

    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved { .. })
    }
}

/// Computes where a document is saved
///
/// Returns `None` when the sanitized name cannot stand for a file
/// (empty, `.` or `..`).
pub fn destination_path(destination_dir: &Path, filename: &str) -> Option<PathBuf> {
    let sanitized = sanitize_filename(filename);
    match sanitized.trim() {
        "" | "." | ".." => None,
        _ => Some(destination_dir.join(sanitized)),
    }
}

/// Path a download is streamed into before it is complete
pub fn partial_path(destination: &Path) -> PathBuf {
    let mut name = destination
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(".part");
    destination.with_file_name(name)
}

/// Saves documents idempotently
#[derive(Debug, Clone, Default)]
pub struct Downloader;

impl Downloader {
    pub fn new() -> Self {
        Self
    }

    /// Saves `download_url` as `filename` inside `destination_dir`
    ///
    /// # Steps
    ///
    /// 1. Sanitize the file name and compute the destination path
    /// 2. If the destination exists, return [`DownloadOutcome::Skipped`]
    ///    without touching the network
    /// 3. Otherwise fetch once, stream the body into `<name>.part`, and
    ///    rename it onto the destination
    ///
    /// # Errors
    ///
    /// * `EmptyFilename` - the name sanitizes to nothing usable
    /// * `Transport`, `Timeout`, `HttpStatus` - the fetch failed
    /// * `Filesystem` - the file could not be written or renamed
    pub async fn save(
        &self,
        session: &mut HttpSession,
        download_url: &str,
        filename: &str,
        destination_dir: &Path,
    ) -> Result<DownloadOutcome, HarvestError> {
        let destination = destination_path(destination_dir, filename).ok_or_else(|| {
            HarvestError::EmptyFilename {
                url: download_url.to_string(),
            }
        })?;

        if tokio::fs::metadata(&destination).await.is_ok() {
            tracing::info!("File '{}' already exists, skipping", destination.display());
            return Ok(DownloadOutcome::Skipped { path: destination });
        }

        tokio::fs::create_dir_all(destination_dir)
            .await
            .map_err(|source| HarvestError::Filesystem {
                path: destination_dir.to_path_buf(),
                source,
            })?;

        tracing::info!("Downloading {}", download_url);
        let mut response = session.open_download(download_url).await?;

        let partial = partial_path(&destination);
        let fs_error = |source| HarvestError::Filesystem {
            path: partial.clone(),
            source,
        };

        let mut file = tokio::fs::File::create(&partial).await.map_err(fs_error)?;
        let mut bytes: u64 = 0;

        loop {
            let chunk = match tokio::time::timeout(session.download_timeout(), response.chunk())
                .await
            {
                Ok(Ok(Some(chunk))) => chunk,
                Ok(Ok(None)) => break,
                Ok(Err(source)) => {
                    return Err(HarvestError::Transport {
                        url: download_url.to_string(),
                        source,
                    })
                }
                Err(_) => {
                    return Err(HarvestError::Timeout {
                        url: download_url.to_string(),
                    })
                }
            };

            file.write_all(&chunk).await.map_err(fs_error)?;
            bytes += chunk.len() as u64;
        }

        file.flush().await.map_err(fs_error)?;
        drop(file);

        tokio::fs::rename(&partial, &destination)
            .await
            .map_err(|source| HarvestError::Filesystem {
                path: destination.clone(),
                source,
            })?;

        tracing::info!("Saved {} ({} bytes)", destination.display(), bytes);
        Ok(DownloadOutcome::Saved {
            path: destination,
            bytes,
        })
    }
}
