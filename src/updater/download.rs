use crate::error::{Result, UpdaterError};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::blocking::Client;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

// Deltas can be several hundred megabytes.
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(60 * 60);

/// Stream `url` into `dest` with a byte progress bar.
///
/// A partially written file is removed when the transfer fails.
pub fn download_to_file(client: &Client, url: &str, dest: &Path) -> Result<u64> {
    debug!("Downloading {} to {}", url, dest.display());

    let mut response = client
        .get(url)
        .timeout(DOWNLOAD_TIMEOUT)
        .send()
        .map_err(|e| UpdaterError::Download(format!("request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(UpdaterError::Download(format!(
            "HTTP {} while fetching update",
            status.as_u16()
        )));
    }

    let pb = progress_bar(response.content_length());
    let file = File::create(dest)?;
    let mut writer = pb.wrap_write(BufWriter::new(file));

    let copied = response
        .copy_to(&mut writer)
        .map_err(|e| UpdaterError::Download(format!("transfer interrupted: {e}")))
        .and_then(|bytes| {
            writer.flush()?;
            Ok(bytes)
        });

    match copied {
        Ok(bytes) => {
            pb.finish_and_clear();
            debug!("Stored {} bytes in {}", bytes, dest.display());
            Ok(bytes)
        }
        Err(e) => {
            pb.abandon();
            drop(writer);
            if let Err(remove_err) = fs::remove_file(dest) {
                debug!("Could not remove partial download {}: {}", dest.display(), remove_err);
            }
            Err(e)
        }
    }
}

fn progress_bar(total: Option<u64>) -> ProgressBar {
    match total {
        Some(len) => {
            let pb = ProgressBar::new(len);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("  [{bar:40}] {bytes}/{total_bytes} {bytes_per_sec}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("=>-"),
            );
            pb
        }
        None => {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("  {spinner} {bytes} {bytes_per_sec}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            pb
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sized_transfer_uses_bounded_bar() {
        let pb = progress_bar(Some(2048));
        assert_eq!(pb.length(), Some(2048));
    }

    #[test]
    fn unsized_transfer_uses_spinner() {
        let pb = progress_bar(None);
        assert_eq!(pb.length(), None);
    }
}
