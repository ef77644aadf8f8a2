use crate::error::{Result, UpdaterError};
use std::path::{Path, PathBuf};

const SYSTEM_DIRS: &[&str] = &["/etc", "/sys", "/proc", "/dev", "/boot"];
const UPDATE_SUFFIX: &str = "-update.zip";

/// Checks for where deltas are downloaded and which files may be removed again.
pub struct PathValidator;

impl PathValidator {
    /// Canonical download directory; it must exist, be writable and not be a system directory.
    pub fn validate_output_dir(path: impl AsRef<Path>) -> Result<PathBuf> {
        let path = path.as_ref();

        let canonical = path.canonicalize().map_err(|e| {
            UpdaterError::Validation(format!(
                "Download directory '{}' is not usable: {e}",
                path.display()
            ))
        })?;

        let metadata = canonical.metadata()?;
        if !metadata.is_dir() {
            return Err(UpdaterError::Validation(format!(
                "Download target '{}' is not a directory",
                canonical.display()
            )));
        }
        if metadata.permissions().readonly() {
            return Err(UpdaterError::Validation(format!(
                "Download directory '{}' is read-only",
                canonical.display()
            )));
        }

        let in_system_dir = SYSTEM_DIRS.iter().map(Path::new).find(|system| {
            let resolved = system.canonicalize().unwrap_or_else(|_| system.to_path_buf());
            path.starts_with(system) || canonical.starts_with(resolved)
        });
        if let Some(system) = in_system_dir {
            return Err(UpdaterError::Validation(format!(
                "Refusing to download updates into system directory '{}'",
                system.display()
            )));
        }

        Ok(canonical)
    }

    /// An update archive directly inside `output_dir`, safe to delete after applying.
    pub fn validate_stored_update(
        update_path: impl AsRef<Path>,
        output_dir: impl AsRef<Path>,
    ) -> Result<PathBuf> {
        let update_path = update_path.as_ref();

        let canonical = update_path.canonicalize().map_err(|e| {
            UpdaterError::Validation(format!(
                "Stored update '{}' not found: {e}",
                update_path.display()
            ))
        })?;
        let output_dir = output_dir.as_ref().canonicalize()?;

        if canonical.parent() != Some(output_dir.as_path()) {
            return Err(UpdaterError::Validation(format!(
                "'{}' is not in the download directory '{}'",
                canonical.display(),
                output_dir.display()
            )));
        }

        let is_archive = canonical.is_file()
            && canonical
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.ends_with(UPDATE_SUFFIX));
        if !is_archive {
            return Err(UpdaterError::Validation(format!(
                "'{}' is not a downloaded update archive",
                canonical.display()
            )));
        }

        Ok(canonical)
    }
}
