use crate::catalog::UpdateStep;
use crate::error::{Result, UpdaterError};
use crate::utils::path_validator::PathValidator;
use std::fs;
use std::path::{Path, PathBuf};

/// UpdateStore owns the directory downloaded deltas are written to
pub struct UpdateStore {
    output_dir: PathBuf,
}

impl UpdateStore {
    pub fn new<P: AsRef<Path>>(output_dir: P) -> Result<Self> {
        let output_dir = PathValidator::validate_output_dir(output_dir)?;
        Ok(Self { output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Where the delta for `step` is stored: `<package>-<from>-<to>-update.zip`
    pub fn path_for(&self, package: &str, step: &UpdateStep) -> Result<PathBuf> {
        if package.is_empty() || package.contains(['/', '\\']) || package.contains("..") {
            return Err(UpdaterError::Validation(format!(
                "Package name '{package}' cannot be used in a file name"
            )));
        }

        Ok(self
            .output_dir
            .join(format!("{}-{}-{}-update.zip", package, step.from, step.to)))
    }

    /// Remove an applied delta; refuses anything outside the output directory
    pub fn delete(&self, path: &Path) -> Result<()> {
        let canonical = PathValidator::validate_stored_update(path, &self.output_dir)?;
        fs::remove_file(canonical)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Version;
    use tempfile::tempdir;

    fn step(from: &str, to: &str) -> UpdateStep {
        UpdateStep {
            from: Version::parse(from).unwrap(),
            to: Version::parse(to).unwrap(),
        }
    }

    #[test]
    fn names_update_files_after_package_and_versions() {
        let dir = tempdir().unwrap();
        let store = UpdateStore::new(dir.path()).unwrap();
        let path = store
            .path_for("core-linux_headless64", &step("1.1.100", "1.1.101"))
            .unwrap();

        assert_eq!(path.parent(), Some(store.output_dir()));
        assert_eq!(
            path.file_name().unwrap(),
            "core-linux_headless64-1.1.100-1.1.101-update.zip"
        );
    }

    #[test]
    fn rejects_package_names_with_separators() {
        let dir = tempdir().unwrap();
        let store = UpdateStore::new(dir.path()).unwrap();
        let err = store.path_for("../core", &step("1.0", "1.1")).unwrap_err();
        assert!(matches!(err, UpdaterError::Validation(_)));
    }

    #[test]
    fn deletes_stored_update() {
        let dir = tempdir().unwrap();
        let store = UpdateStore::new(dir.path()).unwrap();
        let path = store.path_for("core", &step("1.0", "1.1")).unwrap();
        fs::write(&path, b"delta").unwrap();

        store.delete(&path).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn refuses_to_delete_outside_output_dir() {
        let output = tempdir().unwrap();
        let other = tempdir().unwrap();
        let outside = other.path().join("keep.zip");
        fs::write(&outside, b"keep").unwrap();

        let store = UpdateStore::new(output.path()).unwrap();
        assert!(store.delete(&outside).is_err());
        assert!(outside.exists());
    }
}
