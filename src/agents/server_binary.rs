use crate::catalog::Version;
use crate::error::{Result, UpdaterError};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::LazyLock;
use tracing::debug;

static VERSION_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Version: (\d+\.\d+\.\d+)").expect("version pattern is valid")
});

/// ServerBinaryAgent drives the installed server executable
pub struct ServerBinaryAgent {
    binary_path: PathBuf,
}

impl ServerBinaryAgent {
    pub fn new<P: AsRef<Path>>(binary_path: P) -> Self {
        Self {
            binary_path: binary_path.as_ref().to_path_buf(),
        }
    }

    /// Read the installed version from `<binary> --version`
    pub fn detect_version(&self) -> Result<Version> {
        let output = self.run(&["--version"])?;
        Self::ensure_success(&output, "--version")?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        Self::parse_version_output(&stdout)
    }

    /// Apply a downloaded delta with `<binary> --apply-update <path>`
    pub fn apply_update(&self, update_path: &Path) -> Result<()> {
        let path = update_path.to_string_lossy();
        let output = self.run(&["--apply-update", &path])?;
        Self::ensure_success(&output, "--apply-update")
    }

    fn parse_version_output(stdout: &str) -> Result<Version> {
        let captured = VERSION_LINE
            .captures(stdout)
            .and_then(|caps| caps.get(1))
            .ok_or_else(|| {
                UpdaterError::ServerBinary(format!(
                    "could not find a version in output: {}",
                    stdout.trim()
                ))
            })?;

        Version::parse(captured.as_str())
    }

    fn run(&self, args: &[&str]) -> Result<Output> {
        debug!("Executing: {} {}", self.binary_path.display(), args.join(" "));

        Command::new(&self.binary_path).args(args).output().map_err(|e| {
            UpdaterError::ServerBinary(format!(
                "failed to execute '{}': {e}",
                self.binary_path.display()
            ))
        })
    }

    fn ensure_success(output: &Output, command: &str) -> Result<()> {
        if output.status.success() {
            return Ok(());
        }

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        Err(UpdaterError::ServerBinary(format!(
            "{command} exited with code {}: {}",
            output.status.code().unwrap_or(-1),
            combined.trim()
        )))
    }
}
