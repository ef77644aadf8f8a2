use crate::catalog::UpdateStep;
use std::path::PathBuf;

/// Tracks what an update run did to each step of the chain
#[derive(Debug, Clone, Default)]
pub struct UpdateReport {
    /// Deltas written to disk, in chain order
    pub downloaded: Vec<(UpdateStep, PathBuf)>,
    pub applied: Vec<UpdateStep>,
    pub deleted: Vec<UpdateStep>,
}

impl UpdateReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_download(&mut self, step: UpdateStep, path: PathBuf) {
        self.downloaded.push((step, path));
    }

    pub fn add_applied(&mut self, step: UpdateStep) {
        self.applied.push(step);
    }

    pub fn add_deleted(&mut self, step: UpdateStep) {
        self.deleted.push(step);
    }

    /// Version the installation ends up at, if anything was applied
    pub fn installed_version(&self) -> Option<&str> {
        self.applied.last().map(|step| step.to.as_str())
    }
}
