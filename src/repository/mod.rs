use crate::catalog::{UpdateCatalog, UpdateStep};
use crate::error::Result;
use std::fmt;
use std::path::Path;

pub mod factory;
pub use factory::RepositoryFactory;

/// Account credentials passed to the update service on every request.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub username: Option<String>,
    pub token: Option<String>,
}

impl Credentials {
    pub fn new(username: Option<String>, token: Option<String>) -> Self {
        Self { username, token }
    }

    pub fn query_pairs(&self) -> Vec<(&str, &str)> {
        let mut pairs = Vec::new();
        if let Some(username) = &self.username {
            pairs.push(("username", username.as_str()));
        }
        if let Some(token) = &self.token {
            pairs.push(("token", token.as_str()));
        }
        pairs
    }
}

// Keep the token out of debug logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("token", &self.token.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Remote side of an update session: catalog lookup and delta retrieval.
pub trait UpdateSource: Send + Sync {
    fn fetch_catalog(&self) -> Result<UpdateCatalog>;

    /// Resolve the URL the delta for `step` can be downloaded from.
    fn fetch_download_link(&self, package: &str, step: &UpdateStep) -> Result<String>;

    /// Store the content at `url` in `dest`, returning the number of bytes written.
    fn download(&self, url: &str, dest: &Path) -> Result<u64>;
}
