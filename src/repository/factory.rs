use crate::error::Result;
use crate::repository::{Credentials, UpdateSource};
use crate::updater::UpdaterClient;
use std::sync::Arc;

pub struct RepositoryFactory;

impl RepositoryFactory {
    pub fn create_updater(
        base_url: &str,
        credentials: Credentials,
    ) -> Result<Arc<dyn UpdateSource>> {
        let client = UpdaterClient::new(base_url, credentials)?;
        Ok(Arc::new(client))
    }
}
