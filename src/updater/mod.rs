pub mod client;
pub mod download;

pub use client::{DEFAULT_UPDATER_URL, UpdaterClient};
