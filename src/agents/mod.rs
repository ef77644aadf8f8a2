pub mod server_binary;
pub mod update_report;
pub mod update_store;

pub use server_binary::ServerBinaryAgent;
pub use update_report::UpdateReport;
pub use update_store::UpdateStore;
