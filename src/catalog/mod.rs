pub mod model;
pub mod resolver;
pub mod version;

pub use model::UpdateCatalog;
pub use resolver::{Resolution, ResolutionPolicy, UpdateChain, UpdateStep, resolve};
pub use version::Version;
