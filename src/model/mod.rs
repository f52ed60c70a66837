mod loader;
mod registry;
mod types;

pub use loader::{ModelArtifact, TreeNode};
pub use registry::{ModelRegistry, RegistryBuilder};
pub use types::{ModelStatus, Predictor};
