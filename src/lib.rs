pub mod config;
pub mod endpoint;
pub mod error;
pub mod model;
pub mod schema;
pub mod server;

pub use config::AppConfig;
pub use endpoint::Endpoint;
pub use error::{PredictError, ServiceError};
pub use model::{ModelRegistry, Predictor};
pub use server::build_router;
