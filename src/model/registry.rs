use std::{any::Any, collections::HashMap, path::Path, sync::Arc};

use tokio::task;
use tracing::{info, warn};

use crate::{
    config::AppConfig,
    endpoint::{self, Endpoint},
    error::ServiceError,
    model::{ModelArtifact, ModelStatus, Predictor},
};

/// Read-only set of predictors, built once before the server starts.
pub struct ModelRegistry {
    models: HashMap<&'static str, Arc<dyn Predictor>>,
}

#[derive(Default)]
pub struct RegistryBuilder {
    models: HashMap<&'static str, Arc<dyn Predictor>>,
}

impl RegistryBuilder {
    pub fn with_predictor<P>(mut self, name: &'static str, predictor: P) -> Self
    where
        P: Predictor + 'static,
    {
        self.models.insert(name, Arc::new(predictor));
        self
    }

    pub fn build(self) -> ModelRegistry {
        ModelRegistry {
            models: self.models,
        }
    }
}

impl ModelRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Loads every known endpoint's artifact from `config.model_dir`.
    /// Models that fail to load are left out and stay unavailable.
    pub fn initialize(config: &AppConfig) -> Self {
        let mut models = HashMap::with_capacity(endpoint::ALL.len());
        for endpoint in endpoint::ALL {
            if let Some(model) = load(&config.model_dir, endpoint) {
                models.insert(endpoint.name, model);
            }
        }
        info!(
            loaded = models.len(),
            total = endpoint::ALL.len(),
            "model registry initialised"
        );
        Self { models }
    }

    pub fn get(&self, name: &'static str) -> Result<Arc<dyn Predictor>, ServiceError> {
        self.models
            .get(name)
            .cloned()
            .ok_or(ServiceError::ModelUnavailable(name))
    }

    pub fn is_available(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    pub fn status(&self) -> Vec<ModelStatus> {
        endpoint::ALL
            .iter()
            .map(|endpoint| ModelStatus {
                name: endpoint.name,
                endpoint: endpoint.route(),
                artifact: endpoint.artifact,
                available: self.is_available(endpoint.name),
            })
            .collect()
    }

    /// Runs a predictor off the async workers. Panics inside the model are
    /// reported as prediction failures.
    pub async fn predict(
        &self,
        model: Arc<dyn Predictor>,
        features: Vec<f64>,
    ) -> Result<f64, ServiceError> {
        task::spawn_blocking(move || model.predict(&features))
            .await
            .map_err(|err| match err.try_into_panic() {
                Ok(payload) => ServiceError::PredictionFailed(panic_message(payload)),
                Err(err) => {
                    ServiceError::PredictionFailed(format!("inference task failed: {err}"))
                }
            })?
            .map_err(ServiceError::from)
    }
}

fn load(model_dir: &Path, endpoint: &Endpoint) -> Option<Arc<dyn Predictor>> {
    let path = model_dir.join(format!("{}.json", endpoint.artifact));
    let loaded = ModelArtifact::from_path(&path).and_then(|artifact| {
        artifact.check_schema(&endpoint.schema)?;
        Ok(artifact)
    });

    match loaded {
        Ok(artifact) => {
            info!(model = endpoint.name, path = %path.display(), "model loaded");
            Some(Arc::new(artifact))
        }
        Err(err) => {
            warn!(
                model = endpoint.name,
                path = %path.display(),
                error = %err,
                "model unavailable"
            );
            None
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "model panicked".to_string()
    }
}
