use serde::Serialize;

use crate::error::PredictError;

/// An opaque, pre-trained model. Implementations must be pure functions of
/// their input; the registry shares them across requests without locking.
pub trait Predictor: Send + Sync {
    fn predict(&self, features: &[f64]) -> Result<f64, PredictError>;
}

impl<F> Predictor for F
where
    F: Fn(&[f64]) -> Result<f64, PredictError> + Send + Sync,
{
    fn predict(&self, features: &[f64]) -> Result<f64, PredictError> {
        self(features)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelStatus {
    pub name: &'static str,
    pub endpoint: String,
    pub artifact: &'static str,
    pub available: bool,
}
