use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    routing::{get, post},
};
use serde::Serialize;
use serde_json::{Map, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::debug;

use crate::{
    config::AppConfig,
    endpoint::{self, Endpoint},
    error::ServiceError,
    model::{ModelRegistry, ModelStatus},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub registry: Arc<ModelRegistry>,
}

#[derive(Serialize)]
struct ModelsResponse {
    model_dir: String,
    models: Vec<ModelStatus>,
}

pub fn build_router(config: Arc<AppConfig>, registry: Arc<ModelRegistry>) -> Router {
    let state = AppState { config, registry };

    Router::new()
        .route("/", get(home))
        .route("/test", get(self_test))
        .route("/health", get(health))
        .route("/models", get(models))
        .merge(prediction_routes().layer(CorsLayer::permissive()))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

fn prediction_routes() -> Router<AppState> {
    let mut router = Router::new();
    for &endpoint in endpoint::ALL {
        router = router.route(
            &endpoint.route(),
            post(move |State(state): State<AppState>, body: Bytes| {
                predict(state, endpoint, body)
            }),
        );
    }

    // Older clients still post to the plural path.
    router.route(
        endpoint::DEPRECATED_CALORIE_ROUTE,
        post(|State(state): State<AppState>, body: Bytes| {
            predict(state, endpoint::CALORIE, body)
        }),
    )
}

async fn home() -> &'static str {
    "Welcome to the Health Prediction API!"
}

async fn self_test() -> Json<Value> {
    Json(serde_json::json!({ "message": "API is working fine!" }))
}

async fn health() -> &'static str {
    "ok"
}

async fn models(State(state): State<AppState>) -> Json<ModelsResponse> {
    Json(ModelsResponse {
        model_dir: state.config.model_dir.display().to_string(),
        models: state.registry.status(),
    })
}

async fn predict(
    state: AppState,
    endpoint: Endpoint,
    body: Bytes,
) -> Result<Json<Value>, ServiceError> {
    let model = state.registry.get(endpoint.name)?;

    let payload: Value = serde_json::from_slice(&body)
        .map_err(|e| ServiceError::InvalidInput(format!("body is not valid JSON: {e}")))?;
    let record = endpoint.schema.validate(&payload)?;
    let features = record.to_features()?;

    let raw = state.registry.predict(model, features).await?;
    let value = endpoint.output.render(raw)?;
    debug!(model = endpoint.name, raw, %value, "prediction served");

    let mut response = Map::with_capacity(1);
    response.insert(endpoint.response_key.to_string(), value);
    Ok(Json(Value::Object(response)))
}
