use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{
    clients::{catalog::CatalogClient, health::HealthChecker, storefront::StorefrontClient},
    config::Config,
    error::SyncError,
    models::{health::HealthStatus, response::ApiResponse},
    utils::process_record,
};

pub struct AppState {
    health_checker: HealthChecker,
    catalog_client: CatalogClient,
    storefront_client: StorefrontClient,
}

pub async fn run_api_server(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let state = Arc::new(AppState {
        health_checker: HealthChecker::new(config.clone()),
        catalog_client: CatalogClient::new(&config)?,
        storefront_client: StorefrontClient::new(&config)?,
    });

    let app = Router::new()
        .route("/health", get(health_check))
        .route("/sync/products/{record_id}", post(sync_record))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = TcpListener::bind(&addr).await?;

    info!(address = %addr, "API server started");

    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_checker.check_all().await;

    let status_code = match health.status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

/// Ad-hoc single-record sync, keyed by catalog record id. Creates the
/// storefront product without touching the offset chain.
async fn sync_record(
    State(state): State<Arc<AppState>>,
    Path(record_id): Path<String>,
) -> impl IntoResponse {
    match process_record(&record_id, &state.catalog_client, &state.storefront_client).await {
        Ok(product_id) => (
            StatusCode::CREATED,
            Json(ApiResponse::success(
                product_id,
                format!("Record {} synced", record_id),
            )),
        ),
        Err(e) => {
            let status_code = match &e {
                SyncError::NotFound(_) => StatusCode::NOT_FOUND,
                SyncError::MalformedMessage(_) | SyncError::Validation(_) => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                SyncError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
                SyncError::UpstreamUnavailable(_) | SyncError::Publish(_) => {
                    StatusCode::BAD_GATEWAY
                }
            };

            (
                status_code,
                Json(ApiResponse::error(
                    e.to_string(),
                    format!("Failed to sync record {}", record_id),
                )),
            )
        }
    }
}
