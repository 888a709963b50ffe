//! Web server module

mod middleware;
mod presenter;
mod routes;

pub use routes::warm_cache;

use anyhow::Result;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::get,
    Router,
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{cors::CorsLayer, services::ServeDir};
use tracing::info;

use crate::config::{Config, DisplayConfig};
use crate::dataset::Dataset;

pub struct AppState {
    pub dataset: Arc<Dataset>,
    pub display: DisplayConfig,
}

/// Fallback for unknown paths
async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Html("<!DOCTYPE html><html><head><title>404 Not Found</title></head><body><h1>Not Found</h1><p>The requested URL was not found on this server.</p></body></html>"),
    )
}

pub async fn start_server(config: &Config, dataset: Arc<Dataset>) -> Result<()> {
    let state = Arc::new(AppState {
        dataset,
        display: config.display.clone(),
    });

    let app = Router::new()
        // Pages
        .route("/", get(routes::index))
        .route("/robots.txt", get(routes::robots_txt))
        // API endpoints
        .route("/api/meta", get(routes::api_meta))
        .route("/api/dashboard", get(routes::api_dashboard))
        .route("/api/daily-orders", get(routes::api_daily_orders))
        .route("/api/category-sales", get(routes::api_category_sales))
        .route("/api/rfm", get(routes::api_rfm))
        // Static assets
        .nest_service("/static", ServeDir::new("static"))
        .fallback(not_found)
        .layer(CorsLayer::permissive())
        .layer(middleware::AccessLogLayer::new())
        .with_state(state);

    let addr = format!("{}:{}", config.server.host, config.server.http_port);
    info!("Web server starting on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
