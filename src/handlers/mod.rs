pub mod api;
pub mod explorer;

use axum::routing::get;
use axum::Router;

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        // Pages
        .route("/", get(explorer::index))
        // API (JSON for charts)
        .route("/api/years", get(api::years))
        .route("/api/budget/:kind/view", get(api::budget_view))
        .route("/api/budget/:kind/trend", get(api::budget_trend))
        .route("/api/budget/:kind/donut", get(api::budget_donut))
        .route("/api/budget/:kind/ranking", get(api::budget_ranking))
        .route("/api/breakdown", get(api::breakdown))
        .route("/api/overview", get(api::overview))
        .route("/api/compare", get(api::compare))
        .route("/api/funds", get(api::funds))
        .route("/api/funds/trend", get(api::funds_trend))
        // Health check
        .route("/health", get(health))
        .fallback(fallback)
}

async fn health() -> &'static str {
    "OK"
}

async fn fallback() -> AppError {
    AppError::NotFound("Page not found".into())
}
