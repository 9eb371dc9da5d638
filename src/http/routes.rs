use axum::{routing::delete, routing::get, routing::post, Router};

use crate::http::handlers;
use crate::AppState;

pub fn health() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health))
}

pub fn catalog() -> Router<AppState> {
    Router::new()
        .route("/v1/courses", get(handlers::list_courses))
        .route("/v1/exams", get(handlers::list_exams))
        .route("/v1/documents", get(handlers::list_documents))
}

pub fn reports() -> Router<AppState> {
    Router::new()
        .route("/v1/reports", get(handlers::list_reports))
        .route("/v1/reports", post(handlers::create_report))
        .route("/v1/reports/:id", get(handlers::get_report))
        .route("/v1/reports/:id", delete(handlers::delete_report))
        .route("/v1/reports/:id/download", get(handlers::download_report))
}
