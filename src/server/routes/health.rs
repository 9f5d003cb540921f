//! Liveness probe

use actix_web::{HttpResponse, Responder};

/// Health check endpoint
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}
