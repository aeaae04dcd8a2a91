//! Request handlers, grouped by the resource they serve.

pub mod auth;
pub mod content;
pub mod course;
pub mod election;
pub mod stats;
pub mod upload;
pub mod user;

use axum::Json;
use serde::Serialize;

use crate::Error;

/// Rejects blank required fields.
fn require(fields: &[(&str, &str)]) -> Result<(), Error> {
    match fields.iter().find(|(_, value)| value.trim().is_empty()) {
        Some((name, _)) => Err(Error::MalformedRequest(format!("{name} is required"))),
        None => Ok(()),
    }
}

#[derive(Serialize)]
pub struct HealthRes {
    pub status: &'static str,
    pub message: &'static str,
}

pub async fn health() -> Json<HealthRes> {
    Json(HealthRes {
        status: "ok",
        message: "Department portal API is running",
    })
}
