pub mod health;
pub mod stats;
pub mod tasks;

use crate::error::AppError;

// Router fallback: unknown routes get the enveloped 404 instead of axum's
// empty-body default.
pub async fn fallback() -> AppError {
    AppError::NotFound("Endpoint not found".to_string())
}
