use axum::{extract::State, Json};

use crate::{models::StatsResponse, stats, AppState};

#[utoipa::path(
    get,
    path = "/stats",
    responses(
        (status = 200, description = "Aggregate task counts; degrades to zeros when the store is unreachable", body = StatsResponse)
    )
)]
pub async fn get_stats(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = stats::compute_stats(state.store.as_ref()).await;
    Json(StatsResponse {
        success: true,
        stats,
    })
}
