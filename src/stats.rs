use crate::{
    models::TaskStats,
    store::{StoreError, TaskFilter, TaskStore},
};

/// Aggregate counts for the stats endpoint. Storage failures degrade to the
/// zero triple instead of failing the request.
pub async fn compute_stats(store: &dyn TaskStore) -> TaskStats {
    match try_compute(store).await {
        Ok(stats) => stats,
        Err(e) => {
            tracing::error!("failed to compute task stats: {}", e);
            TaskStats::default()
        }
    }
}

async fn try_compute(store: &dyn TaskStore) -> Result<TaskStats, StoreError> {
    let total = store.count(TaskFilter::All).await?;
    let completed = store.count(TaskFilter::Done(true)).await?;
    Ok(TaskStats {
        total,
        completed,
        pending: total - completed,
    })
}
