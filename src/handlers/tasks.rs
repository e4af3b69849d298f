use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::{AppError, AppJson},
    models::{CreateTask, ErrorResponse, MessageResponse, TaskListResponse, TaskResponse, UpdateTask},
    stats, AppState,
};

#[utoipa::path(
    get,
    path = "/tasks",
    responses(
        (status = 200, description = "All tasks, newest first, with aggregate stats", body = TaskListResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
pub async fn list_tasks(State(state): State<AppState>) -> Result<Json<TaskListResponse>, AppError> {
    let tasks = state.store.list_all().await?;
    let stats = stats::compute_stats(state.store.as_ref()).await;

    Ok(Json(TaskListResponse {
        success: true,
        total: tasks.len() as i64,
        tasks,
        stats,
    }))
}

#[utoipa::path(
    post,
    path = "/tasks",
    request_body = CreateTask,
    responses(
        (status = 201, description = "Task created", body = TaskResponse),
        (status = 400, description = "Missing or empty title, or unparsable body", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
pub async fn create_task(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateTask>,
) -> Result<(StatusCode, Json<TaskResponse>), AppError> {
    let new = payload.into_new_task()?;
    let task = state.store.insert(new).await?;

    tracing::info!("created task '{}' ({})", task.title, task.id);

    Ok((
        StatusCode::CREATED,
        Json(TaskResponse {
            success: true,
            message: "Task created successfully".to_string(),
            task,
        }),
    ))
}

#[utoipa::path(
    put,
    path = "/tasks/{id}",
    params(
        ("id" = String, Path, description = "Task id")
    ),
    request_body = UpdateTask,
    responses(
        (status = 200, description = "Task updated", body = TaskResponse),
        (status = 400, description = "No recognized fields, empty title, or unparsable body", body = ErrorResponse),
        (status = 404, description = "No task with that id", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<UpdateTask>,
) -> Result<Json<TaskResponse>, AppError> {
    let patch = payload.into_patch()?;
    let task = state
        .store
        .update(&id, patch)
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".to_string()))?;

    tracing::info!("updated task {}", task.id);

    Ok(Json(TaskResponse {
        success: true,
        message: "Task updated successfully".to_string(),
        task,
    }))
}

#[utoipa::path(
    delete,
    path = "/tasks/{id}",
    params(
        ("id" = String, Path, description = "Task id")
    ),
    responses(
        (status = 200, description = "Task deleted", body = MessageResponse),
        (status = 404, description = "No task with that id", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let removed = state.store.delete(&id).await?;
    if !removed {
        return Err(AppError::NotFound("Task not found".to_string()));
    }

    tracing::info!("deleted task {}", id);

    Ok(Json(MessageResponse {
        success: true,
        message: "Task deleted successfully".to_string(),
    }))
}
