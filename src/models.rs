use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppError;

// --- Domain model ---

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub done: bool,
    // Serialized as an explicit null when unset so clients can tell
    // "no due date" apart from a missing field.
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated input for the storage layer, which assigns `id` and the
/// timestamps on insert.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub done: bool,
    pub due_date: Option<NaiveDate>,
}

/// Field subset applied by an update. `due_date` is double-wrapped: the outer
/// `Option` is "was the key supplied", the inner one is the new value, so an
/// explicit `null` clears the stored date.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub done: Option<bool>,
    pub due_date: Option<Option<NaiveDate>>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.done.is_none() && self.due_date.is_none()
    }

    pub fn apply(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(done) = self.done {
            task.done = done;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
    }
}

// --- Request DTOs ---

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTask {
    pub title: String,
    #[serde(default)]
    pub done: bool,
    #[schema(value_type = Option<String>, format = Date)]
    pub due_date: Option<NaiveDate>,
}

impl CreateTask {
    pub fn into_new_task(self) -> Result<NewTask, AppError> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(AppError::Validation(
                "The 'title' field is required".to_string(),
            ));
        }
        Ok(NewTask {
            title,
            done: self.done,
            due_date: self.due_date,
        })
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub done: Option<bool>,
    #[serde(default, deserialize_with = "explicit_null")]
    #[schema(value_type = Option<String>, format = Date)]
    pub due_date: Option<Option<NaiveDate>>,
}

impl UpdateTask {
    pub fn into_patch(self) -> Result<TaskPatch, AppError> {
        let title = match self.title {
            Some(t) => {
                let t = t.trim().to_string();
                if t.is_empty() {
                    return Err(AppError::Validation(
                        "The 'title' field cannot be empty".to_string(),
                    ));
                }
                Some(t)
            }
            None => None,
        };

        let patch = TaskPatch {
            title,
            done: self.done,
            due_date: self.due_date,
        };
        if patch.is_empty() {
            return Err(AppError::Validation("No fields to update".to_string()));
        }
        Ok(patch)
    }
}

// Maps a present-but-null key to Some(None); a missing key stays None via
// serde(default).
fn explicit_null<'de, D>(deserializer: D) -> Result<Option<Option<NaiveDate>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<NaiveDate>::deserialize(deserializer).map(Some)
}

// --- Response DTOs ---

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct TaskStats {
    pub total: i64,
    pub completed: i64,
    pub pending: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TaskResponse {
    pub success: bool,
    pub message: String,
    pub task: Task,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TaskListResponse {
    pub success: bool,
    pub tasks: Vec<Task>,
    pub stats: TaskStats,
    pub total: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatsResponse {
    pub success: bool,
    pub stats: TaskStats,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub success: bool,
    pub status: String,
    pub service: String,
    pub database: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_trims_title() {
        let payload = CreateTask {
            title: "  Buy milk  ".to_string(),
            done: false,
            due_date: None,
        };
        let new = payload.into_new_task().unwrap();
        assert_eq!(new.title, "Buy milk");
    }

    #[test]
    fn create_rejects_blank_title() {
        let payload = CreateTask {
            title: "   ".to_string(),
            done: false,
            due_date: None,
        };
        assert!(matches!(
            payload.into_new_task(),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn update_rejects_empty_patch() {
        let payload: UpdateTask = serde_json::from_value(json!({})).unwrap();
        assert!(matches!(payload.into_patch(), Err(AppError::Validation(_))));
    }

    #[test]
    fn update_distinguishes_missing_from_null_due_date() {
        let missing: UpdateTask = serde_json::from_value(json!({ "done": true })).unwrap();
        assert_eq!(missing.due_date, None);

        let cleared: UpdateTask = serde_json::from_value(json!({ "due_date": null })).unwrap();
        assert_eq!(cleared.due_date, Some(None));

        let set: UpdateTask = serde_json::from_value(json!({ "due_date": "2026-01-15" })).unwrap();
        assert_eq!(set.due_date, Some(NaiveDate::from_ymd_opt(2026, 1, 15)));
    }

    #[test]
    fn patch_applies_only_supplied_fields() {
        let now = Utc::now();
        let mut task = Task {
            id: Uuid::new_v4(),
            title: "Buy milk".to_string(),
            done: false,
            due_date: NaiveDate::from_ymd_opt(2026, 1, 15),
            created_at: now,
            updated_at: now,
        };

        TaskPatch {
            done: Some(true),
            ..Default::default()
        }
        .apply(&mut task);
        assert_eq!(task.title, "Buy milk");
        assert!(task.done);
        assert!(task.due_date.is_some());

        TaskPatch {
            due_date: Some(None),
            ..Default::default()
        }
        .apply(&mut task);
        assert_eq!(task.due_date, None);
    }

    #[test]
    fn absent_due_date_serializes_as_null() {
        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4(),
            title: "Buy milk".to_string(),
            done: false,
            due_date: None,
            created_at: now,
            updated_at: now,
        };
        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value["due_date"], serde_json::Value::Null);
    }
}
