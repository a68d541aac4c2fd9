//! Task records as they are stored in the `taskList` and `taskHistory` documents.
//!
//! # Invariants
//! - `Task::is_complete` is always `false` while the task sits in the active list
//! - `CompletedTask::is_complete` is always `true` and `order` is always `0`
//! - `CompletedTask::completed_date >= CompletedTask::created_date`

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque task identifier.
///
/// # Properties
/// - Compared by value only; no format is assumed for ids coming off the wire
/// - Locally created ids are UUID v4 strings
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Create a new unique task ID.
    ///
    /// # Postcondition
    /// Returns a fresh ID that has never been used before in this process.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for TaskId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// An active, incomplete to-do item.
///
/// # Invariants
/// - Within one list, `order` values are exactly `0..len` with no duplicates
/// - At most one task in a list has `is_top_priority == true`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub description: String,
    #[serde(default)]
    pub is_complete: bool,
    pub created_date: DateTime<Utc>,
    #[serde(default)]
    pub target_date: Option<DateTime<Utc>>,
    pub order: usize,
    #[serde(default)]
    pub is_top_priority: bool,
}

impl Task {
    /// Create a new task positioned at `order`.
    ///
    /// # Preconditions
    /// - `description` is non-empty after trimming
    ///
    /// # Postconditions
    /// - `task.id` is a fresh unique identifier
    /// - `task.is_complete == false` and `task.is_top_priority == false`
    ///
    /// # Errors
    /// Returns `TaskError::EmptyDescription` if the description is blank.
    pub fn new(
        description: impl Into<String>,
        target_date: Option<DateTime<Utc>>,
        order: usize,
    ) -> Result<Self, TaskError> {
        let description = description.into();
        if description.trim().is_empty() {
            return Err(TaskError::EmptyDescription);
        }

        Ok(Self {
            id: TaskId::new(),
            description,
            is_complete: false,
            created_date: Utc::now(),
            target_date,
            order,
            is_top_priority: false,
        })
    }

    /// Turn this task into its history record, stamped with the current time.
    ///
    /// # Postcondition
    /// `completed.completed_date >= completed.created_date`, even when the
    /// creation timestamp came from a client with a fast clock.
    pub fn into_completed(self) -> CompletedTask {
        self.into_completed_at(Utc::now())
    }

    /// Same as [`Task::into_completed`] with an explicit completion time.
    pub fn into_completed_at(self, now: DateTime<Utc>) -> CompletedTask {
        CompletedTask {
            id: self.id,
            description: self.description,
            is_complete: true,
            created_date: self.created_date,
            completed_date: now.max(self.created_date),
            order: 0,
        }
    }
}

/// An immutable record of a finished task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedTask {
    pub id: TaskId,
    pub description: String,
    #[serde(default = "completed_flag")]
    pub is_complete: bool,
    pub created_date: DateTime<Utc>,
    pub completed_date: DateTime<Utc>,
    #[serde(default)]
    pub order: usize,
}

fn completed_flag() -> bool {
    true
}

/// Errors that can occur during task list operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskError {
    #[error("Task description cannot be empty")]
    EmptyDescription,

    #[error("Task {0} not found")]
    NotFound(TaskId),
}
