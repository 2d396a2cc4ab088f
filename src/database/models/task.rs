use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A stored task row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i64,
    pub name: String,
    pub done: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Caller-supplied fields for a new task
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewTask {
    pub name: String,
    pub done: bool,
}

/// Partial update; absent fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PatchTask {
    pub name: Option<String>,
    pub done: Option<bool>,
}

impl PatchTask {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.done.is_none()
    }

    /// Apply the present fields and regenerate `updated_at`
    pub fn apply(&self, task: &mut Task, now: DateTime<Utc>) {
        if let Some(name) = &self.name {
            task.name = name.clone();
        }
        if let Some(done) = self.done {
            task.done = done;
        }
        task.updated_at = next_updated_at(task.updated_at, now);
    }
}

/// Current time at millisecond precision
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// The update timestamp always moves forward, even within one millisecond
pub fn next_updated_at(previous: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    if now > previous {
        now
    } else {
        previous + Duration::milliseconds(1)
    }
}
