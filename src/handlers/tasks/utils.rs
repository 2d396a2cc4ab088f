use axum::extract::{rejection::PathRejection, Path};
use serde_json::Value;

use crate::database::Task;
use crate::error::ApiError;
use crate::schema::{IdParam, TaskProjections};

/// Validate the `:id` segment, folding undecodable segments into the same
/// not-a-number issue as other malformed ids.
pub fn task_id(path: Result<Path<String>, PathRejection>) -> Result<IdParam, ApiError> {
    match path {
        Ok(Path(raw)) => Ok(IdParam::parse(&raw)?),
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Rejected id path segment");
            Err(IdParam::not_a_number().into())
        }
    }
}

/// Shape a stored task through the select projection for the response body.
///
/// A stored row that fails the projection is a server fault, not a 422.
pub fn present(schema: &TaskProjections, task: &Task) -> Result<Value, ApiError> {
    let value = serde_json::to_value(task)?;
    match schema.select.validate(&value) {
        Ok(fields) => Ok(Value::Object(fields)),
        Err(err) => {
            tracing::error!(task_id = task.id, error = %err, issues = ?err.issues(), "Stored task does not match select projection");
            Err(ApiError::internal_server_error("Failed to format response"))
        }
    }
}
