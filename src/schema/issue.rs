use serde::Serialize;
use serde_json::Value;

/// Fixed message texts clients can match on.
pub mod messages {
    pub const REQUIRED: &str = "Required";
    pub const EXPECTED_STRING: &str = "Expected string, received undefined";
    pub const EXPECTED_NUMBER: &str = "Expected number, received nan";
    pub const EXPECTED_INTEGER: &str = "Expected integer, received float";
    pub const NO_UPDATES: &str = "No updates provided";
}

/// Value of the `name` member in every validation envelope
pub const ENVELOPE_NAME: &str = "ValidationError";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    InvalidType,
    InvalidDate,
    TooSmall,
    TooBig,
    InvalidUpdates,
    Custom,
}

/// One field-path-addressed validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub code: IssueCode,
    pub path: Vec<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received: Option<String>,
}

impl Issue {
    pub fn new(code: IssueCode, path: Vec<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            path,
            message: message.into(),
            expected: None,
            received: None,
        }
    }

    pub fn at(field: &str, code: IssueCode, message: impl Into<String>) -> Self {
        Self::new(code, vec![field.to_string()], message)
    }

    /// A value is present but has the wrong JSON type
    pub fn invalid_type(path: Vec<String>, expected: &str, received: &str) -> Self {
        Self {
            expected: Some(expected.to_string()),
            received: Some(received.to_string()),
            ..Self::new(
                IssueCode::InvalidType,
                path,
                format!("Expected {}, received {}", expected, received),
            )
        }
    }

    /// A required value is absent. Text fields report the typed message, every
    /// other type reports the fixed `Required` text.
    pub fn missing(field: &str, expected: &str) -> Self {
        let message = if expected == "string" {
            messages::EXPECTED_STRING
        } else {
            messages::REQUIRED
        };
        Self {
            expected: Some(expected.to_string()),
            received: Some("undefined".to_string()),
            ..Self::at(field, IssueCode::InvalidType, message)
        }
    }

    pub fn no_updates() -> Self {
        Self::new(IssueCode::InvalidUpdates, Vec::new(), messages::NO_UPDATES)
    }
}

/// Describe a JSON value's type the way issue messages name it
pub fn received_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Ordered list of issues produced by one validation call.
///
/// Serializes as the `error` member of the 422 envelope:
/// `{ "issues": [...], "name": "ValidationError" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("validation failed with {} issue(s)", .issues.len())]
pub struct ValidationError {
    issues: Vec<Issue>,
    name: &'static str,
}

impl ValidationError {
    pub fn new(issues: Vec<Issue>) -> Self {
        Self {
            issues,
            name: ENVELOPE_NAME,
        }
    }

    pub fn single(issue: Issue) -> Self {
        Self::new(vec![issue])
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn first(&self) -> Option<&Issue> {
        self.issues.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_serializes_issues_and_name() {
        let err = ValidationError::new(vec![
            Issue::missing("name", "string"),
            Issue::missing("done", "boolean"),
        ]);

        let value = serde_json::to_value(&err).unwrap();
        assert_eq!(value["name"], json!("ValidationError"));
        assert_eq!(value["issues"][0]["path"], json!(["name"]));
        assert_eq!(value["issues"][0]["code"], json!("invalid_type"));
        assert_eq!(value["issues"][0]["message"], json!(messages::EXPECTED_STRING));
        assert_eq!(value["issues"][1]["message"], json!(messages::REQUIRED));
        assert_eq!(value["issues"][1]["received"], json!("undefined"));
    }

    #[test]
    fn no_updates_issue_is_top_level() {
        let value = serde_json::to_value(Issue::no_updates()).unwrap();
        assert_eq!(value["code"], json!("invalid_updates"));
        assert_eq!(value["path"], json!([]));
        assert_eq!(value["message"], json!("No updates provided"));
        assert!(value.get("expected").is_none());
    }

    #[test]
    fn invalid_type_message_names_both_types() {
        let issue = Issue::invalid_type(vec!["done".into()], "boolean", received_type(&json!("yes")));
        assert_eq!(issue.message, "Expected boolean, received string");
    }
}
