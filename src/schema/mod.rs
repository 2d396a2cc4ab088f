//! Canonical entity shapes and the validators derived from them.
//!
//! An entity is declared exactly once as a [`CanonicalShape`]. The select,
//! insert and patch validators are computed from that declaration by the
//! functions in [`projection`], so a field or constraint cannot drift between
//! what is stored, what is accepted and what is returned.

pub mod issue;
pub mod params;
pub mod projection;
pub mod task;

use chrono::DateTime;
use serde_json::Value;
use thiserror::Error;

pub use issue::{messages, Issue, IssueCode, ValidationError};
pub use params::IdParam;
pub use projection::{derive_insert, derive_patch, derive_select, Presence, Projection, ProjectionKind, Refinement};
pub use task::{TaskProjections, TASK_SHAPE};

/// Errors raised while deriving projections from a canonical shape
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Unknown field '{field}' in {shape}")]
    UnknownField { shape: &'static str, field: String },

    #[error("Field '{field}' in {shape} is server-owned and cannot be caller-writable")]
    ServerOwnedField { shape: &'static str, field: String },
}

/// Base column types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Integer,
    Text,
    Boolean,
    Timestamp,
}

impl FieldType {
    /// Type name used in issue messages
    pub fn name(self) -> &'static str {
        match self {
            FieldType::Integer => "number",
            FieldType::Text => "string",
            FieldType::Boolean => "boolean",
            FieldType::Timestamp => "date",
        }
    }

    /// Check a present value against the base type
    pub fn check(self, field: &str, value: &Value) -> Result<(), Issue> {
        let path = || vec![field.to_string()];
        match (self, value) {
            (FieldType::Integer, Value::Number(n)) => {
                if n.is_i64() || n.is_u64() {
                    Ok(())
                } else {
                    Err(Issue::invalid_type(path(), "integer", "float"))
                }
            }
            (FieldType::Text, Value::String(_)) => Ok(()),
            (FieldType::Boolean, Value::Bool(_)) => Ok(()),
            (FieldType::Timestamp, Value::String(s)) => DateTime::parse_from_rfc3339(s)
                .map(|_| ())
                .map_err(|_| Issue::at(field, IssueCode::InvalidDate, "Invalid date")),
            (kind, other) => Err(Issue::invalid_type(path(), kind.name(), issue::received_type(other))),
        }
    }
}

/// Who is allowed to write a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// Assigned by the store (ids, timestamps)
    Server,
    /// Supplied by API callers
    Caller,
}

/// One field of a canonical shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    pub kind: FieldType,
    pub ownership: Ownership,
    /// The store can fill this field when it is omitted
    pub has_default: bool,
}

impl FieldDef {
    pub const fn caller(name: &'static str, kind: FieldType) -> Self {
        Self {
            name,
            kind,
            ownership: Ownership::Caller,
            has_default: false,
        }
    }

    pub const fn server(name: &'static str, kind: FieldType) -> Self {
        Self {
            name,
            kind,
            ownership: Ownership::Server,
            has_default: false,
        }
    }

    pub const fn with_default(self) -> Self {
        Self {
            has_default: true,
            ..self
        }
    }
}

/// The authoritative field list of an entity, in declaration order
#[derive(Debug, Clone, Copy)]
pub struct CanonicalShape {
    pub name: &'static str,
    pub fields: &'static [FieldDef],
}

impl CanonicalShape {
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn caller_fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter().filter(|f| f.ownership == Ownership::Caller)
    }
}
