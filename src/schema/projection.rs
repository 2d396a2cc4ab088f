use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::issue::{received_type, Issue, IssueCode, ValidationError};
use super::{CanonicalShape, FieldDef, Ownership, SchemaError};

/// Extra constraints layered on a field's base type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refinement {
    MinLength(usize),
    MaxLength(usize),
}

impl Refinement {
    fn check(self, field: &str, value: &Value) -> Option<Issue> {
        let len = value.as_str()?.chars().count();
        match self {
            Refinement::MinLength(min) if len < min => Some(Issue::at(
                field,
                IssueCode::TooSmall,
                format!("String must contain at least {} character(s)", min),
            )),
            Refinement::MaxLength(max) if len > max => Some(Issue::at(
                field,
                IssueCode::TooBig,
                format!("String must contain at most {} character(s)", max),
            )),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Required,
    Optional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionKind {
    Select,
    Insert,
    Patch,
}

/// How one field is validated within a projection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRule {
    pub field: FieldDef,
    pub presence: Presence,
    pub refinements: Vec<Refinement>,
}

impl FieldRule {
    fn check(&self, value: &Value) -> Result<(), Vec<Issue>> {
        self.field
            .kind
            .check(self.field.name, value)
            .map_err(|issue| vec![issue])?;

        let issues: Vec<Issue> = self
            .refinements
            .iter()
            .filter_map(|r| r.check(self.field.name, value))
            .collect();
        if issues.is_empty() {
            Ok(())
        } else {
            Err(issues)
        }
    }
}

/// A validator derived from a canonical shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    kind: ProjectionKind,
    rules: Vec<FieldRule>,
    /// Reject payloads that carry none of the recognized fields
    require_any: bool,
}

impl Projection {
    pub fn kind(&self) -> ProjectionKind {
        self.kind
    }

    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }

    pub fn rule(&self, name: &str) -> Option<&FieldRule> {
        self.rules.iter().find(|r| r.field.name == name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.iter().map(|r| r.field.name)
    }

    /// Validate `input` and return the recognized fields.
    ///
    /// Issues are reported in declared field order. Unknown keys are dropped.
    /// The empty-payload check only runs once every field has passed.
    pub fn validate(&self, input: &Value) -> Result<Map<String, Value>, ValidationError> {
        let Some(object) = input.as_object() else {
            return Err(ValidationError::single(Issue::invalid_type(
                Vec::new(),
                "object",
                received_type(input),
            )));
        };

        let mut issues = Vec::new();
        let mut accepted = Map::new();

        for rule in &self.rules {
            match object.get(rule.field.name) {
                None => {
                    if rule.presence == Presence::Required {
                        issues.push(Issue::missing(rule.field.name, rule.field.kind.name()));
                    }
                }
                Some(value) => match rule.check(value) {
                    Ok(()) => {
                        accepted.insert(rule.field.name.to_string(), value.clone());
                    }
                    Err(mut field_issues) => issues.append(&mut field_issues),
                },
            }
        }

        if !issues.is_empty() {
            return Err(ValidationError::new(issues));
        }
        if self.require_any && accepted.is_empty() {
            return Err(ValidationError::single(Issue::no_updates()));
        }
        Ok(accepted)
    }

    /// Validate `input` and deserialize the accepted fields into `T`
    pub fn parse<T: DeserializeOwned>(&self, input: &Value) -> Result<T, ValidationError> {
        let accepted = self.validate(input)?;
        serde_json::from_value(Value::Object(accepted)).map_err(|e| {
            ValidationError::single(Issue::new(IssueCode::Custom, Vec::new(), e.to_string()))
        })
    }
}

/// Every canonical field, required, base types only
pub fn derive_select(shape: &CanonicalShape) -> Projection {
    Projection {
        kind: ProjectionKind::Select,
        rules: shape
            .fields
            .iter()
            .map(|field| FieldRule {
                field: *field,
                presence: Presence::Required,
                refinements: Vec::new(),
            })
            .collect(),
        require_any: false,
    }
}

/// Caller-writable fields with refinements applied.
///
/// Fields without a store default are required. Fields named in `required` are
/// required even when the store could default them.
pub fn derive_insert(
    shape: &CanonicalShape,
    refinements: &[(&str, &[Refinement])],
    required: &[&str],
) -> Result<Projection, SchemaError> {
    let named = refinements.iter().map(|(name, _)| *name).chain(required.iter().copied());
    for name in named {
        match shape.field(name) {
            None => {
                return Err(SchemaError::UnknownField {
                    shape: shape.name,
                    field: name.to_string(),
                })
            }
            Some(field) if field.ownership == Ownership::Server => {
                return Err(SchemaError::ServerOwnedField {
                    shape: shape.name,
                    field: name.to_string(),
                })
            }
            Some(_) => {}
        }
    }

    let rules = shape
        .caller_fields()
        .map(|field| {
            let presence = if field.has_default && !required.contains(&field.name) {
                Presence::Optional
            } else {
                Presence::Required
            };
            let refinements = refinements
                .iter()
                .filter(|(name, _)| *name == field.name)
                .flat_map(|(_, r)| r.iter().copied())
                .collect();
            FieldRule {
                field: *field,
                presence,
                refinements,
            }
        })
        .collect();

    Ok(Projection {
        kind: ProjectionKind::Insert,
        rules,
        require_any: false,
    })
}

/// The insert projection with every field optional and at least one required
pub fn derive_patch(insert: &Projection) -> Projection {
    Projection {
        kind: ProjectionKind::Patch,
        rules: insert
            .rules
            .iter()
            .cloned()
            .map(|rule| FieldRule {
                presence: Presence::Optional,
                ..rule
            })
            .collect(),
        require_any: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::issue::messages;
    use crate::schema::{FieldType, TASK_SHAPE};
    use serde_json::json;

    const BOUNDS: &[Refinement] = &[Refinement::MinLength(1), Refinement::MaxLength(500)];

    fn insert() -> Projection {
        derive_insert(&TASK_SHAPE, &[("name", BOUNDS)], &["done"]).unwrap()
    }

    #[test]
    fn insert_excludes_server_owned_fields() {
        let names: Vec<_> = insert().field_names().collect();
        assert_eq!(names, vec!["name", "done"]);
    }

    #[test]
    fn insert_promotes_defaulted_field_to_required() {
        let promoted = insert();
        assert_eq!(promoted.rule("done").unwrap().presence, Presence::Required);

        let relaxed = derive_insert(&TASK_SHAPE, &[("name", BOUNDS)], &[]).unwrap();
        assert_eq!(relaxed.rule("done").unwrap().presence, Presence::Optional);
        assert_eq!(relaxed.rule("name").unwrap().presence, Presence::Required);
    }

    #[test]
    fn insert_rejects_unknown_or_server_owned_names() {
        let err = derive_insert(&TASK_SHAPE, &[("title", BOUNDS)], &[]).unwrap_err();
        assert_eq!(
            err,
            SchemaError::UnknownField {
                shape: "tasks",
                field: "title".into()
            }
        );

        let err = derive_insert(&TASK_SHAPE, &[], &["createdAt"]).unwrap_err();
        assert!(matches!(err, SchemaError::ServerOwnedField { .. }));
    }

    #[test]
    fn missing_name_reports_expected_string_first() {
        let err = insert().validate(&json!({ "done": false })).unwrap_err();
        let first = err.first().unwrap();
        assert_eq!(first.path, vec!["name"]);
        assert_eq!(first.message, messages::EXPECTED_STRING);
        assert_eq!(err.issues().len(), 1);
    }

    #[test]
    fn missing_done_reports_required() {
        let err = insert().validate(&json!({ "name": "Learn axum" })).unwrap_err();
        let first = err.first().unwrap();
        assert_eq!(first.path, vec!["done"]);
        assert_eq!(first.message, messages::REQUIRED);
    }

    #[test]
    fn issues_follow_declared_field_order() {
        let err = insert().validate(&json!({ "done": "no", "name": 3 })).unwrap_err();
        let paths: Vec<_> = err.issues().iter().map(|i| i.path[0].as_str()).collect();
        assert_eq!(paths, vec!["name", "done"]);
        assert_eq!(err.issues()[0].message, "Expected string, received number");
        assert_eq!(err.issues()[1].message, "Expected boolean, received string");
    }

    #[test]
    fn name_length_bounds_apply() {
        let err = insert().validate(&json!({ "name": "", "done": true })).unwrap_err();
        assert_eq!(err.first().unwrap().code, IssueCode::TooSmall);

        let long = "x".repeat(501);
        let err = insert().validate(&json!({ "name": long, "done": true })).unwrap_err();
        assert_eq!(err.first().unwrap().code, IssueCode::TooBig);
        assert_eq!(err.first().unwrap().message, "String must contain at most 500 character(s)");

        let exact = "é".repeat(500);
        assert!(insert().validate(&json!({ "name": exact, "done": true })).is_ok());
    }

    #[test]
    fn null_is_a_type_error_not_an_absence() {
        let err = insert().validate(&json!({ "name": null, "done": true })).unwrap_err();
        assert_eq!(err.first().unwrap().message, "Expected string, received null");
    }

    #[test]
    fn unknown_and_server_keys_are_stripped() {
        let accepted = insert()
            .validate(&json!({ "name": "a", "done": true, "id": 4, "createdAt": "x", "extra": 1 }))
            .unwrap();
        assert_eq!(accepted.len(), 2);
        assert!(accepted.get("id").is_none());
    }

    #[test]
    fn non_object_body_fails_at_root() {
        let err = insert().validate(&json!([1, 2])).unwrap_err();
        let first = err.first().unwrap();
        assert!(first.path.is_empty());
        assert_eq!(first.message, "Expected object, received array");
    }

    #[test]
    fn patch_makes_every_field_optional() {
        let patch = derive_patch(&insert());
        assert_eq!(patch.kind(), ProjectionKind::Patch);
        assert!(patch.rules().iter().all(|r| r.presence == Presence::Optional));
        assert!(patch.validate(&json!({ "done": true })).is_ok());
    }

    #[test]
    fn patch_inherits_refinements() {
        let patch = derive_patch(&insert());
        let err = patch.validate(&json!({ "name": "" })).unwrap_err();
        assert_eq!(err.first().unwrap().code, IssueCode::TooSmall);
    }

    #[test]
    fn patch_rejects_empty_payload() {
        let patch = derive_patch(&insert());
        for body in [json!({}), json!({ "id": 3, "updatedAt": "2024-01-01T00:00:00Z" })] {
            let err = patch.validate(&body).unwrap_err();
            assert_eq!(err.issues().len(), 1);
            assert_eq!(err.first().unwrap().code, IssueCode::InvalidUpdates);
            assert_eq!(err.first().unwrap().message, messages::NO_UPDATES);
        }
    }

    #[test]
    fn field_issues_win_over_no_updates() {
        let patch = derive_patch(&insert());
        let err = patch.validate(&json!({ "done": "yes" })).unwrap_err();
        assert_eq!(err.issues().len(), 1);
        assert_eq!(err.first().unwrap().code, IssueCode::InvalidType);
    }

    #[test]
    fn select_requires_all_fields_without_refinements() {
        let select = derive_select(&TASK_SHAPE);
        assert_eq!(select.rules().len(), TASK_SHAPE.fields.len());
        assert!(select.rules().iter().all(|r| r.refinements.is_empty()));

        let err = select.validate(&json!({ "id": 1, "name": "", "done": false })).unwrap_err();
        let paths: Vec<_> = err.issues().iter().map(|i| i.path[0].as_str()).collect();
        assert_eq!(paths, vec!["createdAt", "updatedAt"]);
    }

    #[test]
    fn parse_yields_typed_values() {
        #[derive(serde::Deserialize)]
        struct Body {
            name: String,
            done: bool,
        }

        let body: Body = insert().parse(&json!({ "name": "Ship it", "done": true })).unwrap();
        assert_eq!(body.name, "Ship it");
        assert!(body.done);
        assert_eq!(TASK_SHAPE.field("id").unwrap().kind, FieldType::Integer);
    }
}
