use super::projection::{derive_insert, derive_patch, derive_select, Projection, Refinement};
use super::{CanonicalShape, FieldDef, FieldType, SchemaError};

/// Canonical shape of the `tasks` table, as seen on the wire
pub const TASK_SHAPE: CanonicalShape = CanonicalShape {
    name: "tasks",
    fields: &[
        FieldDef::server("id", FieldType::Integer),
        FieldDef::caller("name", FieldType::Text),
        FieldDef::caller("done", FieldType::Boolean).with_default(),
        FieldDef::server("createdAt", FieldType::Timestamp).with_default(),
        FieldDef::server("updatedAt", FieldType::Timestamp).with_default(),
    ],
};

/// Task names are non-empty and at most 500 characters
pub const NAME_BOUNDS: &[Refinement] = &[Refinement::MinLength(1), Refinement::MaxLength(500)];

/// The three task validators, derived once at startup
#[derive(Debug, Clone)]
pub struct TaskProjections {
    pub select: Projection,
    pub insert: Projection,
    pub patch: Projection,
}

impl TaskProjections {
    pub fn new() -> Result<Self, SchemaError> {
        // `done` has a store default but callers must still send it on create
        let insert = derive_insert(&TASK_SHAPE, &[("name", NAME_BOUNDS)], &["done"])?;
        Ok(Self {
            select: derive_select(&TASK_SHAPE),
            patch: derive_patch(&insert),
            insert,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Presence;

    #[test]
    fn projections_share_one_name_constraint() {
        let projections = TaskProjections::new().unwrap();
        let insert_name = projections.insert.rule("name").unwrap();
        let patch_name = projections.patch.rule("name").unwrap();
        assert_eq!(insert_name.refinements, NAME_BOUNDS);
        assert_eq!(patch_name.refinements, insert_name.refinements);
        assert_eq!(patch_name.presence, Presence::Optional);
    }

    #[test]
    fn select_covers_every_canonical_field() {
        let projections = TaskProjections::new().unwrap();
        let names: Vec<_> = projections.select.field_names().collect();
        assert_eq!(names, vec!["id", "name", "done", "createdAt", "updatedAt"]);
    }
}
