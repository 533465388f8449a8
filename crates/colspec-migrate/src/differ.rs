//! Constraint differ.
//!
//! Compares the old and new constraint spec of a single field and turns
//! each clause that appeared, disappeared or is present on both sides into
//! emitter calls.

use tracing::{debug, warn};

use crate::emit::{self, ColumnRef};
use crate::error::Result;
use crate::grammar::{Clause, KeywordMatching};
use crate::operations::MigrationOperation;
use crate::snapshot::FieldDescriptor;

/// How a clause changed between two column bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Absent before, present now.
    Add,
    /// Present before, absent now.
    Remove,
    /// Present on both sides. The clause is always re-synthesized.
    Update,
}

impl Transition {
    /// Returns true if the existing constraint must be dropped first.
    #[must_use]
    pub const fn drops_existing(self) -> bool {
        matches!(self, Self::Remove | Self::Update)
    }

    /// Returns true if the new constraint must be created.
    #[must_use]
    pub const fn adds_new(self) -> bool {
        matches!(self, Self::Add | Self::Update)
    }
}

/// Diffs the constraint specs of one field.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstraintDiffer {
    safe: bool,
    matching: KeywordMatching,
}

impl ConstraintDiffer {
    /// Creates a differ. In safe mode, a field that stops being persisted
    /// keeps its column.
    #[must_use]
    pub const fn new(safe: bool, matching: KeywordMatching) -> Self {
        Self { safe, matching }
    }

    /// Diffs a field whose spec changed.
    ///
    /// A field that stops being persisted is dropped under its old name; a
    /// field that starts being persisted is added with its new body. When
    /// both sides are persisted the bodies are compared clause by clause
    /// under the new name, since any rename has already been emitted.
    ///
    /// Constraint names are derived from that resolved new name, so a
    /// renamed column's drops target `<table>_<new>_{key,fk,check}`. A
    /// constraint created under the old name, such as `users_email_key`
    /// before `email` became `email_address`, is not matched by
    /// `DROP CONSTRAINT IF EXISTS` and stays in place. PostgreSQL keeps
    /// constraint names across `RENAME COLUMN`, so such constraints need a
    /// manual rename or drop.
    pub fn diff_field(
        &self,
        table: &str,
        old: &FieldDescriptor,
        new: &FieldDescriptor,
    ) -> Result<Vec<MigrationOperation>> {
        match (old.column_body(), new.column_body()) {
            (Some(_), None) if self.safe => {
                warn!(table, column = %old.name, "Safe mode: keeping column of virtual field");
                Ok(Vec::new())
            }
            (Some(_), None) => {
                debug!(table, column = %old.name, "Field is no longer persisted");
                Ok(vec![MigrationOperation::drop_column(table, &old.name)])
            }
            (None, Some(body)) => {
                debug!(table, column = %new.name, "Field is now persisted");
                Ok(vec![MigrationOperation::add_column(table, &new.name, body)])
            }
            (Some(old_body), Some(new_body)) => {
                self.diff_bodies(table, &new.name, old_body, new_body)
            }
            (None, None) => Ok(Vec::new()),
        }
    }

    /// Diffs two column bodies of the same column.
    ///
    /// Emits a type change first, then one group per clause in
    /// [`Clause::ALL`] order.
    pub fn diff_bodies(
        &self,
        table: &str,
        column: &str,
        old_body: &str,
        new_body: &str,
    ) -> Result<Vec<MigrationOperation>> {
        let col = ColumnRef::new(table, column);
        let mut operations: Vec<MigrationOperation> =
            emit::column_type(col, old_body, new_body).into_iter().collect();

        for clause in Clause::ALL {
            if let Some(transition) = self.transition(clause, old_body, new_body) {
                debug!(table, column, %clause, ?transition, "Clause changed");
                operations.extend(emit::emit_clause(clause, col, transition, new_body, self.matching)?);
            }
        }

        Ok(operations)
    }

    /// Classifies how `clause` changed, or `None` if it is absent from both.
    #[must_use]
    pub fn transition(&self, clause: Clause, old_body: &str, new_body: &str) -> Option<Transition> {
        let keyword = clause.keyword();
        match (
            self.matching.contains(old_body, keyword),
            self.matching.contains(new_body, keyword),
        ) {
            (false, false) => None,
            (false, true) => Some(Transition::Add),
            (true, false) => Some(Transition::Remove),
            (true, true) => Some(Transition::Update),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::ReferenceAction;
    use crate::operations::ForeignKeyReference;

    fn differ() -> ConstraintDiffer {
        ConstraintDiffer::default()
    }

    fn diff(old: &str, new: &str) -> Vec<MigrationOperation> {
        differ().diff_bodies("users", "something_id", old, new).unwrap()
    }

    #[test]
    fn test_transitions() {
        let d = differ();
        assert_eq!(d.transition(Clause::Unique, "int", "int"), None);
        assert_eq!(d.transition(Clause::Unique, "int", "int unique"), Some(Transition::Add));
        assert_eq!(d.transition(Clause::Unique, "int unique", "int"), Some(Transition::Remove));
        assert_eq!(
            d.transition(Clause::Unique, "int unique", "int not null unique"),
            Some(Transition::Update)
        );
    }

    #[test]
    fn test_transition_flags() {
        assert!(Transition::Update.drops_existing());
        assert!(Transition::Update.adds_new());
        assert!(!Transition::Add.drops_existing());
        assert!(!Transition::Remove.adds_new());
    }

    #[test]
    fn test_type_change_only() {
        assert_eq!(
            diff("int", "bigint"),
            vec![MigrationOperation::alter_column_type("users", "something_id", "bigint")]
        );
    }

    #[test]
    fn test_not_null_added_and_removed() {
        assert!(matches!(
            diff("int", "int not null").as_slice(),
            [MigrationOperation::SetNotNull { .. }]
        ));
        assert!(matches!(
            diff("int not null", "int").as_slice(),
            [MigrationOperation::DropNotNull { .. }]
        ));
        assert!(diff("int not null", "int not null").is_empty());
    }

    #[test]
    fn test_update_resynthesizes_reference_even_if_equal() {
        let ops = diff(
            "bigint not null references users(id)",
            "bigint references users(id)",
        );
        assert_eq!(ops.len(), 3);
        assert!(matches!(ops[0], MigrationOperation::DropNotNull { .. }));
        assert!(matches!(ops[1], MigrationOperation::DropForeignKey { .. }));
        assert!(matches!(ops[2], MigrationOperation::AddForeignKey { .. }));
    }

    #[test]
    fn test_clause_order_within_field() {
        let ops = diff(
            "int",
            "bigint check(something_id > 0) references something(id) on delete cascade unique default(1) not null",
        );
        assert_eq!(
            ops,
            vec![
                MigrationOperation::alter_column_type("users", "something_id", "bigint"),
                MigrationOperation::SetNotNull {
                    table: "users".to_string(),
                    column: "something_id".to_string(),
                },
                MigrationOperation::SetDefault {
                    table: "users".to_string(),
                    column: "something_id".to_string(),
                    expression: "1".to_string(),
                },
                MigrationOperation::AddUnique {
                    table: "users".to_string(),
                    column: "something_id".to_string(),
                },
                MigrationOperation::AddForeignKey {
                    table: "users".to_string(),
                    column: "something_id".to_string(),
                    reference: ForeignKeyReference::new("something", "id")
                        .on_delete(ReferenceAction::Cascade),
                },
                MigrationOperation::AddCheck {
                    table: "users".to_string(),
                    column: "something_id".to_string(),
                    expression: "(something_id > 0)".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_substring_matching_sees_keyword_in_default() {
        let ops = diff("text", "text default('not null')");
        assert!(ops.iter().any(|op| matches!(op, MigrationOperation::SetNotNull { .. })));

        let boundary = ConstraintDiffer::new(false, KeywordMatching::WordBoundary);
        let ops = boundary
            .diff_bodies("users", "note", "text", "text default('not null')")
            .unwrap();
        assert!(!ops.iter().any(|op| matches!(op, MigrationOperation::SetNotNull { .. })));
    }

    #[test]
    fn test_diff_field_virtualized_drops_old_name() {
        let old = FieldDescriptor::new("old_name", "field:text");
        let new = FieldDescriptor::virtual_field("new_name");

        let ops = differ().diff_field("users", &old, &new).unwrap();
        assert_eq!(ops, vec![MigrationOperation::drop_column("users", "old_name")]);

        let safe = ConstraintDiffer::new(true, KeywordMatching::Substring);
        assert!(safe.diff_field("users", &old, &new).unwrap().is_empty());
    }

    #[test]
    fn test_diff_field_persisted_adds_column() {
        let old = FieldDescriptor::virtual_field("token");
        let new = FieldDescriptor::new("token", "field:text default('bye')");

        let ops = differ().diff_field("users", &old, &new).unwrap();
        assert_eq!(
            ops,
            vec![MigrationOperation::add_column("users", "token", "text default('bye')")]
        );
    }

    #[test]
    fn test_diff_field_reference_error_propagates() {
        let old = FieldDescriptor::new("org_id", "field:int");
        let new = FieldDescriptor::new("org_id", "field:int references orgs(id) on update set cascade");

        assert!(differ().diff_field("users", &old, &new).is_err());
    }
}
