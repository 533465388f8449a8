//! Per-constraint statement emitters.
//!
//! Each emitter turns one clause transition into migration operations and
//! knows nothing about the other clauses. Only the references emitter can
//! fail; malformed defaults and checks are skipped.

pub mod check;
pub mod default;
pub mod references;

use crate::differ::Transition;
use crate::error::Result;
use crate::grammar::{Clause, KeywordMatching};
use crate::operations::MigrationOperation;

/// The column an emitter writes statements for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnRef<'a> {
    /// Table name.
    pub table: &'a str,
    /// Resolved column name.
    pub column: &'a str,
}

impl<'a> ColumnRef<'a> {
    /// Creates a new column reference.
    #[must_use]
    pub const fn new(table: &'a str, column: &'a str) -> Self {
        Self { table, column }
    }

    fn table(&self) -> String {
        self.table.to_string()
    }

    fn column(&self) -> String {
        self.column.to_string()
    }
}

/// Returns the declared type of a column body: its first token.
#[must_use]
pub fn declared_type(body: &str) -> &str {
    body.split(' ').next().unwrap_or_default()
}

/// Emits a type change when the declared types differ.
#[must_use]
pub fn column_type(col: ColumnRef<'_>, old_body: &str, new_body: &str) -> Option<MigrationOperation> {
    let new_type = declared_type(new_body);
    (declared_type(old_body) != new_type)
        .then(|| MigrationOperation::alter_column_type(col.table, col.column, new_type))
}

/// Emits NOT NULL changes.
#[must_use]
pub fn not_null(col: ColumnRef<'_>, transition: Transition) -> Vec<MigrationOperation> {
    match transition {
        Transition::Add => vec![MigrationOperation::SetNotNull {
            table: col.table(),
            column: col.column(),
        }],
        Transition::Remove => vec![MigrationOperation::DropNotNull {
            table: col.table(),
            column: col.column(),
        }],
        Transition::Update => Vec::new(),
    }
}

/// Emits primary key changes.
#[must_use]
pub fn primary_key(col: ColumnRef<'_>, transition: Transition) -> Vec<MigrationOperation> {
    match transition {
        Transition::Add => vec![MigrationOperation::AddPrimaryKey {
            table: col.table(),
            column: col.column(),
        }],
        Transition::Remove => vec![MigrationOperation::DropPrimaryKey { table: col.table() }],
        Transition::Update => Vec::new(),
    }
}

/// Emits unique constraint changes. An update drops before it adds.
#[must_use]
pub fn unique(col: ColumnRef<'_>, transition: Transition) -> Vec<MigrationOperation> {
    let mut operations = Vec::new();
    if transition.drops_existing() {
        operations.push(MigrationOperation::DropUnique {
            table: col.table(),
            column: col.column(),
        });
    }
    if transition.adds_new() {
        operations.push(MigrationOperation::AddUnique {
            table: col.table(),
            column: col.column(),
        });
    }
    operations
}

/// Dispatches a clause transition to its emitter.
///
/// `new_body` is the column body after the change; emitters that need the
/// clause argument read it from there, locating it with `matching`.
pub fn emit_clause(
    clause: Clause,
    col: ColumnRef<'_>,
    transition: Transition,
    new_body: &str,
    matching: KeywordMatching,
) -> Result<Vec<MigrationOperation>> {
    let operations = match clause {
        Clause::NotNull => not_null(col, transition),
        Clause::PrimaryKey => primary_key(col, transition),
        Clause::Unique => unique(col, transition),
        Clause::Default => default::emit(col, transition, &tokens(new_body), matching),
        Clause::References => references::emit(col, transition, &tokens(new_body))?,
        Clause::Check => check::emit(col, transition, new_body, matching),
    };
    Ok(operations)
}

/// Splits a column body on single spaces.
#[must_use]
pub fn tokens(body: &str) -> Vec<&str> {
    body.split(' ').collect()
}
