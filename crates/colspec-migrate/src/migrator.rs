//! Migration orchestrator.
//!
//! Given the previous snapshot of a table (if any) and the current one,
//! the [`Migrator`] produces the ordered list of operations that brings the
//! database from the first to the second, along with the snapshot to keep
//! as the next baseline.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::classify::classify;
use crate::dialect::MigrationDialect;
use crate::differ::ConstraintDiffer;
use crate::error::Result;
use crate::grammar::KeywordMatching;
use crate::operations::{ColumnDefinition, MigrationOperation};
use crate::snapshot::{Describe, Snapshot};

/// Options for the migrator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigratorOptions {
    /// Never emit DROP COLUMN.
    pub safe: bool,
    /// How clause keywords are located in column bodies.
    pub keyword_matching: KeywordMatching,
}

impl MigratorOptions {
    /// Creates default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables safe mode.
    #[must_use]
    pub const fn safe(mut self) -> Self {
        self.safe = true;
        self
    }

    /// Sets the keyword matching strategy.
    #[must_use]
    pub const fn with_keyword_matching(mut self, matching: KeywordMatching) -> Self {
        self.keyword_matching = matching;
        self
    }
}

/// Output of a migration run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    /// Table the operations apply to.
    pub table: String,
    /// Operations, in the order they must run.
    pub operations: Vec<MigrationOperation>,
    /// The new snapshot, to persist as the next baseline.
    pub snapshot: Snapshot,
}

impl Migration {
    /// Returns true if there is nothing to apply.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Renders every operation with the given dialect.
    #[must_use]
    pub fn to_sql(&self, dialect: &impl MigrationDialect) -> Vec<String> {
        self.operations
            .iter()
            .map(|op| dialect.generate_sql(op))
            .collect()
    }
}

/// Computes migrations between table snapshots.
#[derive(Debug, Default)]
pub struct Migrator {
    options: MigratorOptions,
}

impl Migrator {
    /// Creates a migrator with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a migrator with custom options.
    #[must_use]
    pub const fn with_options(options: MigratorOptions) -> Self {
        Self { options }
    }

    /// Returns the options in use.
    #[must_use]
    pub const fn options(&self) -> &MigratorOptions {
        &self.options
    }

    /// Computes the migration from `old` to `new` for `table`.
    ///
    /// Without an old snapshot the result is a single CREATE TABLE listing
    /// the persisted fields of `new`. Otherwise operations are ordered as
    /// drops, renames, per-field constraint changes, then adds.
    ///
    /// # Errors
    ///
    /// Returns an error if a references clause cannot be parsed. No partial
    /// result is returned.
    pub fn migrate(&self, table: &str, old: Option<&Snapshot>, new: &Snapshot) -> Result<Migration> {
        let operations = match old {
            None => vec![Self::create_table(table, new)],
            Some(old) => self.diff(table, old, new)?,
        };
        debug!(table, operations = operations.len(), "Computed migration");

        Ok(Migration {
            table: table.to_string(),
            operations,
            snapshot: new.clone(),
        })
    }

    /// Migrates a described record type from `old` to its current snapshot.
    ///
    /// # Errors
    ///
    /// See [`Migrator::migrate`].
    pub fn migrate_described<T: Describe>(&self, old: Option<&Snapshot>) -> Result<Migration> {
        self.migrate(T::TABLE_NAME, old, &T::describe())
    }

    /// Builds the CREATE TABLE for a snapshot.
    #[must_use]
    pub fn create_table(table: &str, snapshot: &Snapshot) -> MigrationOperation {
        let columns = snapshot
            .columns()
            .map(|(name, body)| ColumnDefinition::new(name, body))
            .collect();
        MigrationOperation::create_table(table, columns)
    }

    fn diff(&self, table: &str, old: &Snapshot, new: &Snapshot) -> Result<Vec<MigrationOperation>> {
        let classification = classify(old, new);
        let differ = ConstraintDiffer::new(self.options.safe, self.options.keyword_matching);
        let mut operations = Vec::new();

        for (id, field) in &classification.removed {
            if !field.is_persisted() {
                continue;
            }
            if self.options.safe {
                warn!(table, field = id, column = %field.name, "Safe mode: not dropping column");
                continue;
            }
            operations.push(MigrationOperation::drop_column(table, &field.name));
        }

        for renamed in &classification.renamed {
            debug!(table, field = renamed.id, from = renamed.old_name, to = renamed.new_name, "Renaming column");
            operations.push(MigrationOperation::rename_column(
                table,
                renamed.old_name,
                renamed.new_name,
            ));
        }

        for changed in &classification.changed {
            debug!(table, field = changed.id, "Constraint spec changed");
            operations.extend(differ.diff_field(table, changed.old, changed.new)?);
        }

        for (id, field) in &classification.added {
            if let Some(body) = field.column_body() {
                debug!(table, field = id, "Adding column");
                operations.push(MigrationOperation::add_column(table, &field.name, body));
            }
        }

        Ok(operations)
    }
}
