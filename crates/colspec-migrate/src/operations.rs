//! Migration operations.
//!
//! This module defines every schema change the engine can emit. Operations
//! are plain data; a [`MigrationDialect`](crate::dialect::MigrationDialect)
//! turns them into SQL text.

use serde::{Deserialize, Serialize};

use crate::grammar::ReferenceAction;

/// Suffix of the primary key constraint name (`<table>_pk`).
pub const PRIMARY_KEY_SUFFIX: &str = "pk";
/// Suffix of unique constraint names (`<table>_<column>_key`).
pub const UNIQUE_SUFFIX: &str = "key";
/// Suffix of foreign key constraint names (`<table>_<column>_fk`).
pub const FOREIGN_KEY_SUFFIX: &str = "fk";
/// Suffix of check constraint names (`<table>_<column>_check`).
pub const CHECK_SUFFIX: &str = "check";

/// Returns the table name without any schema qualifier.
#[must_use]
pub fn unqualified(table: &str) -> &str {
    table.rsplit('.').next().unwrap_or(table)
}

/// Builds the conventional name of a per-column constraint.
#[must_use]
pub fn constraint_name(table: &str, column: &str, suffix: &str) -> String {
    format!("{}_{column}_{suffix}", unqualified(table))
}

/// Builds the conventional name of the table's primary key constraint.
#[must_use]
pub fn primary_key_name(table: &str) -> String {
    format!("{}_{PRIMARY_KEY_SUFFIX}", unqualified(table))
}

/// A column as written in a CREATE TABLE or ADD COLUMN statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    /// Column name.
    pub name: String,
    /// Type and clauses, verbatim from the column body.
    pub definition: String,
}

impl ColumnDefinition {
    /// Creates a new column definition.
    #[must_use]
    pub fn new(name: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            definition: definition.into(),
        }
    }
}

/// Target of a foreign key constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyReference {
    /// Referenced table.
    pub table: String,
    /// Referenced column.
    pub column: String,
    /// ON UPDATE action.
    pub on_update: ReferenceAction,
    /// ON DELETE action.
    pub on_delete: ReferenceAction,
}

impl ForeignKeyReference {
    /// Creates a reference with `NO ACTION` for both events.
    #[must_use]
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
            on_update: ReferenceAction::NoAction,
            on_delete: ReferenceAction::NoAction,
        }
    }

    /// Sets the ON UPDATE action.
    #[must_use]
    pub fn on_update(mut self, action: ReferenceAction) -> Self {
        self.on_update = action;
        self
    }

    /// Sets the ON DELETE action.
    #[must_use]
    pub fn on_delete(mut self, action: ReferenceAction) -> Self {
        self.on_delete = action;
        self
    }
}

/// A single migration operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MigrationOperation {
    /// Create the table from scratch.
    CreateTable {
        /// Table name.
        table: String,
        /// Column definitions in declaration order.
        columns: Vec<ColumnDefinition>,
        /// Whether to use IF NOT EXISTS.
        if_not_exists: bool,
    },

    /// Drop a column.
    DropColumn {
        /// Table name.
        table: String,
        /// Column name.
        column: String,
    },

    /// Add a column.
    AddColumn {
        /// Table name.
        table: String,
        /// Column definition.
        column: ColumnDefinition,
    },

    /// Rename a column.
    RenameColumn {
        /// Table name.
        table: String,
        /// Old column name.
        old_name: String,
        /// New column name.
        new_name: String,
    },

    /// Change a column's type, casting existing values.
    AlterColumnType {
        /// Table name.
        table: String,
        /// Column name.
        column: String,
        /// New type, verbatim from the column body.
        data_type: String,
    },

    /// Add NOT NULL.
    SetNotNull {
        /// Table name.
        table: String,
        /// Column name.
        column: String,
    },

    /// Remove NOT NULL.
    DropNotNull {
        /// Table name.
        table: String,
        /// Column name.
        column: String,
    },

    /// Set the column default.
    SetDefault {
        /// Table name.
        table: String,
        /// Column name.
        column: String,
        /// Raw SQL default expression.
        expression: String,
    },

    /// Remove the column default.
    DropDefault {
        /// Table name.
        table: String,
        /// Column name.
        column: String,
    },

    /// Make the column the table's primary key.
    AddPrimaryKey {
        /// Table name.
        table: String,
        /// Column name.
        column: String,
    },

    /// Drop the table's primary key constraint.
    DropPrimaryKey {
        /// Table name.
        table: String,
    },

    /// Add a unique constraint on the column.
    AddUnique {
        /// Table name.
        table: String,
        /// Column name.
        column: String,
    },

    /// Drop the column's unique constraint.
    DropUnique {
        /// Table name.
        table: String,
        /// Column name.
        column: String,
    },

    /// Add a foreign key constraint on the column.
    AddForeignKey {
        /// Table name.
        table: String,
        /// Column name.
        column: String,
        /// Referenced table, column, and actions.
        reference: ForeignKeyReference,
    },

    /// Drop the column's foreign key constraint.
    DropForeignKey {
        /// Table name.
        table: String,
        /// Column name.
        column: String,
    },

    /// Add a check constraint on the column.
    AddCheck {
        /// Table name.
        table: String,
        /// Column name.
        column: String,
        /// Check expression including its outer parentheses.
        expression: String,
    },

    /// Drop the column's check constraint.
    DropCheck {
        /// Table name.
        table: String,
        /// Column name.
        column: String,
    },
}

impl MigrationOperation {
    // Convenience constructors

    /// Creates a CreateTable operation.
    #[must_use]
    pub fn create_table(table: impl Into<String>, columns: Vec<ColumnDefinition>) -> Self {
        Self::CreateTable {
            table: table.into(),
            columns,
            if_not_exists: true,
        }
    }

    /// Creates a DropColumn operation.
    #[must_use]
    pub fn drop_column(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::DropColumn {
            table: table.into(),
            column: column.into(),
        }
    }

    /// Creates an AddColumn operation.
    #[must_use]
    pub fn add_column(
        table: impl Into<String>,
        column: impl Into<String>,
        definition: impl Into<String>,
    ) -> Self {
        Self::AddColumn {
            table: table.into(),
            column: ColumnDefinition::new(column, definition),
        }
    }

    /// Creates a RenameColumn operation.
    #[must_use]
    pub fn rename_column(
        table: impl Into<String>,
        old_name: impl Into<String>,
        new_name: impl Into<String>,
    ) -> Self {
        Self::RenameColumn {
            table: table.into(),
            old_name: old_name.into(),
            new_name: new_name.into(),
        }
    }

    /// Creates an AlterColumnType operation.
    #[must_use]
    pub fn alter_column_type(
        table: impl Into<String>,
        column: impl Into<String>,
        data_type: impl Into<String>,
    ) -> Self {
        Self::AlterColumnType {
            table: table.into(),
            column: column.into(),
            data_type: data_type.into(),
        }
    }

    /// Returns the table this operation applies to.
    #[must_use]
    pub fn table(&self) -> &str {
        match self {
            Self::CreateTable { table, .. }
            | Self::DropColumn { table, .. }
            | Self::AddColumn { table, .. }
            | Self::RenameColumn { table, .. }
            | Self::AlterColumnType { table, .. }
            | Self::SetNotNull { table, .. }
            | Self::DropNotNull { table, .. }
            | Self::SetDefault { table, .. }
            | Self::DropDefault { table, .. }
            | Self::AddPrimaryKey { table, .. }
            | Self::DropPrimaryKey { table }
            | Self::AddUnique { table, .. }
            | Self::DropUnique { table, .. }
            | Self::AddForeignKey { table, .. }
            | Self::DropForeignKey { table, .. }
            | Self::AddCheck { table, .. }
            | Self::DropCheck { table, .. } => table,
        }
    }

    /// Returns true if applying this operation can lose data.
    #[must_use]
    pub fn is_destructive(&self) -> bool {
        matches!(self, Self::DropColumn { .. })
    }

    /// Returns a human-readable description of this operation.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::CreateTable { table, columns, .. } => {
                format!("Create table '{table}' with {} column(s)", columns.len())
            }
            Self::DropColumn { table, column } => {
                format!("Drop column '{column}' from table '{table}'")
            }
            Self::AddColumn { table, column } => {
                format!("Add column '{}' to table '{table}'", column.name)
            }
            Self::RenameColumn {
                table,
                old_name,
                new_name,
            } => format!("Rename column '{old_name}' to '{new_name}' in table '{table}'"),
            Self::AlterColumnType {
                table,
                column,
                data_type,
            } => format!("Change type of '{table}.{column}' to {data_type}"),
            Self::SetNotNull { table, column } => format!("Set '{table}.{column}' NOT NULL"),
            Self::DropNotNull { table, column } => format!("Drop NOT NULL on '{table}.{column}'"),
            Self::SetDefault {
                table,
                column,
                expression,
            } => format!("Set default of '{table}.{column}' to {expression}"),
            Self::DropDefault { table, column } => format!("Drop default of '{table}.{column}'"),
            Self::AddPrimaryKey { table, column } => {
                format!("Add primary key on '{table}.{column}'")
            }
            Self::DropPrimaryKey { table } => {
                format!("Drop primary key '{}'", primary_key_name(table))
            }
            Self::AddUnique { table, column } => format!(
                "Add unique constraint '{}'",
                constraint_name(table, column, UNIQUE_SUFFIX)
            ),
            Self::DropUnique { table, column } => format!(
                "Drop unique constraint '{}'",
                constraint_name(table, column, UNIQUE_SUFFIX)
            ),
            Self::AddForeignKey {
                table,
                column,
                reference,
            } => format!(
                "Add foreign key '{}' referencing '{}'",
                constraint_name(table, column, FOREIGN_KEY_SUFFIX),
                reference.table
            ),
            Self::DropForeignKey { table, column } => format!(
                "Drop foreign key '{}'",
                constraint_name(table, column, FOREIGN_KEY_SUFFIX)
            ),
            Self::AddCheck { table, column, .. } => format!(
                "Add check constraint '{}'",
                constraint_name(table, column, CHECK_SUFFIX)
            ),
            Self::DropCheck { table, column } => format!(
                "Drop check constraint '{}'",
                constraint_name(table, column, CHECK_SUFFIX)
            ),
        }
    }
}
