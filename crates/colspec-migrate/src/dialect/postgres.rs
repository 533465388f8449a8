//! PostgreSQL dialect for migrations.

use super::MigrationDialect;
use crate::operations::{
    CHECK_SUFFIX, ColumnDefinition, FOREIGN_KEY_SUFFIX, ForeignKeyReference, MigrationOperation,
    UNIQUE_SUFFIX, constraint_name, primary_key_name,
};

/// PostgreSQL dialect for migration SQL generation.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresDialect;

impl PostgresDialect {
    /// Creates a new PostgreSQL dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn column_definition(&self, column: &ColumnDefinition) -> String {
        format!(
            "{} {}",
            self.quote_identifier(&column.name),
            column.definition
        )
    }

    fn alter_table(&self, table: &str) -> String {
        format!("ALTER TABLE {}", self.quote_table(table))
    }

    fn alter_column(&self, table: &str, column: &str) -> String {
        format!(
            "{} ALTER COLUMN {}",
            self.alter_table(table),
            self.quote_identifier(column)
        )
    }

    fn drop_constraint(&self, table: &str, name: &str) -> String {
        format!(
            "{} DROP CONSTRAINT IF EXISTS {}",
            self.alter_table(table),
            self.quote_identifier(name)
        )
    }

    fn add_foreign_key(&self, table: &str, column: &str, reference: &ForeignKeyReference) -> String {
        format!(
            "{} ADD CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({}) ON UPDATE {} ON DELETE {}",
            self.alter_table(table),
            self.quote_identifier(&constraint_name(table, column, FOREIGN_KEY_SUFFIX)),
            self.quote_identifier(column),
            self.quote_table(&reference.table),
            self.quote_identifier(&reference.column),
            reference.on_update.to_sql(),
            reference.on_delete.to_sql()
        )
    }
}

impl MigrationDialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgresql"
    }

    fn generate_sql(&self, operation: &MigrationOperation) -> String {
        match operation {
            MigrationOperation::CreateTable {
                table,
                columns,
                if_not_exists,
            } => {
                let mut sql = String::from("CREATE TABLE ");
                if *if_not_exists {
                    sql.push_str("IF NOT EXISTS ");
                }
                sql.push_str(&self.quote_table(table));
                sql.push_str(" (\n  ");
                let col_defs: Vec<String> =
                    columns.iter().map(|c| self.column_definition(c)).collect();
                sql.push_str(&col_defs.join(",\n  "));
                sql.push_str("\n)");
                sql
            }

            MigrationOperation::DropColumn { table, column } => format!(
                "{} DROP COLUMN {}",
                self.alter_table(table),
                self.quote_identifier(column)
            ),

            MigrationOperation::AddColumn { table, column } => format!(
                "{} ADD COLUMN {}",
                self.alter_table(table),
                self.column_definition(column)
            ),

            MigrationOperation::RenameColumn {
                table,
                old_name,
                new_name,
            } => format!(
                "{} RENAME COLUMN {} TO {}",
                self.alter_table(table),
                self.quote_identifier(old_name),
                self.quote_identifier(new_name)
            ),

            MigrationOperation::AlterColumnType {
                table,
                column,
                data_type,
            } => format!(
                "{} TYPE {data_type} USING {}::{data_type}",
                self.alter_column(table, column),
                self.quote_identifier(column)
            ),

            MigrationOperation::SetNotNull { table, column } => {
                format!("{} SET NOT NULL", self.alter_column(table, column))
            }

            MigrationOperation::DropNotNull { table, column } => {
                format!("{} DROP NOT NULL", self.alter_column(table, column))
            }

            MigrationOperation::SetDefault {
                table,
                column,
                expression,
            } => format!("{} SET DEFAULT {expression}", self.alter_column(table, column)),

            MigrationOperation::DropDefault { table, column } => {
                format!("{} DROP DEFAULT", self.alter_column(table, column))
            }

            MigrationOperation::AddPrimaryKey { table, column } => format!(
                "{} ADD PRIMARY KEY ({})",
                self.alter_table(table),
                self.quote_identifier(column)
            ),

            MigrationOperation::DropPrimaryKey { table } => {
                self.drop_constraint(table, &primary_key_name(table))
            }

            MigrationOperation::AddUnique { table, column } => format!(
                "{} ADD CONSTRAINT {} UNIQUE ({})",
                self.alter_table(table),
                self.quote_identifier(&constraint_name(table, column, UNIQUE_SUFFIX)),
                self.quote_identifier(column)
            ),

            MigrationOperation::DropUnique { table, column } => {
                self.drop_constraint(table, &constraint_name(table, column, UNIQUE_SUFFIX))
            }

            MigrationOperation::AddForeignKey {
                table,
                column,
                reference,
            } => self.add_foreign_key(table, column, reference),

            MigrationOperation::DropForeignKey { table, column } => {
                self.drop_constraint(table, &constraint_name(table, column, FOREIGN_KEY_SUFFIX))
            }

            MigrationOperation::AddCheck {
                table,
                column,
                expression,
            } => format!(
                "{} ADD CONSTRAINT {} CHECK {expression}",
                self.alter_table(table),
                self.quote_identifier(&constraint_name(table, column, CHECK_SUFFIX))
            ),

            MigrationOperation::DropCheck { table, column } => {
                self.drop_constraint(table, &constraint_name(table, column, CHECK_SUFFIX))
            }
        }
    }
}
