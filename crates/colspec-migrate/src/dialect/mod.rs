//! Database dialect implementations.
//!
//! Each dialect knows how to render migration operations as SQL for its
//! database system.

mod postgres;

pub use postgres::PostgresDialect;

use crate::operations::MigrationOperation;

/// Trait for database-specific SQL generation.
pub trait MigrationDialect: Send + Sync {
    /// Returns the dialect name.
    fn name(&self) -> &'static str;

    /// Generates the SQL statement for a migration operation.
    fn generate_sql(&self, operation: &MigrationOperation) -> String;

    /// Quote an identifier (column name, constraint name, etc.).
    fn quote_identifier(&self, name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    /// Quote a possibly schema-qualified table name, segment by segment.
    fn quote_table(&self, name: &str) -> String {
        name.split('.')
            .map(|segment| self.quote_identifier(segment))
            .collect::<Vec<_>>()
            .join(".")
    }
}
