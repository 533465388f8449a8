//! Column-spec driven PostgreSQL migrations.
//!
//! `colspec-migrate` compares two snapshots of a table, each field carrying
//! a small constraint spec such as `field:bigint not null unique`, and
//! produces the DDL that turns the old table into the new one.
//!
//! # Architecture
//!
//! - **Snapshot** - Field identifiers mapped to external names and specs
//! - **Classifier** - Joins snapshots on identifier: renamed, removed, added, changed
//! - **Differ** - Compares two specs of one field clause by clause
//! - **Emitters** - One per constraint kind, producing operations
//! - **Migrator** - Orders everything into a single migration
//! - **Dialect** - Renders operations as SQL
//!
//! # Example
//!
//! ```rust
//! use colspec_migrate::prelude::*;
//!
//! let old = Snapshot::new()
//!     .with_field("ID", FieldDescriptor::new("id", "field:bigserial primary key"))
//!     .with_field("Email", FieldDescriptor::new("email", "field:text"));
//! let new = Snapshot::new()
//!     .with_field("ID", FieldDescriptor::new("id", "field:bigserial primary key"))
//!     .with_field("Email", FieldDescriptor::new("email", "field:text not null unique"));
//!
//! let migration = Migrator::new().migrate("users", Some(&old), &new)?;
//! let sql = migration.to_sql(&PostgresDialect::new());
//!
//! assert_eq!(
//!     sql,
//!     vec![
//!         r#"ALTER TABLE "users" ALTER COLUMN "email" SET NOT NULL"#,
//!         r#"ALTER TABLE "users" ADD CONSTRAINT "users_email_key" UNIQUE ("email")"#,
//!     ]
//! );
//! # Ok::<(), colspec_migrate::error::MigrateError>(())
//! ```
//!
//! # CLI Usage
//!
//! ```bash
//! # First migration: CREATE TABLE
//! colspec-migrate diff --table users --new users.json --baseline-out users.json
//!
//! # Later migrations against the stored baseline
//! colspec-migrate diff --table users --old users.json --new current.json
//! ```

pub mod classify;
pub mod dialect;
pub mod differ;
pub mod emit;
pub mod error;
pub mod grammar;
pub mod migrator;
pub mod operations;
pub mod snapshot;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::dialect::{MigrationDialect, PostgresDialect};
    pub use crate::error::{MigrateError, Result};
    pub use crate::grammar::{KeywordMatching, ReferenceAction};
    pub use crate::migrator::{Migration, Migrator, MigratorOptions};
    pub use crate::operations::{ColumnDefinition, ForeignKeyReference, MigrationOperation};
    pub use crate::snapshot::{Describe, FieldDescriptor, Snapshot};
}
