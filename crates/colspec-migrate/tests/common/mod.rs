#![allow(dead_code)]

use colspec_migrate::prelude::*;

pub fn migrate(table: &str, old: Option<&Snapshot>, new: &Snapshot) -> Migration {
    Migrator::new()
        .migrate(table, old, new)
        .unwrap_or_else(|e| panic!("Failed to migrate {table}: {e}"))
}

pub fn migrate_err(table: &str, old: &Snapshot, new: &Snapshot) -> MigrateError {
    Migrator::new()
        .migrate(table, Some(old), new)
        .expect_err(&format!("Expected migration error for {table}"))
}

pub fn sql(migration: &Migration) -> Vec<String> {
    migration.to_sql(&PostgresDialect::new())
}

pub fn described<T: Describe>(old: Option<&Snapshot>) -> Vec<String> {
    let migration = Migrator::new()
        .migrate_described::<T>(old)
        .unwrap_or_else(|e| panic!("Failed to migrate {}: {e}", T::TABLE_NAME));
    sql(&migration)
}

pub fn field(name: &str, spec: &str) -> FieldDescriptor {
    FieldDescriptor::new(name, spec)
}
