//! Integration tests for `#[derive(Describe)]`.

use colspec_derive::Describe;
use colspec_migrate::prelude::*;

#[allow(dead_code)]
#[derive(Describe)]
struct BillingAccount {
    #[column(spec = "field:bigserial primary key")]
    id: i64,
    #[column(name = "owner", spec = "field:bigint not null references users(id)")]
    owner_id: i64,
    #[column]
    cached_total: Option<i64>,
    #[column(spec = "field:text")]
    r#type: String,
}

#[allow(dead_code)]
#[derive(Describe)]
#[table(name = "billing.ledgers")]
struct Ledger<T> {
    #[column(spec = "field:jsonb")]
    entries: Vec<T>,
}

#[test]
fn test_default_table_name() {
    assert_eq!(BillingAccount::TABLE_NAME, "billing_account");
    assert_eq!(<Ledger<u8> as Describe>::TABLE_NAME, "billing.ledgers");
}

#[test]
fn test_described_fields() {
    let snapshot = BillingAccount::describe();
    let fields: Vec<_> = snapshot.iter().collect();

    assert_eq!(
        fields,
        vec![
            ("id", &FieldDescriptor::new("id", "field:bigserial primary key")),
            (
                "owner_id",
                &FieldDescriptor::new("owner", "field:bigint not null references users(id)")
            ),
            ("cached_total", &FieldDescriptor::virtual_field("cached_total")),
            ("type", &FieldDescriptor::new("type", "field:text")),
        ]
    );
}

#[test]
fn test_generic_struct() {
    let migration = Migrator::new().migrate_described::<Ledger<String>>(None).unwrap();
    assert_eq!(
        migration.to_sql(&PostgresDialect::new()),
        vec!["CREATE TABLE IF NOT EXISTS \"billing\".\"ledgers\" (\n  \"entries\" jsonb\n)"]
    );
}
