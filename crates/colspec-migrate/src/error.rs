//! Error types for the migration engine.

use crate::grammar::ReferenceTrigger;

/// Errors that can occur while computing a migration.
#[derive(Debug, thiserror::Error)]
pub enum MigrateError {
    /// The supplied snapshot is not a mapping of field identifiers.
    #[error("Invalid input: expected an object of field descriptors, got {found}")]
    InvalidInput {
        /// Kind of value that was supplied instead.
        found: &'static str,
    },

    /// A references clause names an action outside the closed vocabulary.
    #[error(
        "Syntax error in references clause for table '{table}' column '{column}': \
         unknown '{trigger}' action '{token}', expected one of \
         (restrict, cascade, no action, set null, set default)"
    )]
    UnknownReferenceAction {
        /// Table being migrated.
        table: String,
        /// Column carrying the clause.
        column: String,
        /// Whether the action belongs to `on update` or `on delete`.
        trigger: ReferenceTrigger,
        /// The offending token.
        token: String,
    },

    /// `set` in a references clause is not followed by `null` or `default`.
    #[error(
        "Syntax error in references clause for table '{table}' column '{column}': \
         expected '{trigger} set null' or '{trigger} set default', got 'set {token}'"
    )]
    InvalidSetAction {
        /// Table being migrated.
        table: String,
        /// Column carrying the clause.
        column: String,
        /// Whether the action belongs to `on update` or `on delete`.
        trigger: ReferenceTrigger,
        /// The token found after `set`.
        token: String,
    },

    /// A references clause lacks its target table or column.
    #[error("Missing reference table or column in references clause for table '{table}' column '{column}'")]
    IncompleteReference {
        /// Table being migrated.
        table: String,
        /// Column carrying the clause.
        column: String,
    },

    /// A references clause names several target columns for one column.
    #[error(
        "Composite reference '{target}' in references clause for table '{table}' column '{column}': \
         a column can reference exactly one column"
    )]
    CompositeReference {
        /// Table being migrated.
        table: String,
        /// Column carrying the clause.
        column: String,
        /// The referenced table and columns as written.
        target: String,
    },

    /// IO error (reading/writing baseline snapshots).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for migration operations.
pub type Result<T> = std::result::Result<T, MigrateError>;
