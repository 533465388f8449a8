//! Column default emitter.

use tracing::warn;

use super::ColumnRef;
use crate::differ::Transition;
use crate::grammar::KeywordMatching;
use crate::operations::MigrationOperation;

const DEFAULT_OPEN: &str = "default(";

/// Extracts the expression of the first `default(...)` token.
///
/// The expression runs from the opening parenthesis to the closing one
/// that ends the token. A token that does not end in `)`, or an empty
/// expression, yields `None`. Under [`KeywordMatching::WordBoundary`] the
/// token must start with `default(`.
#[must_use]
pub fn extract<'a>(tokens: &[&'a str], matching: KeywordMatching) -> Option<&'a str> {
    let rest = tokens.iter().find_map(|&token| {
        matching
            .find(token, DEFAULT_OPEN)
            .map(|start| &token[start + DEFAULT_OPEN.len()..])
    })?;
    rest.strip_suffix(')').filter(|expr| !expr.is_empty())
}

/// Emits default changes.
#[must_use]
pub fn emit(
    col: ColumnRef<'_>,
    transition: Transition,
    tokens: &[&str],
    matching: KeywordMatching,
) -> Vec<MigrationOperation> {
    match transition {
        Transition::Add | Transition::Update => match extract(tokens, matching) {
            Some(expression) => vec![MigrationOperation::SetDefault {
                table: col.table.to_string(),
                column: col.column.to_string(),
                expression: expression.to_string(),
            }],
            None => {
                warn!(
                    table = col.table,
                    column = col.column,
                    "Skipping malformed default expression"
                );
                Vec::new()
            }
        },
        Transition::Remove => vec![MigrationOperation::DropDefault {
            table: col.table.to_string(),
            column: col.column.to_string(),
        }],
    }
}
