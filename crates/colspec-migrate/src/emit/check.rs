//! Check constraint emitter.

use tracing::debug;

use super::ColumnRef;
use crate::differ::Transition;
use crate::grammar::KeywordMatching;
use crate::operations::MigrationOperation;

const CHECK_OPEN: &str = "check(";

/// Extracts the parenthesized expression following `check`.
///
/// `check(` is located with the same matching the differ used to detect
/// the clause. The returned slice includes the outer parentheses and ends
/// at the parenthesis that balances the opening one, so nested groups and
/// spaces are kept intact. Returns `None` when there is no `check(` or the
/// parentheses never balance.
#[must_use]
pub fn extract(body: &str, matching: KeywordMatching) -> Option<&str> {
    let start = matching.find(body, CHECK_OPEN)? + CHECK_OPEN.len() - 1;
    let mut depth = 0usize;
    for (offset, c) in body[start..].char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&body[start..=start + offset]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Emits check constraint changes. An update drops before it adds.
#[must_use]
pub fn emit(
    col: ColumnRef<'_>,
    transition: Transition,
    body: &str,
    matching: KeywordMatching,
) -> Vec<MigrationOperation> {
    let mut operations = Vec::new();
    if transition.drops_existing() {
        operations.push(MigrationOperation::DropCheck {
            table: col.table.to_string(),
            column: col.column.to_string(),
        });
    }
    if transition.adds_new() {
        match extract(body, matching) {
            Some(expression) => operations.push(MigrationOperation::AddCheck {
                table: col.table.to_string(),
                column: col.column.to_string(),
                expression: expression.to_string(),
            }),
            None => debug!(
                table = col.table,
                column = col.column,
                "Check expression is not balanced, skipping"
            ),
        }
    }
    operations
}

#[cfg(test)]
mod tests {
    use super::*;

    const COL: ColumnRef<'static> = ColumnRef::new("accounts", "balance");
    const SUBSTRING: KeywordMatching = KeywordMatching::Substring;

    #[test]
    fn test_extract_simple() {
        assert_eq!(extract("int check(balance >= 0)", SUBSTRING), Some("(balance >= 0)"));
    }

    #[test]
    fn test_extract_nested() {
        assert_eq!(
            extract("int not null check(a = 1 or (b = 2 and c = 3)) unique", SUBSTRING),
            Some("(a = 1 or (b = 2 and c = 3))")
        );
    }

    #[test]
    fn test_extract_unbalanced() {
        assert_eq!(extract("int check(a = 1 or (b = 2)", SUBSTRING), None);
        assert_eq!(extract("int check(", SUBSTRING), None);
        assert_eq!(extract("int not null", SUBSTRING), None);
    }

    #[test]
    fn test_extract_word_boundary_skips_embedded_check() {
        let body = "int mycheck(x) check(y > 0)";
        assert_eq!(extract(body, SUBSTRING), Some("(x)"));
        assert_eq!(extract(body, KeywordMatching::WordBoundary), Some("(y > 0)"));
        assert_eq!(extract("int mycheck(x)", KeywordMatching::WordBoundary), None);
    }

    #[test]
    fn test_emit_add() {
        let ops = emit(COL, Transition::Add, "numeric check(balance >= 0)", SUBSTRING);
        assert_eq!(
            ops,
            vec![MigrationOperation::AddCheck {
                table: "accounts".to_string(),
                column: "balance".to_string(),
                expression: "(balance >= 0)".to_string(),
            }]
        );
    }

    #[test]
    fn test_emit_update_drops_then_adds() {
        let ops = emit(COL, Transition::Update, "numeric check(balance > 0)", SUBSTRING);
        assert!(matches!(
            ops.as_slice(),
            [MigrationOperation::DropCheck { .. }, MigrationOperation::AddCheck { .. }]
        ));
    }

    #[test]
    fn test_emit_truncated_expression_adds_nothing() {
        assert!(emit(COL, Transition::Add, "numeric check(balance > 0", SUBSTRING).is_empty());

        let ops = emit(COL, Transition::Update, "numeric check(balance > 0", SUBSTRING);
        assert!(matches!(ops.as_slice(), [MigrationOperation::DropCheck { .. }]));
    }

    #[test]
    fn test_emit_remove() {
        let ops = emit(COL, Transition::Remove, "numeric", SUBSTRING);
        assert!(matches!(ops.as_slice(), [MigrationOperation::DropCheck { .. }]));
    }
}
