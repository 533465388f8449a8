//! Foreign key emitter and references clause parser.
//!
//! The clause grammar is
//!
//! ```text
//! references <table>(<column>[,<column>]*) [on update <action>] [on delete <action>]
//! <action> = restrict | cascade | no action | set null | set default
//! ```
//!
//! Parsing is a small state machine over the space-separated tokens of the
//! column body. Tokens before `references` and unrelated tokens after the
//! target (other clauses) are skipped.

use tracing::debug;

use super::ColumnRef;
use crate::differ::Transition;
use crate::error::{MigrateError, Result};
use crate::grammar::{ReferenceAction, ReferenceTrigger};
use crate::operations::{ForeignKeyReference, MigrationOperation};

/// Result of scanning a body for a references clause.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReferenceClause {
    /// Referenced table and columns, if the target was complete.
    pub target: Option<(String, Vec<String>)>,
    /// ON UPDATE action.
    pub on_update: ReferenceAction,
    /// ON DELETE action.
    pub on_delete: ReferenceAction,
}

impl ReferenceClause {
    /// Converts into the foreign key reference of `col`.
    ///
    /// A missing target is an [`MigrateError::IncompleteReference`]. A
    /// target listing several columns cannot be referenced from a single
    /// column and is a [`MigrateError::CompositeReference`].
    pub fn into_reference(self, col: ColumnRef<'_>) -> Result<ForeignKeyReference> {
        let Some((table, mut columns)) = self.target else {
            return Err(MigrateError::IncompleteReference {
                table: col.table.to_string(),
                column: col.column.to_string(),
            });
        };
        if columns.len() != 1 {
            return Err(MigrateError::CompositeReference {
                table: col.table.to_string(),
                column: col.column.to_string(),
                target: format!("{table}({})", columns.join(", ")),
            });
        }
        let column = columns.remove(0);
        Ok(ForeignKeyReference::new(table, column)
            .on_update(self.on_update)
            .on_delete(self.on_delete))
    }
}

#[derive(Debug)]
enum State {
    /// Looking for the `references` keyword.
    Seeking,
    /// Collecting `table(column)`, possibly spread over several tokens.
    Target(String),
    /// Target parsed; looking for `on`.
    AfterTarget,
    /// Saw `on`; expecting `update` or `delete`.
    On,
    /// Expecting an action word.
    Action(ReferenceTrigger),
    /// Saw `set`; expecting `null` or `default`.
    Set(ReferenceTrigger),
    /// Saw `no`; expecting `action`.
    No(ReferenceTrigger),
    /// Target was malformed; nothing more to read.
    Done,
}

/// Parses the references clause out of a tokenized column body.
///
/// An unknown action, or `set`/`no` followed by the wrong word, is a
/// syntax error. A missing or malformed target is not an error here; it
/// leaves [`ReferenceClause::target`] empty.
pub fn parse(col: ColumnRef<'_>, tokens: &[&str]) -> Result<ReferenceClause> {
    let mut clause = ReferenceClause::default();
    let mut state = State::Seeking;

    for &token in tokens {
        state = match state {
            State::Seeking if token == "references" => State::Target(String::new()),
            State::Seeking => State::Seeking,

            State::Target(mut buffer) => {
                // `users (id)` is accepted, `users id` is not.
                if !buffer.is_empty() && !buffer.contains('(') && !token.starts_with('(') {
                    State::Done
                } else {
                    if !buffer.is_empty() {
                        buffer.push(' ');
                    }
                    buffer.push_str(token);
                    if buffer.contains(')') {
                        clause.target = parse_target(&buffer);
                        if clause.target.is_some() {
                            State::AfterTarget
                        } else {
                            State::Done
                        }
                    } else {
                        State::Target(buffer)
                    }
                }
            }

            State::AfterTarget | State::On if token == "on" => State::On,
            State::AfterTarget => State::AfterTarget,
            State::On => match token {
                "update" => State::Action(ReferenceTrigger::Update),
                "delete" => State::Action(ReferenceTrigger::Delete),
                _ => State::AfterTarget,
            },

            State::Action(trigger) => match token {
                "set" => State::Set(trigger),
                "no" => State::No(trigger),
                word => match ReferenceAction::from_word(word) {
                    Some(action) => {
                        assign(&mut clause, trigger, action);
                        State::AfterTarget
                    }
                    None => return Err(unknown_action(col, trigger, word.to_string())),
                },
            },

            State::Set(trigger) => match ReferenceAction::from_set_target(token) {
                Some(action) => {
                    assign(&mut clause, trigger, action);
                    State::AfterTarget
                }
                None => return Err(invalid_set(col, trigger, token)),
            },

            State::No(trigger) if token == "action" => {
                assign(&mut clause, trigger, ReferenceAction::NoAction);
                State::AfterTarget
            }
            State::No(trigger) => return Err(unknown_action(col, trigger, format!("no {token}"))),

            State::Done => State::Done,
        };
    }

    match state {
        State::Set(trigger) => Err(invalid_set(col, trigger, "")),
        State::No(trigger) => Err(unknown_action(col, trigger, "no".to_string())),
        _ => Ok(clause),
    }
}

/// Emits foreign key changes.
///
/// Remove and Update drop the existing `<table>_<column>_fk` constraint
/// first; Add and Update then add the parsed constraint. A missing or
/// composite target on Add or Update is an error.
pub fn emit(
    col: ColumnRef<'_>,
    transition: Transition,
    tokens: &[&str],
) -> Result<Vec<MigrationOperation>> {
    let mut operations = Vec::new();
    if transition.drops_existing() {
        operations.push(MigrationOperation::DropForeignKey {
            table: col.table.to_string(),
            column: col.column.to_string(),
        });
    }
    if transition.adds_new() {
        let reference = parse(col, tokens)?.into_reference(col)?;
        debug!(
            table = col.table,
            column = col.column,
            references = %reference.table,
            "Parsed references clause"
        );
        operations.push(MigrationOperation::AddForeignKey {
            table: col.table.to_string(),
            column: col.column.to_string(),
            reference,
        });
    }
    Ok(operations)
}

fn parse_target(text: &str) -> Option<(String, Vec<String>)> {
    let (table, rest) = text.split_once('(')?;
    let (columns, _) = rest.split_once(')')?;
    let table = table.trim();
    let columns: Vec<String> = columns
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect();
    if table.is_empty() || columns.is_empty() {
        return None;
    }
    Some((table.to_string(), columns))
}

fn assign(clause: &mut ReferenceClause, trigger: ReferenceTrigger, action: ReferenceAction) {
    match trigger {
        ReferenceTrigger::Update => clause.on_update = action,
        ReferenceTrigger::Delete => clause.on_delete = action,
    }
}

fn unknown_action(col: ColumnRef<'_>, trigger: ReferenceTrigger, token: String) -> MigrateError {
    MigrateError::UnknownReferenceAction {
        table: col.table.to_string(),
        column: col.column.to_string(),
        trigger,
        token,
    }
}

fn invalid_set(col: ColumnRef<'_>, trigger: ReferenceTrigger, token: &str) -> MigrateError {
    MigrateError::InvalidSetAction {
        table: col.table.to_string(),
        column: col.column.to_string(),
        trigger,
        token: token.to_string(),
    }
}
