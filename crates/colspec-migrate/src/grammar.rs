//! Constraint clause vocabulary.
//!
//! A column's constraint spec is a single string such as
//! `field:bigint not null references users(id) on delete cascade`.
//! Everything after the [`FIELD_MARKER`] is the column body: the first
//! space-delimited token is the SQL type, the rest is an unordered set of
//! clauses drawn from [`Clause`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Marker that distinguishes persisted columns from virtual attributes.
pub const FIELD_MARKER: &str = "field:";

/// A constraint clause recognized inside a column body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Clause {
    /// `not null`
    NotNull,
    /// `default(<expr>)`
    Default,
    /// `primary key`
    PrimaryKey,
    /// `unique`
    Unique,
    /// `references <table>(<column>) [on update <action>] [on delete <action>]`
    References,
    /// `check(<expr>)`
    Check,
}

impl Clause {
    /// Every clause, in the order their statements are emitted.
    pub const ALL: [Self; 6] = [
        Self::NotNull,
        Self::Default,
        Self::PrimaryKey,
        Self::Unique,
        Self::References,
        Self::Check,
    ];

    /// The keyword whose presence in a body marks this clause.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::NotNull => "not null",
            Self::Default => "default(",
            Self::PrimaryKey => "primary key",
            Self::Unique => "unique",
            Self::References => "references",
            Self::Check => "check(",
        }
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword().trim_end_matches('('))
    }
}

/// Action taken on referencing rows when a referenced row changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceAction {
    /// Error if referencing rows exist (checked at end of statement).
    #[default]
    NoAction,
    /// Error if referencing rows exist (checked immediately).
    Restrict,
    /// Propagate the change to referencing rows.
    Cascade,
    /// Set the referencing column to NULL.
    SetNull,
    /// Set the referencing column to its default.
    SetDefault,
}

impl ReferenceAction {
    /// Returns the SQL representation of this action.
    #[must_use]
    pub const fn to_sql(self) -> &'static str {
        match self {
            Self::NoAction => "NO ACTION",
            Self::Restrict => "RESTRICT",
            Self::Cascade => "CASCADE",
            Self::SetNull => "SET NULL",
            Self::SetDefault => "SET DEFAULT",
        }
    }

    /// Resolves a complete one-word action.
    #[must_use]
    pub fn from_word(word: &str) -> Option<Self> {
        match word {
            "restrict" => Some(Self::Restrict),
            "cascade" => Some(Self::Cascade),
            _ => None,
        }
    }

    /// Resolves the word following `set`.
    #[must_use]
    pub fn from_set_target(word: &str) -> Option<Self> {
        match word {
            "null" => Some(Self::SetNull),
            "default" => Some(Self::SetDefault),
            _ => None,
        }
    }
}

impl fmt::Display for ReferenceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql().to_ascii_lowercase())
    }
}

/// The event an action is attached to in a references clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceTrigger {
    /// `on update`
    Update,
    /// `on delete`
    Delete,
}

impl fmt::Display for ReferenceTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Update => f.write_str("on update"),
            Self::Delete => f.write_str("on delete"),
        }
    }
}

/// How clause keywords are located inside a column body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordMatching {
    /// Plain substring search. A keyword embedded in another token (for
    /// example inside a default expression) counts as present.
    #[default]
    Substring,
    /// The keyword must start a token, and a keyword ending in a word
    /// character must also end one.
    WordBoundary,
}

impl KeywordMatching {
    /// Returns the byte offset of the first match of `keyword` in `body`.
    #[must_use]
    pub fn find(self, body: &str, keyword: &str) -> Option<usize> {
        match self {
            Self::Substring => body.find(keyword),
            Self::WordBoundary => body
                .match_indices(keyword)
                .map(|(start, _)| start)
                .find(|&start| is_token_aligned(body, start, keyword)),
        }
    }

    /// Returns true if `keyword` occurs in `body`.
    #[must_use]
    pub fn contains(self, body: &str, keyword: &str) -> bool {
        self.find(body, keyword).is_some()
    }
}

fn is_token_aligned(body: &str, start: usize, keyword: &str) -> bool {
    let starts_token = body[..start]
        .chars()
        .next_back()
        .is_none_or(char::is_whitespace);
    let ends_token = keyword.ends_with('(')
        || body[start + keyword.len()..]
            .chars()
            .next()
            .is_none_or(char::is_whitespace);
    starts_token && ends_token
}
