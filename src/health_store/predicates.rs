//! Composition of WHERE clauses from required and optional filters.
//!
//! Clauses are fixed SQL fragments with a single `?` placeholder; the
//! filter value travels separately as a bound parameter, so caller text
//! never becomes part of the statement.

use rusqlite::types::Value;

#[derive(Clone, Debug, Default)]
pub struct Predicates {
    clauses: Vec<&'static str>,
    params: Vec<Value>,
}

impl Predicates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a clause that is always part of the query.
    pub fn require(mut self, clause: &'static str, value: impl Into<Value>) -> Self {
        debug_assert_eq!(
            clause.matches('?').count(),
            1,
            "predicate clause must bind exactly one parameter: {clause}"
        );
        self.clauses.push(clause);
        self.params.push(value.into());
        self
    }

    /// Adds a clause only when the filter value is present.
    pub fn optional<V: Into<Value>>(self, clause: &'static str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.require(clause, value),
            None => self,
        }
    }

    /// Renders ` WHERE a AND b`, or an empty string when there are no clauses.
    pub fn where_sql(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.clauses.join(" AND "))
        }
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }
}
