//! Subquery predicate builder (ANY / ALL / EXISTS / NOT EXISTS / IN / NOT IN).
//!
//! The inner query is always `SELECT "<col>" FROM "<table>"` with an optional
//! sanitized WHERE and an optional correlation fragment referencing the outer
//! query. When both are present the correlation is appended with `AND`;
//! otherwise it forms the WHERE on its own.

use crate::error::{QueryError, QueryResult};
use crate::ident::Ident;
use crate::sanitize::validate_clause;

/// Predicate kind selecting the comparison shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubqueryKind {
    Any,
    All,
    Exists,
    NotExists,
    In,
    NotIn,
}

impl SubqueryKind {
    fn keyword(self) -> &'static str {
        match self {
            SubqueryKind::Any => "ANY",
            SubqueryKind::All => "ALL",
            SubqueryKind::Exists => "EXISTS",
            SubqueryKind::NotExists => "NOT EXISTS",
            SubqueryKind::In => "IN",
            SubqueryKind::NotIn => "NOT IN",
        }
    }

    /// ANY/ALL/IN/NOT IN compare an outer column; EXISTS variants do not.
    fn needs_outer_column(self) -> bool {
        !matches!(self, SubqueryKind::Exists | SubqueryKind::NotExists)
    }

    /// Only ANY/ALL take an explicit comparison operator.
    fn needs_operator(self) -> bool {
        matches!(self, SubqueryKind::Any | SubqueryKind::All)
    }
}

/// Comparison operators permitted in front of ANY/ALL.
const ALLOWED_OPERATORS: &[&str] = &["=", "!=", "<>", "<", "<=", ">", ">="];

/// Builder for a subquery predicate usable inside an outer WHERE.
#[derive(Debug, Clone, Default)]
#[must_use]
pub struct SubqueryPredicate {
    outer_column: Option<String>,
    operator: Option<String>,
    inner_table: String,
    inner_column: String,
    inner_where: Option<String>,
    correlation: Option<String>,
}

impl SubqueryPredicate {
    /// Create a builder over the inner SELECT's table and column.
    pub fn new(inner_table: impl Into<String>, inner_column: impl Into<String>) -> Self {
        Self {
            inner_table: inner_table.into(),
            inner_column: inner_column.into(),
            ..Self::default()
        }
    }

    /// Set the outer column compared against the subquery.
    pub fn outer_column(mut self, column: impl Into<String>) -> Self {
        self.outer_column = Some(column.into());
        self
    }

    /// Set the ANY/ALL comparison operator.
    pub fn operator(mut self, operator: impl Into<String>) -> Self {
        self.operator = Some(operator.into());
        self
    }

    /// Set the inner query's own WHERE fragment.
    pub fn inner_where(mut self, clause: impl Into<String>) -> Self {
        self.inner_where = Some(clause.into());
        self
    }

    /// Set the correlation fragment referencing the outer query.
    pub fn correlation(mut self, clause: impl Into<String>) -> Self {
        self.correlation = Some(clause.into());
        self
    }

    /// Assemble the predicate for the given kind.
    pub fn build(&self, kind: SubqueryKind) -> QueryResult<String> {
        let inner = self.build_inner_query()?;

        if !kind.needs_outer_column() {
            return Ok(format!("{} ({inner})", kind.keyword()));
        }

        let outer = self
            .outer_column
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                QueryError::incomplete(format!(
                    "{} predicate needs an outer column",
                    kind.keyword()
                ))
            })?;
        let outer = Ident::new(outer)?;

        if !kind.needs_operator() {
            return Ok(format!("{} {} ({inner})", outer.to_sql(), kind.keyword()));
        }

        let operator = self
            .operator
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                QueryError::incomplete(format!(
                    "{} predicate needs a comparison operator",
                    kind.keyword()
                ))
            })?;
        if !ALLOWED_OPERATORS.contains(&operator) {
            return Err(QueryError::unsafe_clause(format!(
                "unsupported comparison operator '{operator}'"
            )));
        }

        Ok(format!(
            "{} {operator} {} ({inner})",
            outer.to_sql(),
            kind.keyword()
        ))
    }

    fn build_inner_query(&self) -> QueryResult<String> {
        let table = Ident::new(self.inner_table.trim())?;
        let column = Ident::new(self.inner_column.trim())?;

        let mut sql = format!("SELECT {} FROM {}", column.to_sql(), table.to_sql());

        let inner_where = self
            .inner_where
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());
        let correlation = self
            .correlation
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        if let Some(clause) = inner_where {
            validate_clause(clause)?;
            sql.push_str(" WHERE ");
            sql.push_str(clause);
        }
        if let Some(clause) = correlation {
            validate_clause(clause)?;
            if inner_where.is_some() {
                sql.push_str(" AND ");
            } else {
                sql.push_str(" WHERE ");
            }
            sql.push_str(clause);
        }

        Ok(sql)
    }
}
