//! Window-function query builder (RANK / LAG / LEAD).
//!
//! Unlike the other expression builders this one emits a complete, ready-to-run
//! statement: a window function is only meaningful inside a SELECT list, so the
//! builder wraps it as `SELECT *, <expr> FROM "<table>"`.

use crate::error::{QueryError, QueryResult};
use crate::ident::Ident;
use crate::schema::SchemaRegistry;

/// Supported window functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowKind {
    Rank,
    Lag,
    Lead,
}

impl WindowKind {
    fn sql_name(self) -> &'static str {
        match self {
            WindowKind::Rank => "RANK",
            WindowKind::Lag => "LAG",
            WindowKind::Lead => "LEAD",
        }
    }

    fn alias(self) -> &'static str {
        match self {
            WindowKind::Rank => "rank_value",
            WindowKind::Lag => "lag_value",
            WindowKind::Lead => "lead_value",
        }
    }

    fn takes_offset(self) -> bool {
        !matches!(self, WindowKind::Rank)
    }
}

/// Sort direction for ORDER BY.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDir {
    Asc,
    Desc,
}

impl SortDir {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortDir::Asc => "ASC",
            SortDir::Desc => "DESC",
        }
    }
}

/// Builder for a complete window-function query.
#[derive(Debug, Clone)]
#[must_use]
pub struct WindowQuery {
    kind: WindowKind,
    table: String,
    order_column: String,
    direction: SortDir,
    partition_column: Option<String>,
    offset: u32,
    default_literal: Option<String>,
}

impl WindowQuery {
    /// Create a builder; table, ORDER BY column and direction are required for
    /// every kind.
    pub fn new(
        kind: WindowKind,
        table: impl Into<String>,
        order_column: impl Into<String>,
        direction: SortDir,
    ) -> Self {
        Self {
            kind,
            table: table.into(),
            order_column: order_column.into(),
            direction,
            partition_column: None,
            offset: 1,
            default_literal: None,
        }
    }

    /// Set the PARTITION BY column.
    pub fn partition_by(mut self, column: impl Into<String>) -> Self {
        self.partition_column = Some(column.into());
        self
    }

    /// Set the LAG/LEAD row offset (default 1). Ignored for RANK.
    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    /// Set the LAG/LEAD default-value literal. Ignored for RANK.
    pub fn default_literal(mut self, literal: impl Into<String>) -> Self {
        self.default_literal = Some(literal.into());
        self
    }

    /// Assemble the statement, checking the table against `registry`.
    pub fn build(&self, registry: &SchemaRegistry) -> QueryResult<String> {
        let table = registry.require_table(&self.table)?;
        table.require_column(&self.order_column)?;
        if let Some(partition) = &self.partition_column {
            table.require_column(partition)?;
        }
        self.build_unchecked()
    }

    /// Assemble the statement with identifier validation only (no registry).
    pub fn build_unchecked(&self) -> QueryResult<String> {
        if self.kind.takes_offset() && self.offset == 0 {
            return Err(QueryError::incomplete(format!(
                "{} offset must be a positive integer",
                self.kind.sql_name()
            )));
        }

        let table = Ident::new(&self.table)?;
        let order = Ident::new(&self.order_column)?;

        let mut call = String::from(self.kind.sql_name());
        call.push('(');
        if self.kind.takes_offset() {
            call.push_str(&order.to_sql());
            call.push_str(&format!(", {}", self.offset));
            if let Some(default) = self.default_literal.as_deref().map(str::trim)
                && !default.is_empty()
            {
                call.push_str(", ");
                call.push_str(default);
            }
        }
        call.push(')');

        let mut over = String::new();
        if let Some(partition) = &self.partition_column {
            over.push_str("PARTITION BY ");
            over.push_str(&Ident::new(partition)?.to_sql());
            over.push(' ');
        }
        over.push_str(&format!(
            "ORDER BY {} {}",
            order.to_sql(),
            self.direction.as_sql()
        ));

        Ok(format!(
            "SELECT *, {call} OVER ({over}) AS {} FROM {}",
            self.kind.alias(),
            table.to_sql()
        ))
    }
}
