//! Two-table JOIN summary queries.
//!
//! Columns supplied without an explicit `t1.`/`t2.` qualifier are resolved by
//! membership test against each table's column list. When a name appears in
//! both tables, or in neither, the left table wins.

use crate::error::{QueryError, QueryResult};
use crate::expr::SortDir;
use crate::ident::Ident;
use crate::sanitize::validate_clause;
use crate::schema::{SchemaRegistry, TableSchema};

const LEFT_ALIAS: &str = "t1";
const RIGHT_ALIAS: &str = "t2";

/// Builder for `SELECT … FROM "<L>" t1 JOIN "<R>" t2 ON …`.
#[derive(Debug, Clone)]
#[must_use]
pub struct JoinSummary {
    left_table: String,
    right_table: String,
    join_on: Option<(String, String)>,
    columns: Vec<String>,
    condition: Option<String>,
    sort_columns: Vec<(String, SortDir)>,
}

impl JoinSummary {
    /// Create a builder over the two joined tables.
    pub fn new(left_table: impl Into<String>, right_table: impl Into<String>) -> Self {
        Self {
            left_table: left_table.into(),
            right_table: right_table.into(),
            join_on: None,
            columns: Vec::new(),
            condition: None,
            sort_columns: Vec::new(),
        }
    }

    /// Set the join key pair (left column, right column). Required.
    pub fn join_on(mut self, left_column: impl Into<String>, right_column: impl Into<String>) -> Self {
        self.join_on = Some((left_column.into(), right_column.into()));
        self
    }

    /// Set the selected columns; empty means `*`.
    pub fn columns(mut self, columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Set a free-text WHERE fragment (sanitized at build time).
    pub fn condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    /// Add an ORDER BY column.
    pub fn sort_by(mut self, column: impl Into<String>, dir: SortDir) -> Self {
        self.sort_columns.push((column.into(), dir));
        self
    }

    /// Assemble the query, resolving column sides against `registry`.
    pub fn build(&self, registry: &SchemaRegistry) -> QueryResult<String> {
        let left = registry.require_table(self.left_table.trim())?;
        let right = registry.require_table(self.right_table.trim())?;

        let (left_key, right_key) = self.join_on.as_ref().ok_or_else(|| {
            QueryError::incomplete("JOIN needs a left/right key column pair")
        })?;
        left.require_column(left_key.trim())?;
        right.require_column(right_key.trim())?;

        let select_list = if self.columns.is_empty() {
            "*".to_string()
        } else {
            let mut rendered = Vec::with_capacity(self.columns.len());
            for column in &self.columns {
                rendered.push(qualify(column.trim(), left, right)?);
            }
            rendered.join(", ")
        };

        let mut sql = format!(
            "SELECT {select_list} FROM {} {LEFT_ALIAS} JOIN {} {RIGHT_ALIAS} ON {LEFT_ALIAS}.{} = {RIGHT_ALIAS}.{}",
            Ident::new(&left.name)?.to_sql(),
            Ident::new(&right.name)?.to_sql(),
            Ident::new(left_key.trim())?.to_sql(),
            Ident::new(right_key.trim())?.to_sql(),
        );

        if let Some(condition) = self.condition.as_deref().map(str::trim)
            && !condition.is_empty()
        {
            validate_clause(condition)?;
            sql.push_str(" WHERE ");
            sql.push_str(condition);
        }

        if !self.sort_columns.is_empty() {
            let mut rendered = Vec::with_capacity(self.sort_columns.len());
            for (column, dir) in &self.sort_columns {
                rendered.push(format!(
                    "{} {}",
                    qualify(column.trim(), left, right)?,
                    dir.as_sql()
                ));
            }
            sql.push_str(" ORDER BY ");
            sql.push_str(&rendered.join(", "));
        }

        Ok(sql)
    }
}

/// Qualify a column with its table alias.
///
/// Already-dotted `t1.col`/`t2.col` forms are honored as-is (the column part
/// still gets validated and quoted). Undotted names are resolved by
/// membership; both-or-neither falls back to the left table.
fn qualify(column: &str, left: &TableSchema, right: &TableSchema) -> QueryResult<String> {
    if let Some((alias, name)) = column.split_once('.') {
        let alias = match alias {
            LEFT_ALIAS | RIGHT_ALIAS => alias,
            other => {
                return Err(QueryError::identifier(format!(
                    "unknown table alias '{other}' (expected {LEFT_ALIAS} or {RIGHT_ALIAS})"
                )));
            }
        };
        return Ok(format!("{alias}.{}", Ident::new(name)?.to_sql()));
    }

    let alias = if left.has_column(column) {
        LEFT_ALIAS
    } else if right.has_column(column) {
        RIGHT_ALIAS
    } else {
        LEFT_ALIAS
    };
    Ok(format!("{alias}.{}", Ident::new(column)?.to_sql()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaRegistry;

    fn registry() -> SchemaRegistry {
        SchemaRegistry::library_rental()
    }

    #[test]
    fn join_with_resolved_columns() {
        let sql = JoinSummary::new("Books", "Issued_Books")
            .join_on("book_id", "book_id")
            .columns(["title", "issue_date"])
            .build(&registry())
            .unwrap();
        assert_eq!(
            sql,
            "SELECT t1.\"title\", t2.\"issue_date\" FROM \"Books\" t1 JOIN \"Issued_Books\" t2 \
             ON t1.\"book_id\" = t2.\"book_id\""
        );
    }

    #[test]
    fn ambiguous_column_resolves_to_left() {
        // book_id exists in both Books and Issued_Books.
        let sql = JoinSummary::new("Books", "Issued_Books")
            .join_on("book_id", "book_id")
            .columns(["book_id"])
            .build(&registry())
            .unwrap();
        assert!(sql.starts_with("SELECT t1.\"book_id\" FROM"));
    }

    #[test]
    fn unknown_column_defaults_to_left() {
        let sql = JoinSummary::new("Books", "Issued_Books")
            .join_on("book_id", "book_id")
            .columns(["mystery"])
            .build(&registry())
            .unwrap();
        assert!(sql.starts_with("SELECT t1.\"mystery\" FROM"));
    }

    #[test]
    fn dotted_columns_keep_their_alias() {
        let sql = JoinSummary::new("Books", "Issued_Books")
            .join_on("book_id", "book_id")
            .columns(["t2.book_id"])
            .build(&registry())
            .unwrap();
        assert!(sql.starts_with("SELECT t2.\"book_id\" FROM"));
    }

    #[test]
    fn foreign_alias_is_rejected() {
        let err = JoinSummary::new("Books", "Issued_Books")
            .join_on("book_id", "book_id")
            .columns(["t3.book_id"])
            .build(&registry())
            .unwrap_err();
        assert!(matches!(err, QueryError::Identifier(_)));
    }

    #[test]
    fn condition_and_sorting() {
        let sql = JoinSummary::new("Readers", "Issued_Books")
            .join_on("reader_id", "reader_id")
            .condition("return_date IS NULL")
            .sort_by("issue_date", SortDir::Desc)
            .sort_by("full_name", SortDir::Asc)
            .build(&registry())
            .unwrap();
        assert!(sql.contains("WHERE return_date IS NULL"));
        assert!(sql.ends_with("ORDER BY t2.\"issue_date\" DESC, t1.\"full_name\" ASC"));
    }

    #[test]
    fn join_on_is_required() {
        let err = JoinSummary::new("Books", "Issued_Books")
            .build(&registry())
            .unwrap_err();
        assert!(err.is_incomplete());
    }

    #[test]
    fn join_key_must_exist_on_its_side() {
        let err = JoinSummary::new("Books", "Issued_Books")
            .join_on("reader_id", "book_id")
            .build(&registry())
            .unwrap_err();
        assert!(matches!(err, QueryError::UnknownColumn { .. }));
    }

    #[test]
    fn condition_is_sanitized() {
        let err = JoinSummary::new("Books", "Issued_Books")
            .join_on("book_id", "book_id")
            .condition("1=1; DROP TABLE Books")
            .build(&registry())
            .unwrap_err();
        assert!(matches!(err, QueryError::UnsafeClause(_)));
    }
}
