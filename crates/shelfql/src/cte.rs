//! CTE (WITH clause) assembly.
//!
//! [`CteList`] models the interactively edited, ordered list of named
//! sub-queries: blocks are added and removed one at a time, and default
//! `cte_<n>` names are renumbered on removal so they stay dense.
//! [`build_cte_query`] compiles the surviving blocks and a main query into a
//! single `WITH … SELECT …` statement.
//!
//! A block whose WHERE fragment fails sanitization is dropped from the
//! compound query (with a warning) instead of failing the whole build; the
//! main query's WHERE gets no such leniency.

use tracing::warn;

use crate::error::{QueryError, QueryResult};
use crate::ident::Ident;
use crate::sanitize::validate_clause;
use crate::schema::SchemaRegistry;

/// One named sub-query block.
#[derive(Debug, Clone)]
pub struct CteBlock {
    /// Explicit name; `None` means a generated `cte_<n>` default.
    pub name: Option<String>,
    /// Source table of the block's SELECT.
    pub table: String,
    /// Selected columns; empty means `*`.
    pub columns: Vec<String>,
    /// Optional free-text WHERE fragment.
    pub where_clause: Option<String>,
}

impl CteBlock {
    /// Create a block selecting `*` from a table.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            name: None,
            table: table.into(),
            columns: Vec::new(),
            where_clause: None,
        }
    }

    /// Set an explicit block name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the selected columns.
    pub fn columns(mut self, columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Set the WHERE fragment.
    pub fn where_clause(mut self, clause: impl Into<String>) -> Self {
        self.where_clause = Some(clause.into());
        self
    }
}

/// The interactively edited, ordered collection of CTE blocks.
///
/// Owned by a single controller at a time; no concurrent editors assumed.
#[derive(Debug, Clone, Default)]
pub struct CteList {
    blocks: Vec<CteBlock>,
}

impl CteList {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a block. A block without an explicit name gets the dense
    /// default name `cte_<position>`.
    pub fn add(&mut self, block: CteBlock) {
        self.blocks.push(block);
    }

    /// Remove the block at `index`. Default names are derived from position,
    /// so the remaining defaults renumber densely on their own. Out-of-range
    /// indices are ignored.
    pub fn remove(&mut self, index: usize) {
        if index < self.blocks.len() {
            self.blocks.remove(index);
        }
    }

    /// The blocks in order.
    pub fn blocks(&self) -> &[CteBlock] {
        &self.blocks
    }

    /// Number of blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// The effective name of the block at `index`.
    pub fn name_of(&self, index: usize) -> Option<String> {
        self.blocks
            .get(index)
            .map(|b| b.name.clone().unwrap_or_else(|| format!("cte_{index}")))
    }

    fn effective_name(&self, index: usize) -> String {
        self.blocks[index]
            .name
            .clone()
            .unwrap_or_else(|| format!("cte_{index}"))
    }
}

/// The final SELECT of a WITH-query.
#[derive(Debug, Clone)]
pub struct MainQuery {
    /// Base table or CTE name to select from.
    pub source: String,
    /// Selected columns; empty means `*`.
    pub columns: Vec<String>,
    /// Optional WHERE fragment (sanitized; failure aborts the build).
    pub where_clause: Option<String>,
    /// Optional ORDER BY column and direction.
    pub order: Option<(String, crate::expr::SortDir)>,
    /// LIMIT; 0 means no limit.
    pub limit: u64,
}

impl MainQuery {
    /// Select `*` from a source with no filter, order, or limit.
    pub fn from(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            columns: Vec::new(),
            where_clause: None,
            order: None,
            limit: 0,
        }
    }

    /// Set the selected columns.
    pub fn columns(mut self, columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Set the WHERE fragment.
    pub fn where_clause(mut self, clause: impl Into<String>) -> Self {
        self.where_clause = Some(clause.into());
        self
    }

    /// Set the ORDER BY column and direction.
    pub fn order_by(mut self, column: impl Into<String>, dir: crate::expr::SortDir) -> Self {
        self.order = Some((column.into(), dir));
        self
    }

    /// Set the LIMIT (0 = no limit).
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = limit;
        self
    }
}

/// Compose the CTE blocks and the main query into one statement.
///
/// The main source must be a surviving CTE name or a table registered in
/// `registry`.
pub fn build_cte_query(
    ctes: &CteList,
    registry: &SchemaRegistry,
    main: &MainQuery,
) -> QueryResult<String> {
    let mut compiled = Vec::new();
    let mut cte_names = Vec::new();

    for (index, block) in ctes.blocks().iter().enumerate() {
        let name = ctes.effective_name(index);
        match compile_block(block, &name, registry) {
            Ok(sql) => {
                cte_names.push(name);
                compiled.push(sql);
            }
            Err(err) => {
                warn!(cte = %name, %err, "dropping CTE block from compound query");
            }
        }
    }

    let source = main.source.trim();
    let source_ident = Ident::new(source)?;
    if !cte_names.iter().any(|n| n == source) && !registry.has_table(source) {
        return Err(QueryError::UnknownTable(source.to_string()));
    }

    let mut sql = String::new();
    if !compiled.is_empty() {
        sql.push_str("WITH ");
        sql.push_str(&compiled.join(", "));
        sql.push(' ');
    }

    sql.push_str("SELECT ");
    sql.push_str(&render_columns(&main.columns)?);
    sql.push_str(" FROM ");
    sql.push_str(&source_ident.to_sql());

    if let Some(clause) = main.where_clause.as_deref().map(str::trim)
        && !clause.is_empty()
    {
        validate_clause(clause)?;
        sql.push_str(" WHERE ");
        sql.push_str(clause);
    }

    if let Some((column, dir)) = &main.order {
        let column = Ident::new(column.trim())?;
        sql.push_str(&format!(" ORDER BY {} {}", column.to_sql(), dir.as_sql()));
    }

    if main.limit > 0 {
        sql.push_str(&format!(" LIMIT {}", main.limit));
    }

    Ok(sql)
}

fn compile_block(block: &CteBlock, name: &str, registry: &SchemaRegistry) -> QueryResult<String> {
    let name_ident = Ident::new(name)?;
    let table = registry.require_table(block.table.trim())?;
    let table_ident = Ident::new(&table.name)?;

    for column in &block.columns {
        table.require_column(column.trim())?;
    }

    let mut sql = format!(
        "{} AS (SELECT {} FROM {}",
        name_ident.to_sql(),
        render_columns(&block.columns)?,
        table_ident.to_sql()
    );

    if let Some(clause) = block.where_clause.as_deref().map(str::trim)
        && !clause.is_empty()
    {
        validate_clause(clause)?;
        sql.push_str(" WHERE ");
        sql.push_str(clause);
    }

    sql.push(')');
    Ok(sql)
}

fn render_columns(columns: &[String]) -> QueryResult<String> {
    if columns.is_empty() {
        return Ok("*".to_string());
    }
    let mut rendered = Vec::with_capacity(columns.len());
    for column in columns {
        rendered.push(Ident::new(column.trim())?.to_sql());
    }
    Ok(rendered.join(", "))
}
