//! COALESCE and NULLIF expression builders.

use crate::error::{QueryError, QueryResult};
use crate::ident::Ident;

/// Build `COALESCE("column", <fallbacks>) [AS "alias"]`.
///
/// `fallback_literals` is a caller-supplied comma-separated literal list and
/// is embedded verbatim; only the column and alias go through identifier
/// validation.
pub fn build_coalesce(
    column: &str,
    fallback_literals: &str,
    alias: Option<&str>,
) -> QueryResult<String> {
    let fallbacks = fallback_literals.trim();
    if fallbacks.is_empty() {
        return Err(QueryError::incomplete(
            "COALESCE needs at least one fallback value",
        ));
    }

    let mut sql = format!("COALESCE({}, {fallbacks})", Ident::new(column)?.to_sql());
    append_alias(&mut sql, alias)?;
    Ok(sql)
}

/// Build `NULLIF("column", <literal>) [AS "alias"]`.
pub fn build_nullif(
    column: &str,
    compare_literal: &str,
    alias: Option<&str>,
) -> QueryResult<String> {
    let literal = compare_literal.trim();
    if literal.is_empty() {
        return Err(QueryError::incomplete("NULLIF needs a comparison value"));
    }

    let mut sql = format!("NULLIF({}, {literal})", Ident::new(column)?.to_sql());
    append_alias(&mut sql, alias)?;
    Ok(sql)
}

pub(crate) fn append_alias(sql: &mut String, alias: Option<&str>) -> QueryResult<()> {
    if let Some(alias) = alias.map(str::trim)
        && !alias.is_empty()
    {
        sql.push_str(" AS ");
        sql.push_str(&Ident::new(alias)?.to_sql());
    }
    Ok(())
}
