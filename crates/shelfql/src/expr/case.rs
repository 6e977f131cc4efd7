//! CASE expression builder.

use crate::error::{QueryError, QueryResult};
use crate::ident::Ident;
use crate::sanitize::validate_clause;

/// Builder for `CASE WHEN … THEN … [ELSE …] END [AS "alias"]`.
///
/// WHEN/THEN pairs with a blank half are skipped, matching how a dialog with
/// partially-filled rows behaves. At least one complete pair must remain or
/// [`build`](CaseExpr::build) reports an incomplete specification instead of
/// emitting invalid SQL.
#[derive(Debug, Clone, Default)]
#[must_use]
pub struct CaseExpr {
    when_then: Vec<(String, String)>,
    else_value: Option<String>,
    alias: Option<String>,
}

impl CaseExpr {
    /// Create an empty CASE builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a WHEN condition with its THEN value.
    pub fn when(mut self, condition: impl Into<String>, then_value: impl Into<String>) -> Self {
        self.when_then.push((condition.into(), then_value.into()));
        self
    }

    /// Set the ELSE value.
    pub fn else_value(mut self, value: impl Into<String>) -> Self {
        self.else_value = Some(value.into());
        self
    }

    /// Set the output alias.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Assemble the expression.
    pub fn build(&self) -> QueryResult<String> {
        let mut arms = Vec::new();
        for (condition, then_value) in &self.when_then {
            let condition = condition.trim();
            let then_value = then_value.trim();
            if condition.is_empty() || then_value.is_empty() {
                continue;
            }
            validate_clause(condition)?;
            arms.push(format!("WHEN {condition} THEN {then_value}"));
        }

        if arms.is_empty() {
            return Err(QueryError::incomplete(
                "CASE expression needs at least one complete WHEN/THEN pair",
            ));
        }

        let mut sql = String::from("CASE ");
        sql.push_str(&arms.join(" "));
        if let Some(else_value) = self.else_value.as_deref().map(str::trim)
            && !else_value.is_empty()
        {
            sql.push_str(" ELSE ");
            sql.push_str(else_value);
        }
        sql.push_str(" END");

        if let Some(alias) = self.alias.as_deref().map(str::trim)
            && !alias.is_empty()
        {
            sql.push_str(" AS ");
            sql.push_str(&Ident::new(alias)?.to_sql());
        }

        Ok(sql)
    }
}
