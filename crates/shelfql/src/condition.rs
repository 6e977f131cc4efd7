//! Equality-condition compilation for CRUD filters.
//!
//! A [`ConditionMap`] is an ordered column→value mapping gathered from the
//! GUI. [`compile_condition`] turns it into a parameterized `AND`-joined
//! fragment with stable, positional parameter names (`param_0`, `param_1`, …).
//! Unknown columns are skipped with a warning rather than failing the whole
//! map; whether an *empty* result is an error is a per-operation policy
//! applied by [`compile_select`], [`compile_update`] and [`compile_delete`].

use tracing::warn;

use crate::error::{QueryError, QueryResult};
use crate::ident::Ident;
use crate::schema::TableSchema;
use crate::value::Value;

/// Ordered mapping from column name to an equality value.
#[derive(Debug, Clone, Default)]
pub struct ConditionMap {
    entries: Vec<(String, Value)>,
}

impl ConditionMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column→value pair, replacing an earlier pair for the same
    /// column in place.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        let column = column.into();
        let value = value.into();
        if let Some(entry) = self.entries.iter_mut().find(|(c, _)| *c == column) {
            entry.1 = value;
        } else {
            self.entries.push((column, value));
        }
    }

    /// Iterate pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(c, v)| (c.as_str(), v))
    }

    /// Number of pairs.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the map is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<C: Into<String>, V: Into<Value>> FromIterator<(C, V)> for ConditionMap {
    fn from_iter<I: IntoIterator<Item = (C, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (c, v) in iter {
            map.insert(c, v);
        }
        map
    }
}

/// A compiled WHERE/SET fragment: SQL text plus its named parameters.
#[derive(Debug, Clone, Default)]
pub struct CompiledClause {
    /// The fragment, without a leading `WHERE`/`SET` keyword.
    pub sql: String,
    /// Parameter name→value pairs, in placeholder order.
    pub params: Vec<(String, Value)>,
}

impl CompiledClause {
    /// Check whether no predicate survived compilation.
    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }
}

/// A finished statement with its named parameter mapping.
///
/// Built once by a builder, consumed as-is by the executor.
#[derive(Debug, Clone)]
pub struct BuiltQuery {
    /// Complete SQL text with `:name` placeholders.
    pub sql: String,
    /// Parameter name→value pairs, in placeholder order.
    pub params: Vec<(String, Value)>,
}

impl BuiltQuery {
    /// Look up a parameter value by name.
    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }
}

/// Compile an equality condition map against a table schema.
///
/// Parameter names are `param_0`, `param_1`, … by position among the pairs
/// that survive the schema check.
pub fn compile_condition(table: &TableSchema, conditions: &ConditionMap) -> CompiledClause {
    compile_condition_with_prefix(table, conditions, "param")
}

/// Like [`compile_condition`] with a caller-chosen name prefix.
///
/// UPDATE compilation uses distinct `set`/`where` prefixes so SET parameter
/// names can never collide with WHERE parameter names.
pub fn compile_condition_with_prefix(
    table: &TableSchema,
    conditions: &ConditionMap,
    prefix: &str,
) -> CompiledClause {
    let (predicates, params) = compile_pairs(table, conditions, prefix);
    CompiledClause {
        sql: predicates.join(" AND "),
        params,
    }
}

/// Compile surviving pairs into `"col" = :name` predicates plus their params.
fn compile_pairs(
    table: &TableSchema,
    conditions: &ConditionMap,
    prefix: &str,
) -> (Vec<String>, Vec<(String, Value)>) {
    let mut predicates = Vec::new();
    let mut params = Vec::new();

    for (column, value) in conditions.iter() {
        if table.column(column).is_none() {
            warn!(table = %table.name, column, "skipping condition on unknown column");
            continue;
        }
        // Schema membership implies the name already satisfies the identifier
        // rule, but the quoting still goes through Ident.
        let ident = match Ident::new(column) {
            Ok(ident) => ident,
            Err(err) => {
                warn!(table = %table.name, column, %err, "skipping unquotable column");
                continue;
            }
        };
        let name = format!("{prefix}_{}", params.len());
        predicates.push(format!("{} = :{name}", ident.to_sql()));
        params.push((name, value.clone()));
    }

    (predicates, params)
}

/// Build a SELECT over `table`, filtered by `conditions`.
///
/// An empty or fully-skipped condition map means "match all": the WHERE
/// clause is simply omitted.
pub fn compile_select(
    table: &TableSchema,
    conditions: &ConditionMap,
    columns: &[&str],
) -> QueryResult<BuiltQuery> {
    let select_list = if columns.is_empty() {
        "*".to_string()
    } else {
        let mut rendered = Vec::with_capacity(columns.len());
        for col in columns {
            table.require_column(col)?;
            rendered.push(Ident::new(col)?.to_sql());
        }
        rendered.join(", ")
    };

    let table_ident = Ident::new(&table.name)?;
    let clause = compile_condition(table, conditions);

    let mut sql = format!("SELECT {select_list} FROM {}", table_ident.to_sql());
    if !clause.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clause.sql);
    }

    Ok(BuiltQuery {
        sql,
        params: clause.params,
    })
}

/// Build an UPDATE with independent SET and WHERE condition maps.
///
/// Both maps are required: an UPDATE without a surviving SET assignment or
/// without a surviving filter is rejected rather than emitted.
pub fn compile_update(
    table: &TableSchema,
    set: &ConditionMap,
    filter: &ConditionMap,
) -> QueryResult<BuiltQuery> {
    let (set_predicates, mut params) = compile_pairs(table, set, "set");
    if set_predicates.is_empty() {
        return Err(QueryError::incomplete(format!(
            "UPDATE on '{}' has no valid SET assignment",
            table.name
        )));
    }

    let where_clause = compile_condition_with_prefix(table, filter, "where");
    if where_clause.is_empty() {
        return Err(QueryError::incomplete(format!(
            "UPDATE on '{}' has no valid WHERE filter",
            table.name
        )));
    }

    let table_ident = Ident::new(&table.name)?;
    params.extend(where_clause.params);

    Ok(BuiltQuery {
        sql: format!(
            "UPDATE {} SET {} WHERE {}",
            table_ident.to_sql(),
            set_predicates.join(", "),
            where_clause.sql
        ),
        params,
    })
}

/// Build a DELETE filtered by `conditions`.
///
/// A DELETE with no surviving filter is rejected; deleting a whole table is
/// never something this builder emits.
pub fn compile_delete(table: &TableSchema, conditions: &ConditionMap) -> QueryResult<BuiltQuery> {
    let clause = compile_condition(table, conditions);
    if clause.is_empty() {
        return Err(QueryError::incomplete(format!(
            "DELETE on '{}' has no valid WHERE filter",
            table.name
        )));
    }

    let table_ident = Ident::new(&table.name)?;
    Ok(BuiltQuery {
        sql: format!("DELETE FROM {} WHERE {}", table_ident.to_sql(), clause.sql),
        params: clause.params,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaRegistry;

    fn books() -> TableSchema {
        SchemaRegistry::library_rental()
            .get_table("Books")
            .unwrap()
            .clone()
    }

    #[test]
    fn two_predicates_joined_with_and() {
        let cond: ConditionMap =
            [("title", "1984"), ("genre", "Роман")].into_iter().collect();
        let clause = compile_condition(&books(), &cond);

        assert_eq!(
            clause.sql,
            "\"title\" = :param_0 AND \"genre\" = :param_1"
        );
        assert_eq!(clause.params.len(), 2);
        assert_eq!(clause.params[0].0, "param_0");
        assert_eq!(clause.params[0].1, Value::Text("1984".into()));
        assert_eq!(clause.params[1].1, Value::Text("Роман".into()));
    }

    #[test]
    fn recompilation_is_stable() {
        let cond: ConditionMap = [("title", "1984")].into_iter().collect();
        let a = compile_condition(&books(), &cond);
        let b = compile_condition(&books(), &cond);
        assert_eq!(a.sql, b.sql);
    }

    #[test]
    fn unknown_column_is_skipped() {
        let cond: ConditionMap =
            [("title", "1984"), ("isbn", "none")].into_iter().collect();
        let clause = compile_condition(&books(), &cond);
        assert_eq!(clause.sql, "\"title\" = :param_0");
        assert_eq!(clause.params.len(), 1);
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut cond = ConditionMap::new();
        cond.insert("title", "1984");
        cond.insert("genre", "Роман");
        cond.insert("title", "Мы");
        assert_eq!(cond.len(), 2);
        assert_eq!(
            cond.iter().next().unwrap().1,
            &Value::Text("Мы".into())
        );
    }

    #[test]
    fn select_with_empty_filter_matches_all() {
        let built = compile_select(&books(), &ConditionMap::new(), &[]).unwrap();
        assert_eq!(built.sql, "SELECT * FROM \"Books\"");
        assert!(built.params.is_empty());
    }

    #[test]
    fn select_with_columns_and_filter() {
        let cond: ConditionMap = [("available", true)].into_iter().collect();
        let built = compile_select(&books(), &cond, &["title", "price"]).unwrap();
        assert_eq!(
            built.sql,
            "SELECT \"title\", \"price\" FROM \"Books\" WHERE \"available\" = :param_0"
        );
        assert_eq!(built.param("param_0"), Some(&Value::Bool(true)));
    }

    #[test]
    fn select_rejects_unknown_projection_column() {
        let err = compile_select(&books(), &ConditionMap::new(), &["isbn"]).unwrap_err();
        assert!(matches!(err, QueryError::UnknownColumn { .. }));
    }

    #[test]
    fn update_param_names_never_collide() {
        let set: ConditionMap = [("price", 250i64)].into_iter().collect();
        let filter: ConditionMap = [("title", "1984")].into_iter().collect();
        let built = compile_update(&books(), &set, &filter).unwrap();

        assert_eq!(
            built.sql,
            "UPDATE \"Books\" SET \"price\" = :set_0 WHERE \"title\" = :where_0"
        );
        let names: Vec<&str> = built.params.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["set_0", "where_0"]);
    }

    #[test]
    fn update_requires_both_halves() {
        let some: ConditionMap = [("price", 250i64)].into_iter().collect();
        assert!(compile_update(&books(), &ConditionMap::new(), &some).is_err());
        assert!(compile_update(&books(), &some, &ConditionMap::new()).is_err());
    }

    #[test]
    fn delete_requires_filter() {
        let err = compile_delete(&books(), &ConditionMap::new()).unwrap_err();
        assert!(err.is_incomplete());

        let cond: ConditionMap = [("book_id", 7i64)].into_iter().collect();
        let built = compile_delete(&books(), &cond).unwrap();
        assert_eq!(
            built.sql,
            "DELETE FROM \"Books\" WHERE \"book_id\" = :param_0"
        );
    }

    #[test]
    fn fully_skipped_filter_counts_as_empty() {
        let cond: ConditionMap = [("isbn", "x")].into_iter().collect();
        assert!(compile_delete(&books(), &cond).is_err());
    }
}
