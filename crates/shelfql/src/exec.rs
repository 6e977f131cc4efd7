//! Query execution against PostgreSQL.
//!
//! The builders emit [`BuiltQuery`] values with named `:param` placeholders;
//! this module translates them to the driver's positional `$n` form, bridges
//! [`Value`] to `ToSql`, and decodes result rows back into ordered
//! column→[`Value`] mappings. One query at a time, no retry or timeout policy.

use tokio_postgres::GenericClient;
use tokio_postgres::types::{IsNull, Kind, ToSql, Type, to_sql_checked};
use tracing::debug;

use crate::condition::BuiltQuery;
use crate::error::{QueryError, QueryResult};
use crate::value::{Row, Value};

impl ToSql for Value {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut bytes::BytesMut,
    ) -> Result<IsNull, Box<dyn std::error::Error + Sync + Send>> {
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(b) => b.to_sql(ty, out),
            Value::Int(i) if *ty == Type::INT2 => i16::try_from(*i)?.to_sql(ty, out),
            Value::Int(i) if *ty == Type::INT4 => i32::try_from(*i)?.to_sql(ty, out),
            Value::Int(i) => i.to_sql(ty, out),
            Value::Float(f) if *ty == Type::FLOAT4 => (*f as f32).to_sql(ty, out),
            Value::Float(f) => f.to_sql(ty, out),
            Value::Text(s) => s.to_sql(ty, out),
            Value::Date(d) => d.to_sql(ty, out),
            Value::Array(_) => Err("array parameters are not supported".into()),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        // Mismatches surface from the delegated to_sql call instead.
        true
    }

    to_sql_checked!();
}

/// Translate `:name` placeholders to positional `$n` form.
///
/// Returns the rewritten SQL and the parameter values in first-use order.
/// Repeated names reuse the same position; `::type` casts are left intact.
pub fn to_positional(built: &BuiltQuery) -> QueryResult<(String, Vec<&Value>)> {
    let mut sql = String::with_capacity(built.sql.len());
    let mut ordered: Vec<(&str, &Value)> = Vec::new();

    let mut chars = built.sql.char_indices().peekable();
    while let Some((_, ch)) = chars.next() {
        if ch != ':' {
            sql.push(ch);
            continue;
        }
        // `::` is a cast, not a placeholder.
        if chars.peek().is_some_and(|&(_, next)| next == ':') {
            chars.next();
            sql.push_str("::");
            continue;
        }

        let mut name = String::new();
        while let Some(&(_, next)) = chars.peek() {
            if next == '_' || next.is_ascii_alphanumeric() {
                name.push(next);
                chars.next();
            } else {
                break;
            }
        }
        if name.is_empty() {
            sql.push(':');
            continue;
        }

        let Some((stored, value)) = built.params.iter().find(|(n, _)| *n == name) else {
            return Err(QueryError::incomplete(format!(
                "no value bound for parameter '{name}'"
            )));
        };
        let position = match ordered.iter().position(|(n, _)| *n == stored.as_str()) {
            Some(i) => i + 1,
            None => {
                ordered.push((stored.as_str(), value));
                ordered.len()
            }
        };
        sql.push('$');
        sql.push_str(&position.to_string());
    }

    Ok((sql, ordered.into_iter().map(|(_, v)| v).collect()))
}

/// Run a SELECT-shaped query and decode all rows.
pub async fn fetch_all<C: GenericClient>(client: &C, built: &BuiltQuery) -> QueryResult<Vec<Row>> {
    let (sql, values) = to_positional(built)?;
    debug!(%sql, params = values.len(), "executing query");
    let params: Vec<&(dyn ToSql + Sync)> = values.iter().map(|v| *v as _).collect();
    let rows = client.query(sql.as_str(), &params).await?;
    rows.iter().map(decode_row).collect()
}

/// Run a mutation and return the affected row count.
pub async fn execute<C: GenericClient>(client: &C, built: &BuiltQuery) -> QueryResult<u64> {
    let (sql, values) = to_positional(built)?;
    debug!(%sql, params = values.len(), "executing statement");
    let params: Vec<&(dyn ToSql + Sync)> = values.iter().map(|v| *v as _).collect();
    Ok(client.execute(sql.as_str(), &params).await?)
}

fn decode_row(row: &tokio_postgres::Row) -> QueryResult<Row> {
    let mut out = Row::with_capacity(row.columns().len());
    for (idx, column) in row.columns().iter().enumerate() {
        let value = decode_column(row, idx, column.type_())
            .map_err(|e| QueryError::decode(column.name(), e.to_string()))?;
        out.push((column.name().to_string(), value));
    }
    Ok(out)
}

fn decode_column(
    row: &tokio_postgres::Row,
    idx: usize,
    ty: &Type,
) -> Result<Value, tokio_postgres::Error> {
    let value = if *ty == Type::BOOL {
        row.try_get::<_, Option<bool>>(idx)?.into()
    } else if *ty == Type::INT2 {
        row.try_get::<_, Option<i16>>(idx)?.map(i64::from).into()
    } else if *ty == Type::INT4 {
        row.try_get::<_, Option<i32>>(idx)?.map(i64::from).into()
    } else if *ty == Type::INT8 {
        row.try_get::<_, Option<i64>>(idx)?.into()
    } else if *ty == Type::FLOAT4 {
        row.try_get::<_, Option<f32>>(idx)?.map(f64::from).into()
    } else if *ty == Type::FLOAT8 {
        row.try_get::<_, Option<f64>>(idx)?.into()
    } else if *ty == Type::DATE {
        row.try_get::<_, Option<chrono::NaiveDate>>(idx)?.into()
    } else if *ty == Type::TEXT || *ty == Type::VARCHAR || *ty == Type::BPCHAR || *ty == Type::NAME
    {
        row.try_get::<_, Option<String>>(idx)?.into()
    } else if *ty == Type::TEXT_ARRAY || *ty == Type::VARCHAR_ARRAY {
        row.try_get::<_, Option<Vec<String>>>(idx)?
            .map(|items| Value::Array(items.into_iter().map(Value::Text).collect()))
            .into()
    } else if matches!(ty.kind(), Kind::Enum(_)) {
        // Enum domains come back as their label text.
        row.try_get::<_, Option<EnumLabel>>(idx)?.map(|l| l.0).into()
    } else {
        row.try_get::<_, Option<String>>(idx)?.into()
    };
    Ok(value)
}

/// Text decode for user-defined enum types.
struct EnumLabel(String);

impl<'a> tokio_postgres::types::FromSql<'a> for EnumLabel {
    fn from_sql(
        _ty: &Type,
        raw: &'a [u8],
    ) -> Result<Self, Box<dyn std::error::Error + Sync + Send>> {
        Ok(EnumLabel(std::str::from_utf8(raw)?.to_string()))
    }

    fn accepts(ty: &Type) -> bool {
        matches!(ty.kind(), Kind::Enum(_))
    }
}
