//! # shelfql
//!
//! Safe, composable SQL-fragment builders for a library-rental admin backend.
//!
//! A desktop admin GUI gathers table/column/value selections from the user;
//! this crate turns those selections into parameterized SQL while defending
//! against injection through identifier validation and clause sanitation.
//! The builders are pure string computations: they never touch the database.
//!
//! ## Features
//!
//! - **Two-stage identifier defense**: syntactic validation ([`ident`]) plus
//!   existence checks against the [`SchemaRegistry`]
//! - **Best-effort clause sanitation**: keyword blacklist and balance checks
//!   for free-text WHERE fragments ([`sanitize`])
//! - **Condition compilation**: ordered column→value maps become
//!   `"col" = :param_n` fragments with stable named parameters ([`condition`])
//! - **Expression builders**: CASE, COALESCE, NULLIF and RANK/LAG/LEAD window
//!   queries ([`expr`])
//! - **Subquery predicates**: ANY/ALL/EXISTS/NOT EXISTS/IN/NOT IN with
//!   optional correlation ([`subquery`])
//! - **CTE and JOIN assembly**: interactive `WITH` chains and two-table join
//!   summaries ([`cte`], [`join`])
//! - **Safe defaults**: DELETE and UPDATE refuse to build without a filter
//!
//! ## Example
//!
//! ```
//! use shelfql::{ConditionMap, SchemaRegistry, compile_select};
//!
//! let registry = SchemaRegistry::library_rental();
//! let books = registry.get_table("Books").unwrap();
//!
//! let filter: ConditionMap = [("genre", "Роман")].into_iter().collect();
//! let built = compile_select(books, &filter, &["title", "author"]).unwrap();
//! assert_eq!(
//!     built.sql,
//!     "SELECT \"title\", \"author\" FROM \"Books\" WHERE \"genre\" = :param_0"
//! );
//! ```

pub mod condition;
pub mod cte;
pub mod error;
pub mod expr;
pub mod ident;
pub mod join;
pub mod sanitize;
pub mod schema;
pub mod subquery;
pub mod value;

pub use condition::{
    BuiltQuery, CompiledClause, ConditionMap, compile_condition, compile_condition_with_prefix,
    compile_delete, compile_select, compile_update,
};
pub use cte::{CteBlock, CteList, MainQuery, build_cte_query};
pub use error::{QueryError, QueryResult};
pub use expr::{CaseExpr, SortDir, WindowKind, WindowQuery, build_coalesce, build_nullif};
pub use ident::{Ident, is_valid_identifier};
pub use join::JoinSummary;
pub use sanitize::{is_safe_clause, validate_clause};
pub use schema::{ColumnSchema, ColumnType, SchemaRegistry, TableSchema};
pub use subquery::{SubqueryKind, SubqueryPredicate};
pub use value::{Row, Value};

#[cfg(feature = "exec")]
pub mod exec;

#[cfg(feature = "exec")]
pub use exec::{execute, fetch_all, to_positional};
