//! Table metadata consumed by the builders.
//!
//! Schemas are owned by the external metadata layer and read-only from the
//! builders' point of view: every column used in a builder operation must
//! exist in its table's [`TableSchema`], and unknown names are rejected before
//! any SQL is emitted.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{QueryError, QueryResult};

/// Declared type category of a column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
    Text,
    Integer,
    Numeric,
    Date,
    Boolean,
    /// Enum domain with its allowed values.
    Enum(Vec<String>),
    Array,
}

/// Column metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnSchema {
    /// Column name.
    pub name: String,
    /// Declared type category.
    pub column_type: ColumnType,
    /// Whether NULL is allowed.
    pub nullable: bool,
    /// Whether this column is the autoincrement primary key.
    pub primary_key: bool,
}

impl ColumnSchema {
    /// Create a nullable, non-key column.
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            nullable: true,
            primary_key: false,
        }
    }

    /// Mark the column NOT NULL.
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Mark the column as the primary key (implies NOT NULL).
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }
}

/// Table metadata: a name and its ordered columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSchema {
    /// Table name.
    pub name: String,
    /// Column metadata, in declaration order.
    pub columns: Vec<ColumnSchema>,
}

impl TableSchema {
    /// Create a new table schema with no columns.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    /// Append a column.
    pub fn with_column(mut self, column: ColumnSchema) -> Self {
        self.columns.push(column);
        self
    }

    /// Check if this table has a column with the given name.
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&ColumnSchema> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Column names in declaration order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Resolve a column or produce an [`QueryError::UnknownColumn`].
    pub fn require_column(&self, name: &str) -> QueryResult<&ColumnSchema> {
        self.column(name).ok_or_else(|| QueryError::UnknownColumn {
            table: self.name.clone(),
            column: name.to_string(),
        })
    }
}

/// Registry of known tables.
///
/// This is the "live table list" the builders check identifiers against after
/// the syntactic stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaRegistry {
    tables: HashMap<String, TableSchema>,
}

impl SchemaRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a table schema, replacing any previous one of the same name.
    pub fn register_table(&mut self, table: TableSchema) {
        self.tables.insert(table.name.clone(), table);
    }

    /// Get a table by name.
    pub fn get_table(&self, name: &str) -> Option<&TableSchema> {
        self.tables.get(name)
    }

    /// Check if a table exists.
    pub fn has_table(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Resolve a table or produce an [`QueryError::UnknownTable`].
    pub fn require_table(&self, name: &str) -> QueryResult<&TableSchema> {
        self.tables
            .get(name)
            .ok_or_else(|| QueryError::UnknownTable(name.to_string()))
    }

    /// Names of all registered tables.
    pub fn table_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tables.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered tables.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// The fixed library-rental schema: Books, Readers, Issued_Books.
    pub fn library_rental() -> Self {
        let mut registry = Self::new();

        registry.register_table(
            TableSchema::new("Books")
                .with_column(ColumnSchema::new("book_id", ColumnType::Integer).primary_key())
                .with_column(ColumnSchema::new("title", ColumnType::Text).not_null())
                .with_column(ColumnSchema::new("author", ColumnType::Text).not_null())
                .with_column(ColumnSchema::new(
                    "genre",
                    ColumnType::Enum(vec![
                        "Роман".to_string(),
                        "Фантастика".to_string(),
                        "Детектив".to_string(),
                        "Поэзия".to_string(),
                        "Научная".to_string(),
                    ]),
                ))
                .with_column(ColumnSchema::new("price", ColumnType::Numeric).not_null())
                .with_column(ColumnSchema::new("available", ColumnType::Boolean).not_null())
                .with_column(ColumnSchema::new("tags", ColumnType::Array)),
        );

        registry.register_table(
            TableSchema::new("Readers")
                .with_column(ColumnSchema::new("reader_id", ColumnType::Integer).primary_key())
                .with_column(ColumnSchema::new("full_name", ColumnType::Text).not_null())
                .with_column(ColumnSchema::new("phone", ColumnType::Text))
                .with_column(ColumnSchema::new("discount_percent", ColumnType::Numeric))
                .with_column(ColumnSchema::new("registered_on", ColumnType::Date).not_null()),
        );

        registry.register_table(
            TableSchema::new("Issued_Books")
                .with_column(ColumnSchema::new("issue_id", ColumnType::Integer).primary_key())
                .with_column(ColumnSchema::new("book_id", ColumnType::Integer).not_null())
                .with_column(ColumnSchema::new("reader_id", ColumnType::Integer).not_null())
                .with_column(ColumnSchema::new("issue_date", ColumnType::Date).not_null())
                .with_column(ColumnSchema::new("return_date", ColumnType::Date)),
        );

        registry
    }
}
