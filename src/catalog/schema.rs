//! Table schemas: attribute lists with types and constraints.

use std::fmt;

use crate::sql::{self, SqlError};

/// Column data types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Int,
    Char,
    Varchar,
}

/// One column of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub data_type: DataType,
    /// Declared size for `CHAR(n)` / `VARCHAR(n)`; 0 for `INT`.
    pub max_size: u32,
    pub not_null: bool,
    pub unique: bool,
}

impl Attribute {
    pub fn new(
        name: impl Into<String>,
        data_type: DataType,
        max_size: u32,
        not_null: bool,
        unique: bool,
    ) -> Self {
        Self {
            name: name.into(),
            data_type,
            max_size,
            not_null,
            unique,
        }
    }
}

/// Schema of one table: its name, columns, and a temporary flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    table_name: String,
    attrs: Vec<Attribute>,
    is_temp: bool,
}

impl TableSchema {
    pub fn new(table_name: impl Into<String>, attrs: Vec<Attribute>, is_temp: bool) -> Self {
        Self {
            table_name: table_name.into(),
            attrs,
            is_temp,
        }
    }

    /// Builds a schema from a `CREATE TABLE` statement.
    ///
    /// Supports `INT`, `CHAR(n)` and `VARCHAR(n)` columns with optional
    /// `NOT NULL` and `UNIQUE` in any order:
    ///
    /// ```
    /// use burrow::catalog::TableSchema;
    ///
    /// let schema =
    ///     TableSchema::from_sql("CREATE TABLE r (a CHAR(8) NOT NULL UNIQUE, b INT);").unwrap();
    /// assert_eq!(schema.table_name(), "r");
    /// assert_eq!(schema.attr_count(), 2);
    /// ```
    ///
    /// # Errors
    ///
    /// Fails with [`SqlError::Invalid`] on any deviation from that shape.
    pub fn from_sql(statement: &str) -> Result<Self, SqlError> {
        let stmt = sql::parse_create_table(statement)?;
        Ok(Self::new(stmt.table_name, stmt.attributes, false))
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn is_temp(&self) -> bool {
        self.is_temp
    }

    pub fn attr_count(&self) -> usize {
        self.attrs.len()
    }

    /// Attribute at schema position `i`.
    pub fn attr(&self, i: usize) -> &Attribute {
        &self.attrs[i]
    }

    pub fn attrs(&self) -> &[Attribute] {
        &self.attrs
    }

    /// Whether an attribute with this exact name exists.
    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.iter().any(|attr| attr.name == name)
    }
}

impl fmt::Display for TableSchema {
    /// Tabular dump of the schema, one row per attribute.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.table_name)?;
        writeln!(f, "|name\t|type\t\t|size\t|notnull\t|unique\t|")?;
        for attr in &self.attrs {
            let type_cell = match attr.data_type {
                DataType::Int => "INT\t\t",
                DataType::Char => "CHAR\t\t",
                DataType::Varchar => "VARCHAR\t",
            };
            writeln!(
                f,
                "|{}\t|{}|{}\t|{}\t\t|{}\t|",
                attr.name,
                type_cell,
                attr.max_size,
                if attr.not_null { "yes" } else { "no" },
                if attr.unique { "yes" } else { "no" },
            )?;
        }
        Ok(())
    }
}
