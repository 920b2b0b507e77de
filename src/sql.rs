//! Mini-parser for the two supported statement shapes.
//!
//! Only `CREATE TABLE name (col TYPE [NOT NULL] [UNIQUE], …);` and
//! `INSERT INTO name VALUES (v1, v2, …);` are understood; anything else
//! fails with [`SqlError::Invalid`] carrying the offending statement.
//! Insert values are passed through verbatim except that surrounding
//! single quotes are stripped; no type checking happens here.

use crate::catalog::schema::{Attribute, DataType};

/// SQL parse failure.
#[derive(Debug)]
pub enum SqlError {
    /// The statement does not match a supported shape.
    Invalid(String),
}

impl std::fmt::Display for SqlError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SqlError::Invalid(sql) => write!(f, "invalid SQL statement: '{}'", sql),
        }
    }
}

impl std::error::Error for SqlError {}

/// Parsed `CREATE TABLE` statement.
#[derive(Debug, PartialEq, Eq)]
pub struct CreateTable {
    pub table_name: String,
    pub attributes: Vec<Attribute>,
}

/// Parsed `INSERT INTO … VALUES` statement.
#[derive(Debug, PartialEq, Eq)]
pub struct Insert {
    pub table_name: String,
    pub values: Vec<String>,
}

/// Parses `CREATE TABLE name (col TYPE [NOT NULL] [UNIQUE], …);`.
pub fn parse_create_table(sql: &str) -> Result<CreateTable, SqlError> {
    let invalid = || SqlError::Invalid(sql.to_owned());

    let rest = sql.strip_prefix("CREATE TABLE ").ok_or_else(invalid)?;
    let (table_name, rest) = rest.split_once(' ').ok_or_else(invalid)?;
    if !is_identifier(table_name) {
        return Err(invalid());
    }

    let body = rest
        .strip_prefix('(')
        .and_then(|b| b.strip_suffix(");"))
        .ok_or_else(invalid)?;

    let mut attributes = Vec::new();
    for declaration in body.split(", ") {
        attributes.push(parse_attribute(declaration).ok_or_else(invalid)?);
    }
    Ok(CreateTable {
        table_name: table_name.to_owned(),
        attributes,
    })
}

/// Parses `INSERT INTO name VALUES (v1, v2, …);`.
pub fn parse_insert(sql: &str) -> Result<Insert, SqlError> {
    let invalid = || SqlError::Invalid(sql.to_owned());

    let rest = sql.strip_prefix("INSERT INTO ").ok_or_else(invalid)?;
    let (table_name, rest) = rest.split_once(' ').ok_or_else(invalid)?;
    if !is_identifier(table_name) {
        return Err(invalid());
    }

    let body = rest
        .strip_prefix("VALUES (")
        .and_then(|b| b.strip_suffix(");"))
        .ok_or_else(invalid)?;

    let mut values = Vec::new();
    for raw in body.split(", ") {
        if raw.is_empty() {
            return Err(invalid());
        }
        values.push(unquote(raw).to_owned());
    }
    Ok(Insert {
        table_name: table_name.to_owned(),
        values,
    })
}

/// One column declaration: `name TYPE [NOT NULL] [UNIQUE]` in any flag order.
fn parse_attribute(declaration: &str) -> Option<Attribute> {
    let mut tokens = declaration.split(' ');

    let name = tokens.next().filter(|name| is_identifier(name))?;
    let (data_type, max_size) = parse_type(tokens.next()?)?;

    let mut not_null = false;
    let mut unique = false;
    let mut pending_not = false;
    for token in tokens {
        match token {
            "UNIQUE" => unique = true,
            "NOT" if !pending_not => pending_not = true,
            "NULL" if pending_not => {
                not_null = true;
                pending_not = false;
            }
            _ => return None,
        }
    }
    if pending_not {
        return None;
    }

    Some(Attribute::new(name, data_type, max_size, not_null, unique))
}

/// `INT`, `CHAR(n)` or `VARCHAR(n)`.
fn parse_type(token: &str) -> Option<(DataType, u32)> {
    if token == "INT" {
        return Some((DataType::Int, 0));
    }
    let (data_type, rest) = if let Some(rest) = token.strip_prefix("VARCHAR") {
        (DataType::Varchar, rest)
    } else if let Some(rest) = token.strip_prefix("CHAR") {
        (DataType::Char, rest)
    } else {
        return None;
    };
    let digits = rest.strip_prefix('(')?.strip_suffix(')')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((data_type, digits.parse().ok()?))
}

fn is_identifier(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Strips a surrounding pair of single quotes, if present.
fn unquote(value: &str) -> &str {
    value
        .strip_prefix('\'')
        .and_then(|v| v.strip_suffix('\''))
        .unwrap_or(value)
}
