//! Catalog errors.

use super::TableId;

/// Errors raised by catalog lookups.
#[derive(Debug)]
pub enum CatalogError {
    /// No table with this name is registered.
    TableNotFound(String),

    /// No table with this id is registered.
    UnknownTableId(TableId),
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::TableNotFound(name) => write!(f, "table not found: {}", name),
            CatalogError::UnknownTableId(id) => write!(f, "unknown table id: {}", id),
        }
    }
}

impl std::error::Error for CatalogError {}
