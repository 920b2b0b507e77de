//! System catalog: table name → schema and file mapping.

use std::collections::HashMap;

mod error;
pub mod schema;

pub use error::CatalogError;
pub use schema::{Attribute, DataType, TableSchema};

/// Identifier of a registered table.
pub type TableId = u32;

struct TableEntry {
    schema: TableSchema,
    filename: String,
}

/// Registry of the database's tables.
///
/// Ids are assigned sequentially at registration. The catalog stores the
/// schema and the heap file name per table; it does not own file handles.
pub struct Catalog {
    name: String,
    tables: Vec<TableEntry>,
    ids_by_name: HashMap<String, TableId>,
}

impl Catalog {
    /// Creates an empty catalog for the named database.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tables: Vec::new(),
            ids_by_name: HashMap::new(),
        }
    }

    /// Name of the database this catalog describes.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registers a table and returns its id.
    ///
    /// Registering a second table under an existing name shadows the older
    /// entry for name lookups.
    pub fn add_table(&mut self, schema: TableSchema, filename: impl Into<String>) -> TableId {
        let table_id = self.tables.len() as TableId;
        self.ids_by_name
            .insert(schema.table_name().to_owned(), table_id);
        self.tables.push(TableEntry {
            schema,
            filename: filename.into(),
        });
        table_id
    }

    pub fn table_id(&self, table_name: &str) -> Result<TableId, CatalogError> {
        self.ids_by_name
            .get(table_name)
            .copied()
            .ok_or_else(|| CatalogError::TableNotFound(table_name.to_owned()))
    }

    pub fn table_schema(&self, table_id: TableId) -> Result<&TableSchema, CatalogError> {
        self.entry(table_id).map(|entry| &entry.schema)
    }

    pub fn table_filename(&self, table_id: TableId) -> Result<&str, CatalogError> {
        self.entry(table_id).map(|entry| entry.filename.as_str())
    }

    fn entry(&self, table_id: TableId) -> Result<&TableEntry, CatalogError> {
        self.tables
            .get(table_id as usize)
            .ok_or(CatalogError::UnknownTableId(table_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(name: &str) -> TableSchema {
        TableSchema::from_sql(&format!("CREATE TABLE {name} (a INT);")).unwrap()
    }

    #[test]
    fn test_register_and_look_up() {
        let mut catalog = Catalog::new("lab");
        let r = catalog.add_table(schema("r"), "r.tbl");
        let s = catalog.add_table(schema("s"), "s.tbl");
        assert_ne!(r, s);

        assert_eq!(catalog.table_id("r").unwrap(), r);
        assert_eq!(catalog.table_schema(r).unwrap().table_name(), "r");
        assert_eq!(catalog.table_filename(s).unwrap(), "s.tbl");
    }

    #[test]
    fn test_missing_lookups_fail() {
        let catalog = Catalog::new("lab");
        assert!(matches!(
            catalog.table_id("nope"),
            Err(CatalogError::TableNotFound(_))
        ));
        assert!(matches!(
            catalog.table_schema(0),
            Err(CatalogError::UnknownTableId(0))
        ));
        assert!(matches!(
            catalog.table_filename(3),
            Err(CatalogError::UnknownTableId(3))
        ));
    }
}
