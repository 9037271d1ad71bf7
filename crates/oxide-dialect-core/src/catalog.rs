//! Tables, views and indexes known while analyzing a file.

use crate::types::IntermediateType;

/// A column of a known table or view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSchema {
    /// Column name as declared.
    pub name: String,
    /// Resolved declared type.
    pub ty: IntermediateType,
    /// Part of the primary key.
    pub primary_key: bool,
    /// Carries a UNIQUE constraint.
    pub unique: bool,
}

impl ColumnSchema {
    /// Creates a plain column.
    #[must_use]
    pub fn new(name: impl Into<String>, ty: IntermediateType) -> Self {
        Self {
            name: name.into(),
            ty,
            primary_key: false,
            unique: false,
        }
    }
}

/// A table or view with its resolved columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    /// Table name as declared.
    pub name: String,
    /// Columns in declaration order.
    pub columns: Vec<ColumnSchema>,
    /// Whether this is a view.
    pub view: bool,
}

impl TableSchema {
    /// Creates an empty table.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            view: false,
        }
    }

    /// Adds a column.
    #[must_use]
    pub fn with_column(mut self, column: ColumnSchema) -> Self {
        self.columns.push(column);
        self
    }

    /// Finds a column by name, ignoring case.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ColumnSchema> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
    }
}

/// An index over table columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSchema {
    /// Index name.
    pub name: String,
    /// Indexed table.
    pub table: String,
    /// Indexed columns.
    pub columns: Vec<String>,
}

/// Everything declared so far, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tables: Vec<TableSchema>,
    indexes: Vec<IndexSchema>,
}

impl Catalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All tables and views.
    #[must_use]
    pub fn tables(&self) -> &[TableSchema] {
        &self.tables
    }

    /// All indexes.
    #[must_use]
    pub fn indexes(&self) -> &[IndexSchema] {
        &self.indexes
    }

    /// Finds a table or view by name, ignoring case.
    #[must_use]
    pub fn table(&self, name: &str) -> Option<&TableSchema> {
        self.tables
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name))
    }

    /// Finds an index by name, ignoring case.
    #[must_use]
    pub fn index(&self, name: &str) -> Option<&IndexSchema> {
        self.indexes
            .iter()
            .find(|i| i.name.eq_ignore_ascii_case(name))
    }

    /// Adds or replaces a table.
    pub fn insert(&mut self, table: TableSchema) {
        if let Some(existing) = self
            .tables
            .iter_mut()
            .find(|t| t.name.eq_ignore_ascii_case(&table.name))
        {
            *existing = table;
        } else {
            self.tables.push(table);
        }
    }

    /// Removes a table and its indexes, returning the table.
    pub fn remove(&mut self, name: &str) -> Option<TableSchema> {
        let position = self
            .tables
            .iter()
            .position(|t| t.name.eq_ignore_ascii_case(name))?;
        self.indexes.retain(|i| !i.table.eq_ignore_ascii_case(name));
        Some(self.tables.remove(position))
    }

    /// Adds an index.
    pub fn add_index(&mut self, index: IndexSchema) {
        self.indexes.push(index);
    }

    /// Removes an index by name.
    pub fn remove_index(&mut self, name: &str) -> Option<IndexSchema> {
        let position = self
            .indexes
            .iter()
            .position(|i| i.name.eq_ignore_ascii_case(name))?;
        Some(self.indexes.remove(position))
    }

    /// Renames a table, carrying its indexes along.
    pub fn rename_table(&mut self, from: &str, to: &str) {
        if let Some(table) = self
            .tables
            .iter_mut()
            .find(|t| t.name.eq_ignore_ascii_case(from))
        {
            table.name = to.to_string();
        }
        for index in &mut self.indexes {
            if index.table.eq_ignore_ascii_case(from) {
                index.table = to.to_string();
            }
        }
    }

    /// Adds a column at `after` (`None` appends).
    pub fn add_column(&mut self, table: &str, column: ColumnSchema, after: Option<ColumnAnchor<'_>>) {
        if let Some(schema) = self.table_mut(table) {
            let at = match after {
                Some(ColumnAnchor::First) => 0,
                Some(ColumnAnchor::After(name)) => schema
                    .column_index(name)
                    .map_or(schema.columns.len(), |i| i + 1),
                None => schema.columns.len(),
            };
            schema.columns.insert(at, column);
        }
    }

    /// Removes a column.
    pub fn drop_column(&mut self, table: &str, column: &str) {
        if let Some(schema) = self.table_mut(table) {
            schema.columns.retain(|c| !c.name.eq_ignore_ascii_case(column));
        }
    }

    /// Replaces a column definition in place, optionally moving it.
    pub fn replace_column(
        &mut self,
        table: &str,
        old: &str,
        column: ColumnSchema,
        after: Option<ColumnAnchor<'_>>,
    ) {
        let Some(schema) = self.table_mut(table) else {
            return;
        };
        let Some(index) = schema.column_index(old) else {
            return;
        };
        if after.is_none() {
            schema.columns[index] = column;
            return;
        }
        schema.columns.remove(index);
        self.add_column(table, column, after);
    }

    /// Applies `change` to one column.
    pub fn update_column(&mut self, table: &str, column: &str, change: impl FnOnce(&mut ColumnSchema)) {
        if let Some(col) = self
            .table_mut(table)
            .and_then(|t| t.columns.iter_mut().find(|c| c.name.eq_ignore_ascii_case(column)))
        {
            change(col);
        }
    }

    fn table_mut(&mut self, name: &str) -> Option<&mut TableSchema> {
        self.tables
            .iter_mut()
            .find(|t| t.name.eq_ignore_ascii_case(name))
    }
}

/// Where [`Catalog::add_column`] places a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnAnchor<'a> {
    /// Before every other column.
    First,
    /// Right after the named column.
    After(&'a str),
}
