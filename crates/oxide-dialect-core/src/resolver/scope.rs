//! Name resolution for column references.
//!
//! A scope holds the tables a `FROM` clause brings into view, whether each
//! sits on the outer side of a join, and the `IS NOT NULL` guards of the
//! enclosing `WHERE`. Correlated subqueries see their parent's scope.

use crate::catalog::TableSchema;
use crate::types::IntermediateType;

use super::query::ResultColumn;

/// A table or derived table visible in a scope.
#[derive(Debug, Clone)]
pub struct ScopeTable {
    /// The name references use: the alias, or the table name.
    pub name: String,
    /// Columns with their declared types.
    pub columns: Vec<(String, IntermediateType)>,
    /// Whether every column may be NULL because of an outer join.
    pub nullable: bool,
}

impl ScopeTable {
    /// Brings a catalog table into view under `alias` or its own name.
    #[must_use]
    pub fn from_schema(schema: &TableSchema, alias: Option<&str>) -> Self {
        Self {
            name: alias.unwrap_or(&schema.name).to_string(),
            columns: schema
                .columns
                .iter()
                .map(|c| (c.name.clone(), c.ty.clone()))
                .collect(),
            nullable: false,
        }
    }

    /// Brings a subquery's result columns into view under `alias`.
    #[must_use]
    pub fn derived(alias: &str, columns: Vec<ResultColumn>) -> Self {
        Self {
            name: alias.to_string(),
            columns: columns.into_iter().map(|c| (c.name, c.ty)).collect(),
            nullable: false,
        }
    }

    fn column(&self, name: &str) -> Option<&IntermediateType> {
        self.columns
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, ty)| ty)
    }
}

/// Outcome of looking up a column reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// Exactly one visible column matched.
    Found(IntermediateType),
    /// Several visible columns matched an unqualified name.
    Ambiguous,
    /// Nothing matched, here or in any enclosing scope.
    Missing,
}

#[derive(Debug, Clone)]
struct Guard {
    table: Option<String>,
    column: String,
}

/// The tables and guards visible to one `SELECT` core.
#[derive(Debug, Default)]
pub struct Scope<'p> {
    tables: Vec<ScopeTable>,
    guards: Vec<Guard>,
    using: Vec<String>,
    parent: Option<&'p Scope<'p>>,
}

impl<'p> Scope<'p> {
    /// Creates a scope with nothing in view.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            tables: Vec::new(),
            guards: Vec::new(),
            using: Vec::new(),
            parent: None,
        }
    }

    /// Creates a scope nested inside `parent`.
    #[must_use]
    pub const fn child(parent: &'p Scope<'p>) -> Self {
        Self {
            tables: Vec::new(),
            guards: Vec::new(),
            using: Vec::new(),
            parent: Some(parent),
        }
    }

    /// Tables in view, in `FROM` order.
    #[must_use]
    pub fn tables(&self) -> &[ScopeTable] {
        &self.tables
    }

    /// Finds a local table by its reference name.
    #[must_use]
    pub fn table(&self, name: &str) -> Option<&ScopeTable> {
        self.tables
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name))
    }

    /// Adds a table to the scope.
    pub fn push(&mut self, table: ScopeTable) {
        self.tables.push(table);
    }

    /// Number of local tables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Whether no local table is in view.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Marks tables in `range` as the outer side of a join.
    pub fn widen(&mut self, range: core::ops::Range<usize>) {
        for table in self.tables.get_mut(range).unwrap_or_default() {
            table.nullable = true;
        }
    }

    /// Records a column joined with `USING`, which may then be referenced
    /// unqualified even though both sides carry it.
    pub fn add_using(&mut self, column: &str) {
        self.using.push(column.to_string());
    }

    /// Records an `IS NOT NULL` guard from the `WHERE` clause.
    pub fn add_guard(&mut self, table: Option<&str>, column: &str) {
        self.guards.push(Guard {
            table: table.map(str::to_string),
            column: column.to_string(),
        });
    }

    /// Resolves a column reference, walking out to enclosing scopes.
    #[must_use]
    pub fn lookup(&self, table: Option<&str>, column: &str) -> Lookup {
        let mut matches = self
            .tables
            .iter()
            .filter(|t| table.is_none_or(|q| t.name.eq_ignore_ascii_case(q)))
            .filter_map(|t| t.column(column).map(|ty| (t, ty)));
        let Some((first_table, first_ty)) = matches.next() else {
            return self
                .parent
                .map_or(Lookup::Missing, |parent| parent.lookup(table, column));
        };
        let shared = self.using.iter().any(|u| u.eq_ignore_ascii_case(column));
        if matches.next().is_some() && !shared {
            return Lookup::Ambiguous;
        }
        Lookup::Found(self.effective(first_table, column, first_ty))
    }

    /// Returns the effective columns of one table (or of every table when
    /// `table` is `None`), as a `*` projection would see them.
    #[must_use]
    pub fn expand(&self, table: Option<&str>) -> Option<Vec<(String, IntermediateType)>> {
        let tables: Vec<&ScopeTable> = match table {
            Some(name) => vec![self.table(name)?],
            None => self.tables.iter().collect(),
        };
        Some(
            tables
                .into_iter()
                .flat_map(|t| {
                    t.columns
                        .iter()
                        .map(move |(name, ty)| (name.clone(), self.effective(t, name, ty)))
                })
                .collect(),
        )
    }

    fn effective(&self, table: &ScopeTable, column: &str, ty: &IntermediateType) -> IntermediateType {
        let guarded = self.guards.iter().any(|g| {
            g.column.eq_ignore_ascii_case(column)
                && g.table
                    .as_deref()
                    .is_none_or(|q| q.eq_ignore_ascii_case(&table.name))
        });
        if guarded {
            ty.clone().as_non_null()
        } else if table.nullable {
            ty.clone().as_nullable()
        } else {
            ty.clone()
        }
    }
}
