//! Foreign key resolution
//!
//! Rewrites an `FK` declaration into a concrete integer column by following
//! its dotted reference path (`table.column` or `database.table.column`).

use crate::column::{Column, ColumnType, ForeignKey, IntegerSize, OnDelete};
use crate::error::{Location, Result, SchemaError};
use crate::model::{ColumnDecl, DatabaseDecl, TableDecl};
use crate::validate::{self, ColumnKind};

/// A located target declaration
#[derive(Debug, Clone, Copy)]
struct Target<'a> {
    database: &'a DatabaseDecl,
    table: &'a TableDecl,
    column: &'a ColumnDecl,
}

impl Target<'_> {
    fn location(&self) -> Location {
        Location::column(&self.database.name, &self.table.name, &self.column.name)
    }
}

/// Resolves FK columns against the databases of one schema document
pub struct ForeignKeyResolver<'a> {
    databases: &'a [DatabaseDecl],
}

impl<'a> ForeignKeyResolver<'a> {
    /// Create a resolver over every database of the document
    pub fn new(databases: &'a [DatabaseDecl]) -> Self {
        Self { databases }
    }

    /// Resolve an FK column declared in `home`
    pub fn resolve(&self, decl: &ColumnDecl, home: &'a DatabaseDecl) -> Result<Column> {
        let mut visiting = Vec::new();
        self.resolve_inner(decl, home, &mut visiting)
    }

    fn resolve_inner(
        &self,
        decl: &ColumnDecl,
        home: &'a DatabaseDecl,
        visiting: &mut Vec<String>,
    ) -> Result<Column> {
        let path = decl.column.as_deref().ok_or_else(|| {
            SchemaError::structural("FK column requires a column path")
        })?;
        let target = self.lookup(path, home)?;

        let key = target.location().to_string();
        if visiting.contains(&key) {
            return Err(SchemaError::reference(format!(
                "foreign key cycle through {}",
                key
            )));
        }
        visiting.push(key);

        let resolved = match ColumnKind::parse(&target.column.kind) {
            Ok(ColumnKind::ForeignKey) => {
                self.resolve_inner(target.column, target.database, visiting)
            }
            _ => validate::validate_column(target.column),
        }
        .map_err(|e| e.at(target.location()))?;

        if resolved.nullable {
            return Err(SchemaError::reference(format!(
                "foreign key target {} is nullable",
                path
            )));
        }

        // A code target degrades to a plain bounded integer: the enumeration
        // is not carried over.
        let (size, unsigned, bounds) = match &resolved.column_type {
            ColumnType::Integer { size, unsigned, bounds, .. } => (*size, *unsigned, *bounds),
            ColumnType::Serial { size, bounds } => (*size, true, *bounds),
            ColumnType::Code(_) => (IntegerSize::TinyInt, true, IntegerSize::TinyInt.bounds(true)),
            other => {
                return Err(SchemaError::type_error(format!(
                    "foreign key target {} must be integer, serial or code, found {}",
                    path,
                    other.kind_name()
                )));
            }
        };

        let on_delete = decl.ondelete.as_deref().map(OnDelete::parse).transpose()?;
        if on_delete == Some(OnDelete::SetNull) && !decl.nullable {
            return Err(SchemaError::type_error(
                "ON DELETE SET NULL requires a nullable column",
            ));
        }

        let default = match validate::scalar_default(decl)? {
            Some(value) => {
                let value = validate::safe_integer(value, "defaultValue")?;
                if !bounds.contains(value) {
                    return Err(SchemaError::range(format!(
                        "defaultValue {} outside {}",
                        value, bounds
                    )));
                }
                Some(crate::column::DefaultValue::Integer(value))
            }
            None => None,
        };

        tracing::debug!(
            column = %decl.name,
            target = %target.location(),
            "resolved foreign key"
        );

        Ok(Column::new(
            &decl.name,
            ColumnType::Integer {
                size,
                unsigned,
                auto_increment: false,
                bounds,
            },
        )
        .with_nullable(decl.nullable)
        .with_default(default)
        .with_foreign_key(ForeignKey {
            database: target.database.name.clone(),
            cross_database: target.database.name != home.name,
            table: target.table.name.clone(),
            column: target.column.name.clone(),
            on_delete,
        }))
    }

    /// Locate the declaration a dotted path points at
    fn lookup(&self, path: &str, home: &'a DatabaseDecl) -> Result<Target<'a>> {
        let segments: Vec<&str> = path.split('.').collect();
        let (database, table_name, column_name) = match segments.as_slice() {
            [table, column] => (home, *table, *column),
            [database, table, column] => (self.find_database(database)?, *table, *column),
            _ => {
                return Err(SchemaError::reference(format!(
                    "foreign key path '{}' must be [database.]table.column",
                    path
                )));
            }
        };

        let table = database.find_table(table_name).ok_or_else(|| {
            SchemaError::reference(format!(
                "table '{}' not found in database '{}'",
                table_name, database.name
            ))
        })?;
        let column = table.find_column(column_name).ok_or_else(|| {
            SchemaError::reference(format!(
                "column '{}' not found in table '{}'",
                column_name, table.name
            ))
        })?;

        Ok(Target {
            database,
            table,
            column,
        })
    }

    /// Find a database by declared name, falling back to its type token
    fn find_database(&self, segment: &str) -> Result<&'a DatabaseDecl> {
        self.databases
            .iter()
            .find(|d| d.name == segment)
            .or_else(|| self.databases.iter().find(|d| d.kind == segment))
            .ok_or_else(|| SchemaError::reference(format!("database '{}' not found", segment)))
    }
}
