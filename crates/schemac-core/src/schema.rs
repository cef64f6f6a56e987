//! Compiled schema and the compile pass
//!
//! [`compile`] turns a [`SchemaDocument`] into a [`CompiledSchema`] in one
//! straight pass. The result is immutable and shared by both emitters.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::column::Column;
use crate::error::{Location, Result, SchemaError};
use crate::model::{ColumnDecl, DatabaseDecl, IndexDecl, SchemaDocument, TableDecl};
use crate::naming;
use crate::resolver::ForeignKeyResolver;
use crate::validate::{self, ColumnKind};

/// Database type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseKind {
    /// Core database shared by all deployments
    Fixed,

    /// Per-tenant database
    Instance,
}

impl DatabaseKind {
    pub fn parse(token: &str) -> Result<Self> {
        match token {
            "fixed" => Ok(Self::Fixed),
            "instance" => Ok(Self::Instance),
            other => Err(SchemaError::type_error(format!(
                "unrecognized database type '{}'",
                other
            ))),
        }
    }

    /// Sub-namespace used by the emitted artifacts
    pub fn namespace(&self) -> &'static str {
        match self {
            Self::Fixed => "core",
            Self::Instance => "inst",
        }
    }
}

impl std::fmt::Display for DatabaseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fixed => write!(f, "fixed"),
            Self::Instance => write!(f, "instance"),
        }
    }
}

/// Index type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexKind {
    Primary,
    Unique,
    Index,
}

impl IndexKind {
    pub fn parse(token: &str) -> Result<Self> {
        match token {
            "primary" => Ok(Self::Primary),
            "unique" => Ok(Self::Unique),
            "index" => Ok(Self::Index),
            other => Err(SchemaError::type_error(format!(
                "unrecognized index type '{}'",
                other
            ))),
        }
    }
}

/// A validated index
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Index {
    pub kind: IndexKind,
    pub columns: Vec<String>,
}

/// A validated table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledTable {
    pub name: String,
    pub columns: Vec<Column>,
    pub indexes: Vec<Index>,
}

impl CompiledTable {
    pub fn find_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// A validated database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledDatabase {
    pub name: String,
    pub kind: DatabaseKind,
    pub tables: Vec<CompiledTable>,
}

impl CompiledDatabase {
    pub fn find_table(&self, name: &str) -> Option<&CompiledTable> {
        self.tables.iter().find(|t| t.name == name)
    }
}

/// A fully validated schema document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledSchema {
    /// Databases in declaration order
    pub databases: Vec<CompiledDatabase>,
}

impl CompiledSchema {
    /// The core (`fixed`) database, if declared
    pub fn core(&self) -> Option<&CompiledDatabase> {
        self.database(DatabaseKind::Fixed)
    }

    /// The instance database, if declared
    pub fn instance(&self) -> Option<&CompiledDatabase> {
        self.database(DatabaseKind::Instance)
    }

    pub fn database(&self, kind: DatabaseKind) -> Option<&CompiledDatabase> {
        self.databases.iter().find(|d| d.kind == kind)
    }
}

/// Parse and compile a schema document from JSON text
pub fn compile_json(json: &str) -> Result<CompiledSchema> {
    compile(&SchemaDocument::from_json(json)?)
}

/// Validate a document and resolve every FK column
///
/// The first violation aborts compilation.
pub fn compile(document: &SchemaDocument) -> Result<CompiledSchema> {
    let declared = &document.databases;
    if declared.is_empty() || declared.len() > 2 {
        return Err(SchemaError::structural(format!(
            "schema document must declare one or two databases, found {}",
            declared.len()
        )));
    }

    let mut kinds = HashSet::new();
    let mut names = HashSet::new();
    for database in declared {
        let location = Location::database(&database.name);
        naming::check_database_name(&database.name).map_err(|e| e.at(location.clone()))?;
        let kind = DatabaseKind::parse(&database.kind).map_err(|e| e.at(location.clone()))?;

        if !names.insert(database.name.as_str()) {
            return Err(SchemaError::name(format!(
                "database '{}' declared twice",
                database.name
            ))
            .at(location));
        }
        if !kinds.insert(kind) {
            return Err(SchemaError::structural(format!(
                "more than one database of type '{}'",
                kind
            ))
            .at(location));
        }
    }

    let resolver = ForeignKeyResolver::new(declared);
    let databases = declared
        .iter()
        .map(|database| compile_database(database, &resolver))
        .collect::<Result<Vec<_>>>()?;

    Ok(CompiledSchema { databases })
}

fn compile_database<'a>(
    database: &'a DatabaseDecl,
    resolver: &ForeignKeyResolver<'a>,
) -> Result<CompiledDatabase> {
    let kind = DatabaseKind::parse(&database.kind)?;

    let mut seen = HashSet::new();
    let mut tables = Vec::with_capacity(database.tables.len());
    for table in &database.tables {
        let location = Location::table(&database.name, &table.name);
        if !seen.insert(table.name.as_str()) {
            return Err(SchemaError::name(format!("table '{}' declared twice", table.name))
                .at(location));
        }
        tables.push(compile_table(database, table, resolver).map_err(|e| e.at(location))?);
    }

    tracing::debug!(database = %database.name, tables = tables.len(), "compiled database");

    Ok(CompiledDatabase {
        name: database.name.clone(),
        kind,
        tables,
    })
}

fn compile_table<'a>(
    database: &'a DatabaseDecl,
    table: &TableDecl,
    resolver: &ForeignKeyResolver<'a>,
) -> Result<CompiledTable> {
    naming::check_table_name(&table.name)?;
    if table.kind != "fixed" {
        return Err(SchemaError::type_error(format!(
            "table type '{}' is not supported yet",
            table.kind
        )));
    }

    let mut seen = HashSet::new();
    let mut columns = Vec::with_capacity(table.columns.len());
    for decl in &table.columns {
        let location = Location::column(&database.name, &table.name, &decl.name);
        if !seen.insert(decl.name.as_str()) {
            return Err(SchemaError::name(format!("column '{}' declared twice", decl.name))
                .at(location));
        }
        columns.push(compile_column(database, decl, resolver).map_err(|e| e.at(location))?);
    }

    let mut indexes = Vec::with_capacity(table.indexes.len());
    for decl in &table.indexes {
        indexes.push(compile_index(decl, &columns)?);
    }
    if indexes.iter().filter(|i| i.kind == IndexKind::Primary).count() > 1 {
        return Err(SchemaError::structural("more than one primary index"));
    }

    tracing::debug!(table = %table.name, columns = columns.len(), "compiled table");

    Ok(CompiledTable {
        name: table.name.clone(),
        columns,
        indexes,
    })
}

fn compile_column<'a>(
    database: &'a DatabaseDecl,
    decl: &ColumnDecl,
    resolver: &ForeignKeyResolver<'a>,
) -> Result<Column> {
    naming::check_column_name(&decl.name)?;
    match ColumnKind::parse(&decl.kind)? {
        ColumnKind::ForeignKey => resolver.resolve(decl, database),
        _ => validate::validate_column(decl),
    }
}

fn compile_index(decl: &IndexDecl, columns: &[Column]) -> Result<Index> {
    let kind = IndexKind::parse(&decl.kind)?;
    if decl.columns.is_empty() {
        return Err(SchemaError::structural(format!(
            "{} index declares no columns",
            decl.kind
        )));
    }
    for name in &decl.columns {
        if !columns.iter().any(|c| &c.name == name) {
            return Err(SchemaError::reference(format!(
                "index references unknown column '{}'",
                name
            )));
        }
    }

    Ok(Index {
        kind,
        columns: decl.columns.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{Bounds, ColumnType};
    use crate::error::ErrorKind;

    fn wrap(tables: &str) -> String {
        format!(r#"[{{"name": "app", "type": "fixed", "tables": {}}}]"#, tables)
    }

    #[test]
    fn compiles_single_database() {
        let schema = compile_json(&wrap(
            r#"[{"name": "users", "columns": [
                {"name": "id", "type": "serial", "size": "INT"},
                {"name": "age", "type": "integer", "size": "TINYINT", "unsigned": true}
            ], "indexes": [{"type": "primary", "columns": ["id"]}]}]"#,
        ))
        .unwrap();

        let core = schema.core().unwrap();
        assert!(schema.instance().is_none());
        let users = core.find_table("users").unwrap();
        assert_eq!(users.find_column("age").unwrap().bounds(), Some(Bounds::new(0, 255)));
        assert_eq!(users.indexes[0].kind, IndexKind::Primary);
    }

    #[test]
    fn table_name_pattern() {
        let err = compile_json(&wrap(r#"[{"name": "UserAccounts", "columns": []}]"#)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Name);
        assert_eq!(err.location, Some(Location::table("app", "UserAccounts")));

        assert!(compile_json(&wrap(r#"[{"name": "user_accounts", "columns": []}]"#)).is_ok());
    }

    #[test]
    fn errors_carry_column_location() {
        let err = compile_json(&wrap(
            r#"[{"name": "users", "columns": [
                {"name": "age", "type": "integer", "size": "TINYINT", "unsigned": true, "maxValue": 999}
            ]}]"#,
        ))
        .unwrap_err();

        assert_eq!(err.kind, ErrorKind::Range);
        assert_eq!(err.location, Some(Location::column("app", "users", "age")));
    }

    #[test]
    fn unsupported_table_type() {
        let err = compile_json(&wrap(r#"[{"name": "logs", "type": "partitioned"}]"#)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Type);
    }

    #[test]
    fn duplicate_database_types_are_structural() {
        let err = compile_json(
            r#"[{"name": "one", "type": "fixed"}, {"name": "two", "type": "fixed"}]"#,
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Structural);
    }

    #[test]
    fn duplicate_names_rejected() {
        let tables = compile_json(&wrap(
            r#"[{"name": "users"}, {"name": "users"}]"#,
        ))
        .unwrap_err();
        assert_eq!(tables.kind, ErrorKind::Name);

        let columns = compile_json(&wrap(
            r#"[{"name": "users", "columns": [
                {"name": "active", "type": "boolean"},
                {"name": "active", "type": "boolean"}
            ]}]"#,
        ))
        .unwrap_err();
        assert_eq!(columns.kind, ErrorKind::Name);
    }

    #[test]
    fn index_validation() {
        let unknown = compile_json(&wrap(
            r#"[{"name": "users", "columns": [{"name": "id", "type": "serial", "size": "INT"}],
                "indexes": [{"type": "unique", "columns": ["email"]}]}]"#,
        ))
        .unwrap_err();
        assert_eq!(unknown.kind, ErrorKind::Reference);

        let bad_kind = compile_json(&wrap(
            r#"[{"name": "users", "columns": [{"name": "id", "type": "serial", "size": "INT"}],
                "indexes": [{"type": "fulltext", "columns": ["id"]}]}]"#,
        ))
        .unwrap_err();
        assert_eq!(bad_kind.kind, ErrorKind::Type);

        let two_primaries = compile_json(&wrap(
            r#"[{"name": "users", "columns": [{"name": "id", "type": "serial", "size": "INT"}],
                "indexes": [{"type": "primary", "columns": ["id"]}, {"type": "primary", "columns": ["id"]}]}]"#,
        ))
        .unwrap_err();
        assert_eq!(two_primaries.kind, ErrorKind::Structural);
    }

    #[test]
    fn foreign_keys_resolve_against_later_tables() {
        let schema = compile_json(&wrap(
            r#"[
                {"name": "orders", "columns": [{"name": "userId", "type": "FK", "column": "users.id"}]},
                {"name": "users", "columns": [{"name": "id", "type": "serial", "size": "BIGINT"}]}
            ]"#,
        ))
        .unwrap();

        let user_id = schema.core().unwrap().find_table("orders").unwrap().find_column("userId").unwrap();
        assert!(matches!(
            user_id.column_type,
            ColumnType::Integer { auto_increment: false, unsigned: true, .. }
        ));
        assert_eq!(user_id.bounds(), Some(Bounds::new(1, 99_999_999_999_999)));
    }

    #[test]
    fn compiling_is_deterministic() {
        let json = wrap(
            r#"[{"name": "users", "columns": [
                {"name": "id", "type": "serial", "size": "INT"},
                {"name": "status", "type": "code", "values": [{"code": 1, "value": "ON"}, {"code": 0, "value": "OFF"}]}
            ]}]"#,
        );
        assert_eq!(compile_json(&json).unwrap(), compile_json(&json).unwrap());
    }
}
