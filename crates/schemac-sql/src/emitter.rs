//! SQL emitter
//!
//! Walks a compiled database and produces its DDL script. Everything it
//! consumes is already validated, so emission itself cannot fail.

use schemac_core::{
    Column, ColumnType, CompiledDatabase, CompiledSchema, CompiledTable, DatabaseKind,
    DefaultValue, IndexKind, SqlConfig,
};

use crate::statement::{
    ColumnDefinition, CreateTable, SqlScript, SqlStatement, TableConstraint, TypeClause,
};

/// Renders compiled databases into DDL
#[derive(Debug, Clone, Default)]
pub struct SqlEmitter {
    config: SqlConfig,
}

impl SqlEmitter {
    pub fn new(config: SqlConfig) -> Self {
        Self { config }
    }

    /// One script per database, in declaration order
    pub fn emit_schema(&self, schema: &CompiledSchema) -> Vec<(DatabaseKind, SqlScript)> {
        schema
            .databases
            .iter()
            .map(|database| (database.kind, self.emit_database(database)))
            .collect()
    }

    /// `CREATE DATABASE`, `USE`, then one `CREATE TABLE` per table
    pub fn emit_database(&self, database: &CompiledDatabase) -> SqlScript {
        let mut statements = vec![
            SqlStatement::CreateDatabase {
                name: database.name.clone(),
                charset: self.config.charset.clone(),
                collation: self.config.collation.clone(),
            },
            SqlStatement::Use(database.name.clone()),
        ];

        for table in &database.tables {
            tracing::debug!(database = %database.name, table = %table.name, "emitting table");
            statements.push(SqlStatement::CreateTable(create_table(table)));
        }

        SqlScript { statements }
    }
}

fn create_table(table: &CompiledTable) -> CreateTable {
    let columns = table
        .columns
        .iter()
        .map(|column| ColumnDefinition {
            name: column.name.clone(),
            type_clause: type_clause(column),
        })
        .collect();

    let mut constraints: Vec<TableConstraint> = table
        .indexes
        .iter()
        .map(|index| match index.kind {
            IndexKind::Primary => TableConstraint::PrimaryKey(index.columns.clone()),
            IndexKind::Unique => TableConstraint::Unique(index.columns.clone()),
            IndexKind::Index => TableConstraint::Index(index.columns.clone()),
        })
        .collect();

    for column in &table.columns {
        let Some(foreign_key) = &column.foreign_key else {
            continue;
        };
        let Some(action) = foreign_key.on_delete.filter(|_| foreign_key.emits_constraint()) else {
            continue;
        };
        constraints.push(TableConstraint::ForeignKey {
            column: column.name.clone(),
            database: foreign_key
                .cross_database
                .then(|| foreign_key.database.clone()),
            table: foreign_key.table.clone(),
            target: foreign_key.column.clone(),
            on_delete: action.as_sql().to_string(),
        });
    }

    CreateTable {
        name: table.name.clone(),
        columns,
        constraints,
    }
}

/// Render the type clause of a validated column
pub fn type_clause(column: &Column) -> TypeClause {
    let (data_type, unsigned, auto_increment) = match &column.column_type {
        ColumnType::Integer {
            size,
            unsigned,
            auto_increment,
            ..
        } => (size.as_sql().to_string(), *unsigned, *auto_increment),
        ColumnType::Serial { size, .. } => (size.as_sql().to_string(), true, true),
        ColumnType::Timestamp { unsigned, .. } => ("BIGINT".to_string(), *unsigned, false),
        ColumnType::String { max_length, .. } => (format!("VARCHAR({})", max_length), false, false),
        ColumnType::Binary { min_size, max_size } if min_size == max_size => {
            (format!("BINARY({})", max_size), false, false)
        }
        ColumnType::Binary { max_size, .. } => (format!("VARBINARY({})", max_size), false, false),
        ColumnType::Boolean | ColumnType::Code(_) => ("TINYINT".to_string(), true, false),
    };

    TypeClause {
        data_type,
        unsigned,
        not_null: !column.nullable,
        default: column.default.as_ref().map(render_default),
        auto_increment,
    }
}

fn render_default(default: &DefaultValue) -> String {
    match default {
        DefaultValue::Integer(value) => value.to_string(),
        DefaultValue::Empty => "''".to_string(),
        DefaultValue::Hex(digits) => format!("X'{}'", digits),
    }
}
