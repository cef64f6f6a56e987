//! Descriptor emitter
//!
//! Turns a compiled schema into flat [`Descriptor`] records. Property order
//! follows declaration order so regeneration is byte-stable.

use schemac_core::{
    Column, ColumnType, CompiledDatabase, CompiledSchema, CompiledTable, DefaultValue, Location,
    SchemaError,
};

use crate::record::{ColumnRecord, DatabaseRecord, Descriptor, FieldValue, Scalar, TableRecord};

/// Keys a table name may not take on a database object
const RESERVED_TABLE_NAMES: &[&str] = &["_name", "__proto__"];

/// Builds descriptor records from compiled schemas
#[derive(Debug, Clone, Copy, Default)]
pub struct DescriptorEmitter;

impl DescriptorEmitter {
    pub fn new() -> Self {
        Self
    }

    /// Build the descriptor of a whole schema
    ///
    /// Fails only on table names that collide with reserved object keys.
    pub fn emit(&self, schema: &CompiledSchema) -> Result<Descriptor, SchemaError> {
        let databases = schema
            .databases
            .iter()
            .map(|database| self.emit_database(database))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Descriptor { databases })
    }

    pub fn emit_database(&self, database: &CompiledDatabase) -> Result<DatabaseRecord, SchemaError> {
        let mut tables = Vec::with_capacity(database.tables.len());
        for table in &database.tables {
            if RESERVED_TABLE_NAMES.contains(&table.name.as_str()) {
                return Err(SchemaError::structural(format!(
                    "table name '{}' collides with a reserved descriptor key",
                    table.name
                ))
                .at(Location::table(&database.name, &table.name)));
            }
            tracing::debug!(database = %database.name, table = %table.name, "describing table");
            tables.push(table_record(table));
        }

        Ok(DatabaseRecord {
            namespace: database.kind.namespace(),
            name: database.name.clone(),
            tables,
        })
    }
}

fn table_record(table: &CompiledTable) -> TableRecord {
    TableRecord {
        name: table.name.clone(),
        columns: table.columns.iter().map(column_record).collect(),
    }
}

/// Flatten one validated column
pub fn column_record(column: &Column) -> ColumnRecord {
    let mut record = ColumnRecord::new(&column.name);
    record.push("_table", FieldValue::TableRef);
    record.push("type", column.column_type.kind_name());
    record.push("nullable", column.nullable);
    if let Some(default) = &column.default {
        record.push("defaultValue", default_scalar(default));
    }

    match &column.column_type {
        ColumnType::Integer {
            size,
            unsigned,
            auto_increment,
            ..
        } => {
            record.push("size", size.as_sql());
            record.push("unsigned", *unsigned);
            record.push("autoIncrement", *auto_increment);
        }
        ColumnType::Serial { size, .. } => {
            record.push("size", size.as_sql());
            record.push("unsigned", true);
            record.push("autoIncrement", true);
        }
        ColumnType::Timestamp { unsigned, .. } => {
            record.push("unsigned", *unsigned);
        }
        ColumnType::String {
            min_length,
            max_length,
        } => {
            if let Some(min_length) = min_length {
                record.push("minLength", *min_length);
            }
            record.push("maxLength", *max_length);
        }
        ColumnType::Binary { min_size, max_size } => {
            record.push("minSize", *min_size);
            record.push("maxSize", *max_size);
        }
        ColumnType::Boolean | ColumnType::Code(_) => {}
    }

    if let Some(bounds) = column.bounds() {
        record.push("minValue", bounds.min);
        record.push("maxValue", bounds.max);
    }

    if let Some(fk) = &column.foreign_key {
        record.push("references", format!("{}.{}.{}", fk.database, fk.table, fk.column));
    }

    if let Some(domain) = column.code_domain() {
        let name_to_code = domain
            .values()
            .iter()
            .map(|v| (v.name.clone(), Scalar::Int(i64::from(v.code))))
            .collect();
        let code_to_name = domain
            .values()
            .iter()
            .map(|v| (v.code.to_string(), Scalar::Str(v.name.clone())))
            .collect();
        let codes = domain
            .sorted_codes()
            .into_iter()
            .map(|code| Scalar::Int(i64::from(code)))
            .collect();

        record.push("nameToCode", FieldValue::Lookup(name_to_code));
        record.push("codeToName", FieldValue::Lookup(code_to_name));
        record.push("codes", FieldValue::List(codes));
    }

    record
}

fn default_scalar(default: &DefaultValue) -> Scalar {
    match default {
        DefaultValue::Integer(value) => Scalar::Int(*value),
        DefaultValue::Empty => Scalar::Str(String::new()),
        DefaultValue::Hex(digits) => Scalar::Str(format!("X'{}'", digits)),
    }
}
