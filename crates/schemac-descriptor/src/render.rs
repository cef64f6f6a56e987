//! Minified ES module rendering
//!
//! Layout of the output, one line:
//!
//! ```text
//! const t0={_objectType:"table",_name:"users"};t0.id=Object.freeze({..,_table:t0,..});Object.freeze(t0);
//! const core=Object.freeze({_objectType:"database",_name:"app",users:t0});
//! export default Object.freeze({core:core});
//! ```
//!
//! Table objects are frozen only after their columns are attached, since each
//! column refers back to its table.

use crate::record::{ColumnRecord, Descriptor, FieldValue, Scalar};

impl Descriptor {
    /// Render the descriptor as a minified ES module
    pub fn render(&self) -> String {
        let mut out = String::new();
        let mut table_var = 0usize;

        for database in &self.databases {
            let mut members = Vec::with_capacity(database.tables.len());
            for table in &database.tables {
                let var = format!("t{}", table_var);
                table_var += 1;

                out.push_str(&format!(
                    "const {}={{_objectType:\"table\",_name:{}}};",
                    var,
                    quote(&table.name)
                ));
                for column in &table.columns {
                    out.push_str(&format!(
                        "{}.{}=Object.freeze({});",
                        var,
                        column.name,
                        column_object(column, &var)
                    ));
                }
                out.push_str(&format!("Object.freeze({});", var));
                members.push(format!("{}:{}", table.name, var));
            }

            out.push_str(&format!(
                "const {}=Object.freeze({{_objectType:\"database\",_name:{}",
                database.namespace,
                quote(&database.name)
            ));
            for member in members {
                out.push(',');
                out.push_str(&member);
            }
            out.push_str("});");
        }

        let namespaces: Vec<String> = self
            .databases
            .iter()
            .map(|d| format!("{0}:{0}", d.namespace))
            .collect();
        out.push_str(&format!(
            "export default Object.freeze({{{}}});\n",
            namespaces.join(",")
        ));
        out
    }
}

fn column_object(column: &ColumnRecord, table_var: &str) -> String {
    let mut out = format!("{{_objectType:\"column\",_name:{}", quote(&column.name));
    for (key, value) in &column.fields {
        out.push_str(&format!(",{}:", key));
        match value {
            FieldValue::Scalar(scalar) => out.push_str(&scalar_literal(scalar)),
            FieldValue::TableRef => out.push_str(table_var),
            FieldValue::Lookup(entries) => {
                let body: Vec<String> = entries
                    .iter()
                    .map(|(k, v)| format!("{}:{}", quote(k), scalar_literal(v)))
                    .collect();
                out.push_str(&format!("Object.freeze({{{}}})", body.join(",")));
            }
            FieldValue::List(items) => {
                let body: Vec<String> = items.iter().map(scalar_literal).collect();
                out.push_str(&format!("Object.freeze([{}])", body.join(",")));
            }
        }
    }
    out.push('}');
    out
}

fn scalar_literal(scalar: &Scalar) -> String {
    match scalar {
        Scalar::Bool(value) => value.to_string(),
        Scalar::Int(value) => value.to_string(),
        Scalar::Str(value) => quote(value),
    }
}

/// Double-quoted string literal with JSON escaping
fn quote(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}
