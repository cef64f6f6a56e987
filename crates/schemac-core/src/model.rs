//! Schema document model
//!
//! The declarations exactly as the schema editor stores them. Nothing here is
//! validated beyond JSON shape; see [`crate::schema::compile`] for that.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, SchemaError};

/// A database declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseDecl {
    /// Database name
    pub name: String,

    /// `fixed` (core) or `instance` (per tenant)
    #[serde(rename = "type")]
    pub kind: String,

    /// Tables in declaration order
    #[serde(default)]
    pub tables: Vec<TableDecl>,
}

impl DatabaseDecl {
    /// Find a table by name
    pub fn find_table(&self, name: &str) -> Option<&TableDecl> {
        self.tables.iter().find(|t| t.name == name)
    }
}

fn default_table_kind() -> String {
    "fixed".to_string()
}

/// A table declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDecl {
    pub name: String,

    #[serde(rename = "type", default = "default_table_kind")]
    pub kind: String,

    #[serde(default)]
    pub columns: Vec<ColumnDecl>,

    #[serde(default)]
    pub indexes: Vec<IndexDecl>,
}

impl TableDecl {
    /// Find a column by name
    pub fn find_column(&self, name: &str) -> Option<&ColumnDecl> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// A column declaration
///
/// One flat record for every kind; which fields matter depends on `kind`.
/// Numeric fields stay raw JSON so that the validators can tell a type error
/// from a range error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDecl {
    pub name: String,

    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub nullable: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,

    #[serde(default)]
    pub unsigned: bool,

    #[serde(default)]
    pub auto_increment: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_size: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_size: Option<Value>,

    /// Enumerated values of a `code` column
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<CodeValueDecl>>,

    /// Dotted reference path of an `FK` column
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,

    /// ON DELETE action of an `FK` column
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ondelete: Option<String>,
}

impl ColumnDecl {
    /// Create a bare declaration of the given kind
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            ..Default::default()
        }
    }

    /// The declared default, with JSON `null` treated as absent
    pub fn declared_default(&self) -> Option<&Value> {
        self.default_value.as_ref().filter(|v| !v.is_null())
    }
}

/// One enumerated value of a `code` column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeValueDecl {
    pub code: Value,
    pub value: String,
}

/// An index declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexDecl {
    /// `primary`, `unique` or `index`
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub columns: Vec<String>,
}

/// A whole schema document: one or two databases
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaDocument {
    pub databases: Vec<DatabaseDecl>,
}

impl SchemaDocument {
    /// Parse a schema document from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| SchemaError::structural(format!("invalid JSON: {}", e)))?;

        let Value::Array(items) = value else {
            return Err(SchemaError::structural(
                "schema document must be an array of databases",
            ));
        };

        if items.is_empty() || items.len() > 2 {
            return Err(SchemaError::structural(format!(
                "schema document must declare one or two databases, found {}",
                items.len()
            )));
        }

        let databases = items
            .into_iter()
            .enumerate()
            .map(|(i, item)| {
                serde_json::from_value::<DatabaseDecl>(item).map_err(|e| {
                    SchemaError::structural(format!("database #{} is malformed: {}", i + 1, e))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { databases })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn parse_minimal_document() {
        let doc = SchemaDocument::from_json(
            r#"[{"name": "app", "type": "fixed", "tables": [
                {"name": "users", "columns": [
                    {"name": "id", "type": "serial", "size": "INT"},
                    {"name": "email", "type": "string", "maxLength": 255, "defaultValue": null}
                ], "indexes": [{"type": "primary", "columns": ["id"]}]}
            ]}]"#,
        )
        .unwrap();

        let users = doc.databases[0].find_table("users").unwrap();
        assert_eq!(users.kind, "fixed");
        assert_eq!(users.columns.len(), 2);
        assert_eq!(users.find_column("email").unwrap().max_length, Some(Value::from(255)));
        assert!(users.find_column("email").unwrap().declared_default().is_none());
    }

    #[test]
    fn rejects_wrong_database_count() {
        let err = SchemaDocument::from_json("[]").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Structural);

        let three = r#"[{"name":"a","type":"fixed"},{"name":"b","type":"instance"},{"name":"c","type":"fixed"}]"#;
        assert_eq!(SchemaDocument::from_json(three).unwrap_err().kind, ErrorKind::Structural);
    }

    #[test]
    fn rejects_non_array_document() {
        let err = SchemaDocument::from_json(r#"{"name": "app"}"#).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Structural);
    }

    #[test]
    fn rejects_malformed_database() {
        let err = SchemaDocument::from_json(r#"[{"type": "fixed"}]"#).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Structural);
        assert!(err.message.contains("database #1"));
    }
}
