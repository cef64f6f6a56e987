//! Descriptor records
//!
//! Records are flat: a column field is a scalar, the back-reference to the
//! owning table, or a one-level code lookup. Nothing nests deeper.

/// A scalar field value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

/// Value of one column field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Scalar(Scalar),

    /// Reference to the owning table object
    TableRef,

    /// Frozen object of scalars, keys rendered quoted
    Lookup(Vec<(String, Scalar)>),

    /// Frozen array of scalars
    List(Vec<Scalar>),
}

impl From<Scalar> for FieldValue {
    fn from(value: Scalar) -> Self {
        Self::Scalar(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Scalar(value.into())
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Scalar(value.into())
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Scalar(value.into())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Scalar(value.into())
    }
}

/// One column object, fields in emission order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRecord {
    pub name: String,
    pub fields: Vec<(&'static str, FieldValue)>,
}

impl ColumnRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn push(&mut self, key: &'static str, value: impl Into<FieldValue>) {
        self.fields.push((key, value.into()));
    }

    pub fn field(&self, key: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRecord {
    pub name: String,
    pub columns: Vec<ColumnRecord>,
}

impl TableRecord {
    pub fn column(&self, name: &str) -> Option<&ColumnRecord> {
        self.columns.iter().find(|c| c.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseRecord {
    /// `core` or `inst`
    pub namespace: &'static str,
    pub name: String,
    pub tables: Vec<TableRecord>,
}

impl DatabaseRecord {
    pub fn table(&self, name: &str) -> Option<&TableRecord> {
        self.tables.iter().find(|t| t.name == name)
    }
}

/// The whole descriptor of one schema document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    /// Databases in declaration order
    pub databases: Vec<DatabaseRecord>,
}

impl Descriptor {
    pub fn database(&self, namespace: &str) -> Option<&DatabaseRecord> {
        self.databases.iter().find(|d| d.namespace == namespace)
    }
}
