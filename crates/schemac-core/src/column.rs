//! Validated column types
//!
//! A [`Column`] is what both emitters consume. It is built once by the
//! validators (or the FK resolver) and never mutated afterwards.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SchemaError};

/// Ceiling applied to BIGINT columns, signed and unsigned alike.
///
/// Deliberately below the true 64-bit range so every emitted numeric literal
/// stays exactly representable by the descriptor runtime's number type.
pub const BIGINT_CEILING: i64 = 99_999_999_999_999;

/// Largest integer the descriptor runtime represents exactly (2^53 - 1).
pub const MAX_SAFE_INTEGER: i64 = 9_007_199_254_740_991;

/// Highest code a `code` column may declare
pub const MAX_CODE: i64 = 255;

/// Integer storage size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IntegerSize {
    TinyInt,
    SmallInt,
    MediumInt,
    Int,
    BigInt,
}

impl IntegerSize {
    /// Parse a size token such as `TINYINT`
    pub fn parse(token: &str) -> Result<Self> {
        match token {
            "TINYINT" => Ok(Self::TinyInt),
            "SMALLINT" => Ok(Self::SmallInt),
            "MEDIUMINT" => Ok(Self::MediumInt),
            "INT" => Ok(Self::Int),
            "BIGINT" => Ok(Self::BigInt),
            other => Err(SchemaError::type_error(format!(
                "unrecognized integer size '{}'",
                other
            ))),
        }
    }

    /// SQL keyword for this size
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::TinyInt => "TINYINT",
            Self::SmallInt => "SMALLINT",
            Self::MediumInt => "MEDIUMINT",
            Self::Int => "INT",
            Self::BigInt => "BIGINT",
        }
    }

    /// Absolute bounds for this size and signedness
    pub fn bounds(&self, unsigned: bool) -> Bounds {
        let (min, max) = match (self, unsigned) {
            (Self::TinyInt, true) => (0, 255),
            (Self::TinyInt, false) => (-128, 127),
            (Self::SmallInt, true) => (0, 65_535),
            (Self::SmallInt, false) => (-32_768, 32_767),
            (Self::MediumInt, true) => (0, 16_777_215),
            (Self::MediumInt, false) => (-8_388_608, 8_388_607),
            (Self::Int, true) => (0, 4_294_967_295),
            (Self::Int, false) => (-2_147_483_648, 2_147_483_647),
            (Self::BigInt, true) => (0, BIGINT_CEILING),
            (Self::BigInt, false) => (-BIGINT_CEILING, BIGINT_CEILING),
        };
        Bounds { min, max }
    }
}

impl std::fmt::Display for IntegerSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_sql())
    }
}

/// Inclusive numeric bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bounds {
    pub min: i64,
    pub max: i64,
}

impl Bounds {
    pub fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: i64) -> bool {
        value >= self.min && value <= self.max
    }
}

impl std::fmt::Display for Bounds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

/// One enumerated value of a code domain
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CodeValue {
    pub code: u8,
    pub name: String,
}

/// The finite enumeration carried by a `code` column
///
/// Codes and names are unique; declaration order is kept.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CodeDomain {
    values: Vec<CodeValue>,
}

impl CodeDomain {
    /// Build a domain from already-checked values
    pub(crate) fn from_checked(values: Vec<CodeValue>) -> Self {
        Self { values }
    }

    /// Values in declaration order
    pub fn values(&self) -> &[CodeValue] {
        &self.values
    }

    /// Look up the code for a name
    pub fn code_of(&self, name: &str) -> Option<u8> {
        self.values.iter().find(|v| v.name == name).map(|v| v.code)
    }

    /// Look up the name for a code
    pub fn name_of(&self, code: u8) -> Option<&str> {
        self.values
            .iter()
            .find(|v| v.code == code)
            .map(|v| v.name.as_str())
    }

    pub fn contains(&self, code: i64) -> bool {
        self.values.iter().any(|v| i64::from(v.code) == code)
    }

    /// Valid codes in ascending order
    pub fn sorted_codes(&self) -> Vec<u8> {
        let mut codes: Vec<u8> = self.values.iter().map(|v| v.code).collect();
        codes.sort_unstable();
        codes
    }

    /// Highest declared code
    pub fn highest(&self) -> u8 {
        self.values.iter().map(|v| v.code).max().unwrap_or(0)
    }
}

/// A validated default value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DefaultValue {
    /// A safe integer
    Integer(i64),

    /// The empty string literal
    Empty,

    /// A hexadecimal byte literal, upper-case digits without prefix
    Hex(String),
}

/// Validated column type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ColumnType {
    Integer {
        size: IntegerSize,
        unsigned: bool,
        auto_increment: bool,
        bounds: Bounds,
    },
    Serial {
        size: IntegerSize,
        bounds: Bounds,
    },
    Timestamp {
        unsigned: bool,
        bounds: Bounds,
    },
    String {
        min_length: Option<i64>,
        max_length: i64,
    },
    Binary {
        min_size: i64,
        max_size: i64,
    },
    Boolean,
    Code(CodeDomain),
}

impl ColumnType {
    /// Kind name as used in the schema document
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Integer { .. } => "integer",
            Self::Serial { .. } => "serial",
            Self::Timestamp { .. } => "timestamp",
            Self::String { .. } => "string",
            Self::Binary { .. } => "binary",
            Self::Boolean => "boolean",
            Self::Code(_) => "code",
        }
    }

    /// Numeric bounds, for the kinds that have them
    pub fn bounds(&self) -> Option<Bounds> {
        match self {
            Self::Integer { bounds, .. }
            | Self::Serial { bounds, .. }
            | Self::Timestamp { bounds, .. } => Some(*bounds),
            Self::Boolean => Some(Bounds::new(0, 1)),
            Self::Code(_) => Some(IntegerSize::TinyInt.bounds(true)),
            Self::String { .. } | Self::Binary { .. } => None,
        }
    }
}

/// ON DELETE action of a foreign key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OnDelete {
    Cascade,
    SetNull,
    Restrict,
    NoAction,
    SetDefault,
}

impl OnDelete {
    /// Parse an action, case-insensitively
    pub fn parse(action: &str) -> Result<Self> {
        let normalized = action.split_whitespace().collect::<Vec<_>>().join(" ");
        match normalized.to_ascii_uppercase().as_str() {
            "CASCADE" => Ok(Self::Cascade),
            "SET NULL" => Ok(Self::SetNull),
            "RESTRICT" => Ok(Self::Restrict),
            "NO ACTION" => Ok(Self::NoAction),
            "SET DEFAULT" => Ok(Self::SetDefault),
            _ => Err(SchemaError::type_error(format!(
                "unsupported ondelete action '{}'",
                action
            ))),
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Cascade => "CASCADE",
            Self::SetNull => "SET NULL",
            Self::Restrict => "RESTRICT",
            Self::NoAction => "NO ACTION",
            Self::SetDefault => "SET DEFAULT",
        }
    }
}

/// Where a foreign key column points
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ForeignKey {
    /// Name of the database holding the target table
    pub database: String,

    /// Whether the target lives in another database than the FK column
    pub cross_database: bool,

    pub table: String,

    pub column: String,

    pub on_delete: Option<OnDelete>,
}

impl ForeignKey {
    /// Whether the SQL emitter should render a FOREIGN KEY clause
    pub fn emits_constraint(&self) -> bool {
        matches!(self.on_delete, Some(action) if action != OnDelete::NoAction)
    }
}

/// A validated column
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Column {
    pub name: String,

    pub nullable: bool,

    pub default: Option<DefaultValue>,

    pub column_type: ColumnType,

    /// Set when the column was declared as `FK`
    pub foreign_key: Option<ForeignKey>,
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            nullable: false,
            default: None,
            column_type,
            foreign_key: None,
        }
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn with_default(mut self, default: Option<DefaultValue>) -> Self {
        self.default = default;
        self
    }

    pub fn with_foreign_key(mut self, foreign_key: ForeignKey) -> Self {
        self.foreign_key = Some(foreign_key);
        self
    }

    /// Numeric bounds, for the kinds that have them
    pub fn bounds(&self) -> Option<Bounds> {
        self.column_type.bounds()
    }

    /// The code domain of a `code` column
    pub fn code_domain(&self) -> Option<&CodeDomain> {
        match &self.column_type {
            ColumnType::Code(domain) => Some(domain),
            _ => None,
        }
    }
}
