//! Column validation engine
//!
//! One rule per column kind. Every rule is pure: it reads a declaration and
//! returns a new [`Column`] or the first violation it finds.

use serde_json::Value;
use std::collections::HashSet;

use crate::column::{
    Bounds, CodeDomain, CodeValue, Column, ColumnType, DefaultValue, IntegerSize, MAX_CODE,
    MAX_SAFE_INTEGER,
};
use crate::error::{Result, SchemaError};
use crate::model::ColumnDecl;
use crate::naming;

/// The closed set of column kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    Integer,
    Serial,
    Timestamp,
    String,
    Binary,
    Boolean,
    Code,
    ForeignKey,
}

impl ColumnKind {
    /// Parse the `type` token of a column declaration
    pub fn parse(token: &str) -> Result<Self> {
        match token {
            "integer" => Ok(Self::Integer),
            "serial" => Ok(Self::Serial),
            "timestamp" => Ok(Self::Timestamp),
            "string" => Ok(Self::String),
            "binary" => Ok(Self::Binary),
            "boolean" => Ok(Self::Boolean),
            "code" => Ok(Self::Code),
            "FK" => Ok(Self::ForeignKey),
            other => Err(SchemaError::type_error(format!(
                "unrecognized column type '{}'",
                other
            ))),
        }
    }
}

/// Validate a directly declared column
///
/// `FK` columns need the surrounding databases and go through
/// [`crate::resolver::ForeignKeyResolver`] instead.
pub fn validate_column(decl: &ColumnDecl) -> Result<Column> {
    match ColumnKind::parse(&decl.kind)? {
        ColumnKind::Integer => validate_integer(decl),
        ColumnKind::Serial => validate_serial(decl),
        ColumnKind::Timestamp => validate_timestamp(decl),
        ColumnKind::String => validate_string(decl),
        ColumnKind::Binary => validate_binary(decl),
        ColumnKind::Boolean => validate_boolean(decl),
        ColumnKind::Code => validate_code(decl),
        ColumnKind::ForeignKey => Err(SchemaError::type_error(format!(
            "FK column '{}' cannot be validated without its databases",
            decl.name
        ))),
    }
}

pub fn validate_integer(decl: &ColumnDecl) -> Result<Column> {
    let size = required_size(decl)?;
    let absolute = size.bounds(decl.unsigned);

    let min = match &decl.min_value {
        Some(value) => within(safe_integer(value, "minValue")?, absolute, "minValue")?,
        None if decl.auto_increment => 1,
        None => absolute.min,
    };
    let max = match &decl.max_value {
        Some(value) => within(safe_integer(value, "maxValue")?, absolute, "maxValue")?,
        None => absolute.max,
    };
    if min > max {
        return Err(SchemaError::range(format!(
            "minValue {} exceeds maxValue {}",
            min, max
        )));
    }
    let bounds = Bounds::new(min, max);

    let default = match scalar_default(decl)? {
        Some(_) if decl.auto_increment => {
            return Err(SchemaError::type_error(
                "auto-increment column cannot declare a default",
            ));
        }
        Some(value) => Some(DefaultValue::Integer(within(
            safe_integer(value, "defaultValue")?,
            bounds,
            "defaultValue",
        )?)),
        None => None,
    };

    Ok(Column::new(
        &decl.name,
        ColumnType::Integer {
            size,
            unsigned: decl.unsigned,
            auto_increment: decl.auto_increment,
            bounds,
        },
    )
    .with_nullable(decl.nullable)
    .with_default(default))
}

pub fn validate_serial(decl: &ColumnDecl) -> Result<Column> {
    let size = required_size(decl)?;

    if decl.nullable {
        return Err(SchemaError::type_error("serial column cannot be nullable"));
    }
    if scalar_default(decl)?.is_some() {
        return Err(SchemaError::type_error("serial column cannot declare a default"));
    }
    if decl.min_value.is_some() || decl.max_value.is_some() {
        return Err(SchemaError::type_error("serial column bounds are fixed"));
    }

    Ok(Column::new(
        &decl.name,
        ColumnType::Serial {
            size,
            bounds: Bounds::new(1, size.bounds(true).max),
        },
    ))
}

pub fn validate_timestamp(decl: &ColumnDecl) -> Result<Column> {
    let default = match (scalar_default(decl)?, decl.unsigned) {
        (None, _) => None,
        (Some(_), false) => {
            return Err(SchemaError::type_error(
                "signed timestamp cannot declare a default",
            ));
        }
        (Some(value), true) => match safe_integer(value, "defaultValue")? {
            0 => Some(DefaultValue::Integer(0)),
            other => {
                return Err(SchemaError::range(format!(
                    "timestamp default must be 0, got {}",
                    other
                )));
            }
        },
    };

    Ok(Column::new(
        &decl.name,
        ColumnType::Timestamp {
            unsigned: decl.unsigned,
            bounds: IntegerSize::BigInt.bounds(decl.unsigned),
        },
    )
    .with_nullable(decl.nullable)
    .with_default(default))
}

pub fn validate_string(decl: &ColumnDecl) -> Result<Column> {
    let max_length = positive(required(&decl.max_length, "maxLength")?, "maxLength")?;
    let min_length = match &decl.min_length {
        Some(value) => Some(within(
            safe_integer(value, "minLength")?,
            Bounds::new(1, max_length),
            "minLength",
        )?),
        None => None,
    };

    let default = match scalar_default(decl)? {
        Some(value) => {
            if !is_empty_literal(value) {
                return Err(SchemaError::type_error(format!(
                    "string default must be the empty literal, got {}",
                    value
                )));
            }
            if let Some(min) = min_length {
                return Err(SchemaError::range(format!(
                    "empty default violates minLength {}",
                    min
                )));
            }
            Some(DefaultValue::Empty)
        }
        None => None,
    };

    Ok(Column::new(
        &decl.name,
        ColumnType::String {
            min_length,
            max_length,
        },
    )
    .with_nullable(decl.nullable)
    .with_default(default))
}

pub fn validate_binary(decl: &ColumnDecl) -> Result<Column> {
    let max_size = positive(required(&decl.max_size, "maxSize")?, "maxSize")?;
    let min_size = match &decl.min_size {
        Some(value) => within(
            safe_integer(value, "minSize")?,
            Bounds::new(1, max_size),
            "minSize",
        )?,
        None => 0,
    };

    let default = match scalar_default(decl)? {
        Some(value) if is_empty_literal(value) => Some(DefaultValue::Empty),
        Some(value) => {
            let digits = value.as_str().and_then(parse_hex_literal).ok_or_else(|| {
                SchemaError::type_error(format!(
                    "binary default must be a hex literal or the empty literal, got {}",
                    value
                ))
            })?;
            let bytes = (digits.len() / 2) as i64;
            if bytes > max_size {
                return Err(SchemaError::range(format!(
                    "binary default is {} bytes, maxSize is {}",
                    bytes, max_size
                )));
            }
            if digits.is_empty() {
                Some(DefaultValue::Empty)
            } else {
                Some(DefaultValue::Hex(digits))
            }
        }
        None => None,
    };

    Ok(Column::new(&decl.name, ColumnType::Binary { min_size, max_size })
        .with_nullable(decl.nullable)
        .with_default(default))
}

pub fn validate_boolean(decl: &ColumnDecl) -> Result<Column> {
    let default = match scalar_default(decl)? {
        Some(value) => Some(DefaultValue::Integer(within(
            safe_integer(value, "defaultValue")?,
            Bounds::new(0, 1),
            "defaultValue",
        )?)),
        None => None,
    };

    Ok(Column::new(&decl.name, ColumnType::Boolean)
        .with_nullable(decl.nullable)
        .with_default(default))
}

pub fn validate_code(decl: &ColumnDecl) -> Result<Column> {
    let declared = match &decl.values {
        Some(values) if !values.is_empty() => values,
        _ => {
            return Err(SchemaError::structural(
                "code column requires at least one value",
            ));
        }
    };

    let mut seen_codes = HashSet::new();
    let mut seen_names = HashSet::new();
    let mut values = Vec::with_capacity(declared.len());

    for entry in declared {
        let code = within(
            safe_integer(&entry.code, "code")?,
            Bounds::new(0, MAX_CODE),
            "code",
        )?;
        naming::check_code_name(&entry.value)?;

        if !seen_codes.insert(code) {
            return Err(SchemaError::reference(format!("duplicate code {}", code)));
        }
        if !seen_names.insert(entry.value.as_str()) {
            return Err(SchemaError::reference(format!(
                "duplicate code name '{}'",
                entry.value
            )));
        }

        values.push(CodeValue {
            code: code as u8,
            name: entry.value.clone(),
        });
    }

    let domain = CodeDomain::from_checked(values);

    let default = match scalar_default(decl)? {
        Some(value) => {
            let code = safe_integer(value, "defaultValue")?;
            if !domain.contains(code) {
                return Err(SchemaError::reference(format!(
                    "default {} is not a declared code",
                    code
                )));
            }
            Some(DefaultValue::Integer(code))
        }
        None => None,
    };

    Ok(Column::new(&decl.name, ColumnType::Code(domain))
        .with_nullable(decl.nullable)
        .with_default(default))
}

/// Parse a value that must be a safe integer
pub fn safe_integer(value: &Value, what: &str) -> Result<i64> {
    let Value::Number(number) = value else {
        return Err(SchemaError::type_error(format!(
            "{} must be an integer, got {}",
            what, value
        )));
    };

    if let Some(i) = number.as_i64() {
        if i.unsigned_abs() > MAX_SAFE_INTEGER as u64 {
            return Err(SchemaError::range(format!("{} {} is not a safe integer", what, i)));
        }
        return Ok(i);
    }
    if number.is_u64() {
        return Err(SchemaError::range(format!("{} {} is not a safe integer", what, number)));
    }

    match number.as_f64() {
        Some(f) if f.fract() != 0.0 || !f.is_finite() => Err(SchemaError::type_error(format!(
            "{} must be an integer, got {}",
            what, number
        ))),
        Some(f) if f.abs() <= MAX_SAFE_INTEGER as f64 => Ok(f as i64),
        _ => Err(SchemaError::range(format!("{} {} is not a safe integer", what, number))),
    }
}

/// The declared default, rejecting nested values
pub(crate) fn scalar_default(decl: &ColumnDecl) -> Result<Option<&Value>> {
    match decl.declared_default() {
        Some(value @ (Value::Object(_) | Value::Array(_))) => Err(SchemaError::structural(
            format!("defaultValue must be a scalar, got {}", value),
        )),
        other => Ok(other),
    }
}

fn required_size(decl: &ColumnDecl) -> Result<IntegerSize> {
    let token = decl.size.as_deref().ok_or_else(|| {
        SchemaError::type_error(format!("{} column requires a size", decl.kind))
    })?;
    IntegerSize::parse(token)
}

fn required<'a>(value: &'a Option<Value>, what: &str) -> Result<&'a Value> {
    value
        .as_ref()
        .ok_or_else(|| SchemaError::structural(format!("missing required field {}", what)))
}

fn within(value: i64, bounds: Bounds, what: &str) -> Result<i64> {
    if bounds.contains(value) {
        Ok(value)
    } else {
        Err(SchemaError::range(format!(
            "{} {} outside {}",
            what, value, bounds
        )))
    }
}

fn positive(value: &Value, what: &str) -> Result<i64> {
    within(safe_integer(value, what)?, Bounds::new(1, MAX_SAFE_INTEGER), what)
}

fn is_empty_literal(value: &Value) -> bool {
    matches!(value.as_str(), Some("") | Some("''"))
}

/// Hex digits of `X'..'`, `x'..'` or `0x..`, upper-cased
fn parse_hex_literal(literal: &str) -> Option<String> {
    let digits = if let Some(rest) = literal.strip_prefix("0x") {
        rest
    } else {
        literal
            .strip_prefix("X'")
            .or_else(|| literal.strip_prefix("x'"))?
            .strip_suffix('\'')?
    };

    if digits.len() % 2 != 0 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    Some(digits.to_ascii_uppercase())
}
