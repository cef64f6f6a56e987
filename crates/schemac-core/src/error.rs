//! Error kinds and compile errors
//!
//! IMPORTANT: Error codes are stable.
//! NEVER rename or remove codes - they are part of the public API.

use serde::{Deserialize, Serialize};

/// Error kind registry
///
/// Every compile failure belongs to exactly one of these kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Wrong shape: bad database count, nested value where a scalar is required
    #[serde(rename = "STRUCTURAL_ERROR")]
    Structural,

    /// Identifier fails its required pattern, or is declared twice
    #[serde(rename = "NAME_ERROR")]
    Name,

    /// Wrong column kind, unrecognized size token, non-integer where integer required
    #[serde(rename = "TYPE_ERROR")]
    Type,

    /// Numeric value outside computed or absolute bounds
    #[serde(rename = "RANGE_ERROR")]
    Range,

    /// Unresolved FK target, duplicate code/name, unknown default code
    #[serde(rename = "REFERENCE_ERROR")]
    Reference,
}

impl ErrorKind {
    /// Get the error code as a stable string identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Structural => "STRUCTURAL_ERROR",
            Self::Name => "NAME_ERROR",
            Self::Type => "TYPE_ERROR",
            Self::Range => "RANGE_ERROR",
            Self::Reference => "REFERENCE_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where in the schema document an error was raised
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Database name
    pub database: Option<String>,

    /// Table name
    pub table: Option<String>,

    /// Column name
    pub column: Option<String>,
}

impl Location {
    /// Location of a whole database
    pub fn database(database: impl Into<String>) -> Self {
        Self {
            database: Some(database.into()),
            table: None,
            column: None,
        }
    }

    /// Location of a table
    pub fn table(database: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            database: Some(database.into()),
            table: Some(table.into()),
            column: None,
        }
    }

    /// Location of a column
    pub fn column(
        database: impl Into<String>,
        table: impl Into<String>,
        column: impl Into<String>,
    ) -> Self {
        Self {
            database: Some(database.into()),
            table: Some(table.into()),
            column: Some(column.into()),
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<&str> = [&self.database, &self.table, &self.column]
            .into_iter()
            .filter_map(|p| p.as_deref())
            .collect();
        write!(f, "{}", parts.join("."))
    }
}

/// A fatal schema compile error
///
/// Errors are never aggregated: the first violation aborts the file.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}{}: {message}", render_location(.location))]
pub struct SchemaError {
    /// Error kind
    pub kind: ErrorKind,

    /// Human-readable message
    pub message: String,

    /// Offending declaration (best-effort)
    pub location: Option<Location>,
}

fn render_location(location: &Option<Location>) -> String {
    match location {
        Some(loc) => format!(" in {}", loc),
        None => String::new(),
    }
}

impl SchemaError {
    /// Create a new error without location
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            location: None,
        }
    }

    pub fn structural(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Structural, message)
    }

    pub fn name(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Name, message)
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Type, message)
    }

    pub fn range(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Range, message)
    }

    pub fn reference(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Reference, message)
    }

    /// Attach a location unless one is already set
    ///
    /// Inner validators know nothing about where they run; the innermost
    /// caller that does know wins.
    pub fn at(mut self, location: Location) -> Self {
        if self.location.is_none() {
            self.location = Some(location);
        }
        self
    }
}

/// Result alias for schema compilation
pub type Result<T, E = SchemaError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_code_stability() {
        assert_eq!(ErrorKind::Structural.as_str(), "STRUCTURAL_ERROR");
        assert_eq!(ErrorKind::Reference.as_str(), "REFERENCE_ERROR");
    }

    #[test]
    fn display_includes_location() {
        let err = SchemaError::range("minValue -1 below 0")
            .at(Location::column("app", "users", "age"));
        assert_eq!(err.to_string(), "RANGE_ERROR in app.users.age: minValue -1 below 0");

        let bare = SchemaError::name("bad name");
        assert_eq!(bare.to_string(), "NAME_ERROR: bad name");
    }

    #[test]
    fn innermost_location_wins() {
        let err = SchemaError::reference("missing")
            .at(Location::column("app", "orders", "userId"))
            .at(Location::table("app", "orders"));
        assert_eq!(err.location, Some(Location::column("app", "orders", "userId")));
    }

    #[test]
    fn kind_serialization() {
        let json = serde_json::to_string(&ErrorKind::Type).unwrap();
        assert_eq!(json, "\"TYPE_ERROR\"");
    }
}
