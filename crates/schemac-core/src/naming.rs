//! Identifier patterns

use regex::Regex;
use std::sync::LazyLock;

use crate::error::{Result, SchemaError};

static DATABASE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z_][a-z0-9_]*$").unwrap()
});
static TABLE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z_]+$").unwrap()
});
static COLUMN_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z][a-zA-Z0-9]+$").unwrap()
});
static CODE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z0-9_]+$").unwrap()
});
// Same key pattern the schema storage service enforces
static SCHEMA_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9\-_.]{1,100}$").unwrap()
});

fn check(pattern: &Regex, what: &str, name: &str) -> Result<()> {
    if pattern.is_match(name) {
        Ok(())
    } else {
        Err(SchemaError::name(format!(
            "{} name '{}' does not match {}",
            what,
            name,
            pattern.as_str()
        )))
    }
}

pub fn check_database_name(name: &str) -> Result<()> {
    check(&DATABASE_NAME, "database", name)
}

pub fn check_table_name(name: &str) -> Result<()> {
    check(&TABLE_NAME, "table", name)
}

pub fn check_column_name(name: &str) -> Result<()> {
    check(&COLUMN_NAME, "column", name)
}

pub fn check_code_name(name: &str) -> Result<()> {
    check(&CODE_NAME, "code", name)
}

/// Whether a schema document name is a valid storage key
pub fn is_valid_schema_name(name: &str) -> bool {
    SCHEMA_NAME.is_match(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn table_names() {
        assert!(check_table_name("user_accounts").is_ok());
        assert_eq!(check_table_name("UserAccounts").unwrap_err().kind, ErrorKind::Name);
        assert!(check_table_name("users2").is_err());
        assert!(check_table_name("").is_err());
    }

    #[test]
    fn column_names() {
        assert!(check_column_name("userId").is_ok());
        assert!(check_column_name("id").is_ok());
        assert!(check_column_name("x").is_err());
        assert!(check_column_name("user_id").is_err());
        assert!(check_column_name("Id").is_err());
    }

    #[test]
    fn code_names() {
        assert!(check_code_name("ACTIVE_2").is_ok());
        assert!(check_code_name("Active").is_err());
    }

    #[test]
    fn schema_names() {
        assert!(is_valid_schema_name("billing-v2.main"));
        assert!(!is_valid_schema_name("Billing"));
        assert!(!is_valid_schema_name(&"a".repeat(101)));
    }
}
