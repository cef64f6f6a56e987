//! Structured DDL statements
//!
//! The emitter builds these nodes first and renders text last, so statement
//! order and statement text can be tested separately.

use std::fmt;

/// Backtick-quoted identifier, inner backticks doubled
pub fn quote_ident(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

fn ident_list(names: &[String]) -> String {
    names
        .iter()
        .map(|n| quote_ident(n))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Type clause of one column definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeClause {
    /// Base type, e.g. `TINYINT` or `VARCHAR(50)`
    pub data_type: String,
    pub unsigned: bool,
    pub not_null: bool,
    /// Rendered literal
    pub default: Option<String>,
    pub auto_increment: bool,
}

impl fmt::Display for TypeClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.data_type)?;
        if self.unsigned {
            write!(f, " UNSIGNED")?;
        }
        if self.not_null {
            write!(f, " NOT NULL")?;
        }
        if let Some(default) = &self.default {
            write!(f, " DEFAULT {}", default)?;
        }
        if self.auto_increment {
            write!(f, " AUTO_INCREMENT")?;
        }
        Ok(())
    }
}

/// `<name> <type-clause>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDefinition {
    pub name: String,
    pub type_clause: TypeClause,
}

impl fmt::Display for ColumnDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", quote_ident(&self.name), self.type_clause)
    }
}

/// Index and foreign key clauses
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableConstraint {
    PrimaryKey(Vec<String>),
    Unique(Vec<String>),
    Index(Vec<String>),
    ForeignKey {
        column: String,
        /// Qualifier for targets in another database
        database: Option<String>,
        table: String,
        target: String,
        on_delete: String,
    },
}

impl fmt::Display for TableConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PrimaryKey(columns) => write!(f, "PRIMARY KEY ({})", ident_list(columns)),
            Self::Unique(columns) => write!(f, "UNIQUE KEY ({})", ident_list(columns)),
            Self::Index(columns) => write!(f, "INDEX ({})", ident_list(columns)),
            Self::ForeignKey {
                column,
                database,
                table,
                target,
                on_delete,
            } => {
                write!(f, "FOREIGN KEY ({}) REFERENCES ", quote_ident(column))?;
                if let Some(database) = database {
                    write!(f, "{}.", quote_ident(database))?;
                }
                write!(
                    f,
                    "{} ({}) ON DELETE {}",
                    quote_ident(table),
                    quote_ident(target),
                    on_delete
                )
            }
        }
    }
}

/// `CREATE TABLE` with its column and constraint clauses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTable {
    pub name: String,
    pub columns: Vec<ColumnDefinition>,
    pub constraints: Vec<TableConstraint>,
}

impl fmt::Display for CreateTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let clauses: Vec<String> = self
            .columns
            .iter()
            .map(ToString::to_string)
            .chain(self.constraints.iter().map(ToString::to_string))
            .collect();
        write!(
            f,
            "CREATE TABLE {} ({})",
            quote_ident(&self.name),
            clauses.join(", ")
        )
    }
}

/// One DDL statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlStatement {
    CreateDatabase {
        name: String,
        charset: String,
        collation: String,
    },
    Use(String),
    CreateTable(CreateTable),
}

impl fmt::Display for SqlStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateDatabase {
                name,
                charset,
                collation,
            } => write!(
                f,
                "CREATE DATABASE {} CHARACTER SET {} COLLATE {};",
                quote_ident(name),
                charset,
                collation
            ),
            Self::Use(name) => write!(f, "USE {};", quote_ident(name)),
            Self::CreateTable(table) => write!(f, "{};", table),
        }
    }
}

/// Ordered statements for one database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlScript {
    pub statements: Vec<SqlStatement>,
}

impl SqlScript {
    /// Render one statement per line
    pub fn render(&self) -> String {
        let mut out = String::new();
        for statement in &self.statements {
            out.push_str(&statement.to_string());
            out.push('\n');
        }
        out
    }

    /// The `CREATE TABLE` statements, in order
    pub fn tables(&self) -> impl Iterator<Item = &CreateTable> {
        self.statements.iter().filter_map(|s| match s {
            SqlStatement::CreateTable(table) => Some(table),
            _ => None,
        })
    }
}
