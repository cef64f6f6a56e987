//! SQL emission
//!
//! This crate handles:
//! - Mapping validated columns to MySQL type clauses
//! - Rendering index and foreign key clauses
//! - Building ordered `CREATE DATABASE` / `USE` / `CREATE TABLE` scripts

pub mod emitter;
pub mod statement;

pub use emitter::{type_clause, SqlEmitter};
pub use statement::{
    quote_ident, ColumnDefinition, CreateTable, SqlScript, SqlStatement, TableConstraint,
    TypeClause,
};
