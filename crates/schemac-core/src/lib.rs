//! schemac core
//!
//! Schema document model, per-kind column validation, foreign key
//! resolution, and the compile pass shared by both emitters.
//! Never rename error codes - they are part of the public API.

pub mod column;
pub mod config;
pub mod error;
pub mod model;
pub mod naming;
pub mod report;
pub mod resolver;
pub mod schema;
pub mod validate;

pub use column::{
    Bounds, CodeDomain, CodeValue, Column, ColumnType, DefaultValue, ForeignKey, IntegerSize,
    OnDelete, BIGINT_CEILING, MAX_SAFE_INTEGER,
};
pub use config::{Config, ConfigError, DescriptorConfig, SqlConfig};
pub use error::{ErrorKind, Location, SchemaError};
pub use model::{ColumnDecl, DatabaseDecl, SchemaDocument, TableDecl};
pub use report::{ArtifactDigest, Outcome, Report, ReportVersion};
pub use resolver::ForeignKeyResolver;
pub use schema::{
    compile, compile_json, CompiledDatabase, CompiledSchema, CompiledTable, DatabaseKind, Index,
    IndexKind,
};
