//! Per-file pipeline
//!
//! Parse, validate and render one schema document entirely in memory.
//! Nothing here touches the filesystem.

use schemac_core::{compile_json, DescriptorConfig, SchemaError, SqlConfig};
use schemac_descriptor::DescriptorEmitter;
use schemac_sql::SqlEmitter;

use crate::artifact::Artifact;

/// Which emitter a run drives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Sql,
    Descriptor,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sql => "sql",
            Self::Descriptor => "descriptor",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Compile a document into one `<schema>.<namespace>.sql` per database
pub fn compile_sql(schema: &str, json: &str, config: &SqlConfig) -> Result<Vec<Artifact>, SchemaError> {
    let compiled = compile_json(json)?;
    let emitter = SqlEmitter::new(config.clone());

    Ok(emitter
        .emit_schema(&compiled)
        .into_iter()
        .map(|(kind, script)| {
            Artifact::new(format!("{}.{}.sql", schema, kind.namespace()), script.render())
        })
        .collect())
}

/// Compile a document into a single `<schema>.<extension>` module
pub fn compile_descriptor(
    schema: &str,
    json: &str,
    config: &DescriptorConfig,
) -> Result<Vec<Artifact>, SchemaError> {
    let compiled = compile_json(json)?;
    let descriptor = DescriptorEmitter::new().emit(&compiled)?;

    Ok(vec![Artifact::new(
        format!("{}.{}", schema, config.extension),
        descriptor.render(),
    )])
}
