//! Batch runs over an input directory
//!
//! Each `<schema>.json` file is compiled on its own. A failing file is
//! recorded in the report and the batch moves on.

use std::fs;
use std::path::{Path, PathBuf};

use schemac_core::naming::is_valid_schema_name;
use schemac_core::{Config, Outcome, Report};
use walkdir::WalkDir;

use crate::artifact::write_atomically;
use crate::error::EngineError;
use crate::pipeline::{compile_descriptor, compile_sql, Mode};

/// A schema document found in the input directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Input {
    /// File stem
    pub schema: String,
    pub path: PathBuf,
}

impl Input {
    /// Whether the stem is a usable schema name
    pub fn has_valid_name(&self) -> bool {
        is_valid_schema_name(&self.schema)
    }
}

/// List every `*.json` file directly inside `dir`, in file-name order
pub fn discover_inputs(dir: &Path) -> Result<Vec<Input>, EngineError> {
    let mut inputs = Vec::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().map_or(true, |ext| ext != "json") {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        inputs.push(Input {
            schema: stem.to_string(),
            path: path.to_path_buf(),
        });
    }

    Ok(inputs)
}

/// Compile every input of `input_dir` into `output_dir`
///
/// Only failures to list the input directory or create the output directory
/// abort the run. Everything else ends up in the returned report.
pub fn run_batch(
    mode: Mode,
    input_dir: &Path,
    output_dir: &Path,
    config: &Config,
) -> Result<Report, EngineError> {
    let inputs = discover_inputs(input_dir)?;
    fs::create_dir_all(output_dir).map_err(|e| EngineError::io(output_dir, e))?;

    let mut report = Report::new(mode.as_str());
    for input in &inputs {
        let outcome = run_one(mode, input, output_dir, config);
        match &outcome {
            Outcome::Compiled { artifacts } => {
                tracing::info!(schema = %input.schema, artifacts = artifacts.len(), "compiled");
            }
            Outcome::Skipped { reason } => {
                tracing::warn!(file = %input.path.display(), "skipped: {}", reason);
            }
            Outcome::Failed { message, .. } => {
                tracing::warn!(schema = %input.schema, "failed: {}", message);
            }
        }
        report.add(&input.schema, outcome);
    }

    Ok(report)
}

fn run_one(mode: Mode, input: &Input, output_dir: &Path, config: &Config) -> Outcome {
    if !input.has_valid_name() {
        return Outcome::Skipped {
            reason: format!("'{}' is not a valid schema name", input.schema),
        };
    }

    let json = match fs::read_to_string(&input.path) {
        Ok(json) => json,
        Err(e) => return Outcome::from_other_error(EngineError::io(&input.path, e).to_string()),
    };

    let compiled = match mode {
        Mode::Sql => compile_sql(&input.schema, &json, &config.sql),
        Mode::Descriptor => compile_descriptor(&input.schema, &json, &config.descriptor),
    };
    let artifacts = match compiled {
        Ok(artifacts) => artifacts,
        Err(e) => return Outcome::from_schema_error(&e),
    };

    match write_atomically(output_dir, &artifacts) {
        Ok(artifacts) => Outcome::Compiled { artifacts },
        Err(e) => Outcome::from_other_error(e.to_string()),
    }
}
