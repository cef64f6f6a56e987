//! schemac engine - per-file pipeline
//!
//! This crate implements the driving logic around the emitters:
//! - Compiling one schema document into its artifacts
//! - Writing artifacts atomically
//! - Discovering input files and running a batch into a report

pub mod artifact;
pub mod batch;
pub mod error;
pub mod pipeline;

pub use artifact::{write_atomically, Artifact};
pub use batch::{discover_inputs, run_batch, Input};
pub use error::EngineError;
pub use pipeline::{compile_descriptor, compile_sql, Mode};
