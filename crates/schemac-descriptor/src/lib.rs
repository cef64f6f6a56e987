//! Descriptor emission
//!
//! This crate handles:
//! - Flattening validated tables and columns into descriptor records
//! - Building code lookups for `code` columns
//! - Rendering the frozen, minified ES module

pub mod emitter;
pub mod record;
pub mod render;

pub use emitter::DescriptorEmitter;
pub use record::{ColumnRecord, DatabaseRecord, Descriptor, FieldValue, Scalar, TableRecord};
