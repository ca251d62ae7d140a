#![forbid(unsafe_code)]
//! trigvis-core: record model, opcode dictionaries, and diagnostics.
//!
//! # Conventions
//!
//! - **Errors**: typed `thiserror` enums at the load boundaries
//!   ([`records::RecordError`], [`dict::DictError`]). Everything past
//!   ingestion reports through [`diag::DiagnosticReport`] instead of
//!   failing — a bad record never aborts a build.
//! - **Logging**: `tracing` macros (`info!`, `warn!`, `debug!`, `trace!`).

pub mod describe;
pub mod diag;
pub mod dict;
pub mod model;
pub mod records;

pub use diag::{Diagnostic, DiagnosticReport, Severity};
pub use dict::OpcodeDict;
pub use model::{
    Action, Condition, LocalId, LocalVariable, MapScript, ParamValue, Trigger, TriggerId,
};
