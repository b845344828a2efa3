//! Error taxonomy for failures that cross an external boundary.
//!
//! Programmer-contract violations (adding to a sealed module, setting a
//! continuation's application twice, serializing a struct with no field
//! list) are not represented here — they abort via `panic!` at the call
//! site, per the "no retry, no recovery" error model this system uses.
//! `CoreError` only covers interactions with the outside world: a
//! malformed document read back from disk, or a child-process toolchain
//! that exited non-zero.

use std::path::PathBuf;

/// Failures originating outside the builder itself.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("failed to read module document at {path}: {source}")]
    ReadDocument {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write module document at {path}: {source}")]
    WriteDocument {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed module document: {0}")]
    MalformedDocument(#[from] serde_json::Error),

    #[error("imported entry of kind `{kind}` is missing required field `{field}`")]
    MissingField { kind: String, field: String },

    #[error("imported type table references unknown name `{0}`")]
    UnknownTypeName(String),

    #[error("imported type entry has unrecognized kind `{0}`")]
    UnknownTypeKind(String),

    #[error("external front-end `{tool}` failed to produce a module document: {reason}")]
    FrontEndFailed { tool: String, reason: String },

    #[error("external toolchain step `{step}` exited with status {status}: {stderr}")]
    ToolchainFailed {
        step: String,
        status: String,
        stderr: String,
    },

    #[error("failed to spawn external toolchain step `{step}`: {source}")]
    ToolchainSpawn {
        step: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, CoreError>;
