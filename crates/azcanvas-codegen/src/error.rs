//! Error types for code generation
//!
//! Assembly itself never fails; these cover reading documents back and
//! hashing assembly inputs.

/// Codegen errors
#[derive(Debug, thiserror::Error)]
pub enum CodegenError {
    /// Generated text could not be read back
    #[error("parse error at line {line}: {reason}")]
    Parse { line: usize, reason: String },

    /// Hash string of the wrong length
    #[error("invalid hash length: expected {expected}, got {actual}")]
    InvalidHashLength { expected: usize, actual: usize },

    /// Hash string is not hex
    #[error("hex decode error: {0}")]
    HexDecode(#[from] hex::FromHexError),

    /// Input could not be serialized for hashing
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
