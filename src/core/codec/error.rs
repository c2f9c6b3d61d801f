//! Codec 错误类型定义

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("encodeRow error: data and column count not match {columns} vs {values}")]
    SchemaMismatch { columns: usize, values: usize },

    #[error("Value corrupt: {0}")]
    ValueCorrupt(String),

    #[error("Malformed key: {0}")]
    MalformedKey(String),

    #[error("Unsupported data type: {0}")]
    UnsupportedType(String),

    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CodecError {
    pub fn corrupt(msg: impl Into<String>) -> Self {
        CodecError::ValueCorrupt(msg.into())
    }
}

pub type CodecResult<T> = std::result::Result<T, CodecError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_mismatch_message_names_both_counts() {
        let err = CodecError::SchemaMismatch { columns: 3, values: 2 };
        assert_eq!(
            err.to_string(),
            "encodeRow error: data and column count not match 3 vs 2"
        );
    }
}
