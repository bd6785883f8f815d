//! Errores específicos del store de metadatos (simples por ahora).

use thiserror::Error;

use crate::value::ValueKind;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum MetaError {
    #[error("value kind mismatch on key '{key}': expected {expected:?}, got {got:?}")]
    KindMismatch { key: String, expected: ValueKind, got: ValueKind },
    #[error("key '{0}' does not hold a vector value")] NotAVector(String),
    #[error("internal: {0}")] Internal(String),
}
