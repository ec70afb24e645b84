//! Validation error types

use std::fmt;

/// Validation error for user payloads
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// `nombre` or `email` missing or blank after trimming
    MissingRequired,

    /// Field exceeds maximum length
    TooLong { field: &'static str, max: usize },

    /// Request body could not be decoded
    MalformedBody { reason: String },

    /// Path id is not a positive integer
    InvalidId { value: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingRequired => write!(f, "Nombre y email son requeridos"),
            Self::TooLong { field, max } => {
                write!(f, "{} excede el máximo de {} caracteres", field, max)
            }
            Self::MalformedBody { reason } => write!(f, "Cuerpo de solicitud inválido: {}", reason),
            Self::InvalidId { .. } => write!(f, "ID de usuario inválido"),
        }
    }
}

impl std::error::Error for ValidationError {}
