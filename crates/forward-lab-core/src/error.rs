use thiserror::Error;

#[derive(Debug, Error)]
pub enum ForwardLabError {
    /// Input text could not be decoded at all.
    #[error("Format error: {0}")]
    Format(String),

    /// Decoded, but the shape is wrong (not a list, missing fields).
    #[error("Structure error: {field} — {reason}")]
    Structure { field: String, reason: String },

    /// Field present but of the wrong kind (non-numeric, boolean, non-integer).
    #[error("Type error: {field} — {reason}")]
    TypeKind { field: String, reason: String },

    /// Well-typed but financially or mathematically invalid.
    #[error("Domain error: {field} — {reason}")]
    Domain { field: String, reason: String },

    #[error("Arithmetic overflow in {context}")]
    ArithmeticOverflow { context: String },
}

impl ForwardLabError {
    pub(crate) fn domain(field: &str, reason: impl Into<String>) -> Self {
        ForwardLabError::Domain {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn type_kind(field: &str, reason: impl Into<String>) -> Self {
        ForwardLabError::TypeKind {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn structure(field: &str, reason: impl Into<String>) -> Self {
        ForwardLabError::Structure {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn overflow(context: impl Into<String>) -> Self {
        ForwardLabError::ArithmeticOverflow {
            context: context.into(),
        }
    }
}

impl From<serde_json::Error> for ForwardLabError {
    fn from(e: serde_json::Error) -> Self {
        ForwardLabError::Format(e.to_string())
    }
}
