//! Schema Validation Gate
//!
//! Validation runs only when the caller supplies a validator, before any
//! parsing, and is strictly pass/fail: a setup failure or a non-zero
//! validation result aborts the load without partial validation. The
//! grammar engine itself (RelaxNG or otherwise) is an external
//! collaborator behind this trait.

use thiserror::Error;

/// Outcome of the external schema gate.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The grammar context could not be built (parser, compiled grammar,
    /// or validation context construction failed).
    #[error("schema setup failed: {0}")]
    Setup(String),

    /// Validation ran and reported a non-zero result code.
    #[error("document failed validation: result {0}")]
    Invalid(i32),
}

/// Validates a text document against a grammar before parsing.
pub trait SchemaValidator {
    fn validate(&self, doc: &str) -> Result<(), SchemaError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AlwaysValid;
    impl SchemaValidator for AlwaysValid {
        fn validate(&self, _doc: &str) -> Result<(), SchemaError> {
            Ok(())
        }
    }

    #[test]
    fn test_gate_passes() {
        assert!(AlwaysValid.validate("<IccProfile/>").is_ok());
    }
}
