//! Envelope validation errors
//!
//! Parse failures are never fatal: the engine logs them and treats the
//! envelope as irrelevant.

/// Errors produced while validating a raw notification envelope
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnvelopeError {
    /// A header required by the update type is absent
    #[error("missing header: {0}")]
    MissingHeader(&'static str),

    /// A header is present but not of the expected shape
    #[error("malformed header {name}: {reason}")]
    MalformedHeader {
        /// Header name
        name: &'static str,
        /// What was wrong with it
        reason: String,
    },

    /// The update type is not one this client knows about
    #[error("unrecognized update type: {0}")]
    UnrecognizedUpdateType(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_error_display() {
        let err = EnvelopeError::MissingHeader("updateType");
        assert!(err.to_string().contains("updateType"));

        let err = EnvelopeError::MalformedHeader {
            name: "node",
            reason: "not a uuid".to_string(),
        };
        assert!(err.to_string().contains("not a uuid"));
    }
}
