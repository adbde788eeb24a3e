//! Typed failures for the decomposition core.

/// Why a processor-count request could not be satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RequestFailure {
    /// The requested upper bound was zero.
    #[error("max_processors must be > 0")]
    NonPositiveBound,
    /// No count in `[1, max_processors]` admits a valid split.
    #[error("no processor count admits a valid split")]
    NoValidDecomposition,
}

/// Errors raised while reading a mesh topology or searching for a decomposition.
///
/// Both kinds are terminal for the step in which they occur: callers must not
/// launch a parallel job after either.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecompositionError {
    #[error("malformed mesh topology: field '{field}' {reason}")]
    MalformedTopology { field: String, reason: String },

    #[error("invalid processor request (max_processors={max_processors}): {reason}")]
    InvalidRequest {
        max_processors: u32,
        reason: RequestFailure,
    },
}

impl DecompositionError {
    pub(crate) fn malformed(field: &str, reason: impl Into<String>) -> Self {
        DecompositionError::MalformedTopology {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_request_names_bound_and_reason() {
        let err = DecompositionError::InvalidRequest {
            max_processors: 0,
            reason: RequestFailure::NonPositiveBound,
        };
        assert_eq!(
            err.to_string(),
            "invalid processor request (max_processors=0): max_processors must be > 0"
        );
        assert_eq!(
            RequestFailure::NoValidDecomposition.to_string(),
            "no processor count admits a valid split"
        );
    }
}
