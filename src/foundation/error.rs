/// Convenience result type used across Choreo.
pub type ChoreoResult<T> = Result<T, ChoreoError>;

/// Top-level error taxonomy used by compiler APIs.
#[derive(thiserror::Error, Debug)]
pub enum ChoreoError {
    /// A caller-supplied argument (sample count, range, epsilon) is out of its domain.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A template, step, pattern, pose or fixture id that nothing defines.
    #[error("unknown {kind} '{id}' (valid: {ids})", ids = .valid.join(", "))]
    UnknownIdentifier {
        kind: &'static str,
        id: String,
        valid: Vec<String>,
    },

    /// Invalid template, contract or show plan data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ChoreoError {
    /// Build a [`ChoreoError::InvalidArgument`] value.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Build a [`ChoreoError::UnknownIdentifier`] value; `valid` is sorted and deduplicated.
    pub fn unknown<I, S>(kind: &'static str, id: impl Into<String>, valid: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut valid: Vec<String> = valid.into_iter().map(Into::into).collect();
        valid.sort();
        valid.dedup();
        Self::UnknownIdentifier {
            kind,
            id: id.into(),
            valid,
        }
    }

    /// Build a [`ChoreoError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ChoreoError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
