use thiserror::Error;

/// Failures raised by the scoring path.
///
/// A term missing from the collection is not an error; it contributes zero.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoreError {
    /// A scoring input violates a mathematical precondition.
    #[error("domain error: {0}")]
    Domain(String),
    /// The divergence shape parameter has no closed form.
    #[error("unsupported divergence shape m={m}; supported values are 1, 2 or m > 2")]
    UnsupportedShape { m: f64 },
}

impl ScoreError {
    pub(crate) fn domain(msg: impl Into<String>) -> Self {
        ScoreError::Domain(msg.into())
    }
}
