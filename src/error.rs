use std::fmt;

/// Precondition violations rejected before any sampling begins.
///
/// Mirrors the teacher's `graph::io_error` pattern: a small hand-written
/// error type with a manual `Display`/`Error` impl rather than a derive
/// macro, since nothing heavier is needed here.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationError {
    /// `n == 0`, or a seed/weight/position slice has the wrong length.
    EmptyOrMismatchedInput { what: &'static str },
    /// A temperature/exponent argument was out of its valid domain.
    InvalidTemperature { t: f64 },
    /// `alpha <= 0`, `ple <= 1`, or a similar shape parameter was invalid.
    InvalidShapeParameter { name: &'static str, value: f64 },
    /// `radius <= 0`, or a radius/weight bound was non-positive.
    InvalidBound { name: &'static str, value: f64 },
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationError::EmptyOrMismatchedInput { what } => {
                write!(f, "invalid input: {what}")
            }
            GenerationError::InvalidTemperature { t } => {
                write!(f, "temperature must be >= 0, got {t}")
            }
            GenerationError::InvalidShapeParameter { name, value } => {
                write!(f, "shape parameter `{name}` out of domain: {value}")
            }
            GenerationError::InvalidBound { name, value } => {
                write!(f, "`{name}` must be positive, got {value}")
            }
        }
    }
}

impl std::error::Error for GenerationError {}

pub type Result<T> = std::result::Result<T, GenerationError>;
