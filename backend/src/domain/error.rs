//! Domain-level error types.
//!
//! These errors are transport agnostic. Binaries map them to process exit
//! codes and log lines; services produce them from port-specific errors.

/// Stable machine-readable error code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorCode {
    /// The request is malformed or fails validation.
    InvalidRequest,
    /// The upstream event feed could not be fetched or decoded.
    Fetch,
    /// A transactional write to the event store failed and was rolled back.
    Write,
    /// The reference dataset path does not exist.
    Path,
    /// The reference dataset exists but could not be read or decoded.
    Dataset,
    /// Required reference attributes are missing or malformed.
    Schema,
    /// The declared coordinate reference system cannot be normalised.
    Projection,
    /// A reference geometry is missing, non-polygonal, or unrepairable.
    Geometry,
    /// Replacing the reference table failed; its state must be verified.
    Replace,
    /// The store could not be reached.
    ServiceUnavailable,
    /// An unexpected error occurred inside the domain.
    InternalError,
}

/// Domain error payload.
///
/// ## Invariants
/// - `message` must be non-empty once trimmed of whitespace.
///
/// # Examples
/// ```
/// use risk_signals::domain::{Error, ErrorCode};
///
/// let err = Error::schema("missing NAME column");
/// assert_eq!(err.code(), ErrorCode::Schema);
/// assert!(!err.affects_reference_table());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    code: ErrorCode,
    message: String,
}

/// Validation errors emitted by the constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ErrorValidationError {
    /// The message was empty after trimming.
    #[error("error message must not be empty")]
    EmptyMessage,
}

const FALLBACK_MESSAGE: &str = "unspecified failure";

impl Error {
    /// Create a new error; blank messages are replaced with a placeholder.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::try_new(code, message).unwrap_or_else(|_| Self {
            code,
            message: FALLBACK_MESSAGE.to_owned(),
        })
    }

    /// Fallible constructor that validates the message content.
    pub fn try_new(
        code: ErrorCode,
        message: impl Into<String>,
    ) -> Result<Self, ErrorValidationError> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(ErrorValidationError::EmptyMessage);
        }
        Ok(Self { code, message })
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Whether the reference table may have been touched before failing.
    ///
    /// Only [`ErrorCode::Replace`] is raised after table mutation begins.
    pub fn affects_reference_table(&self) -> bool {
        self.code == ErrorCode::Replace
    }

    /// Convenience constructor for [`ErrorCode::InvalidRequest`].
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// Convenience constructor for [`ErrorCode::Fetch`].
    pub fn fetch(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Fetch, message)
    }

    /// Convenience constructor for [`ErrorCode::Write`].
    pub fn write(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Write, message)
    }

    /// Convenience constructor for [`ErrorCode::Path`].
    pub fn path(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Path, message)
    }

    /// Convenience constructor for [`ErrorCode::Dataset`].
    pub fn dataset(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Dataset, message)
    }

    /// Convenience constructor for [`ErrorCode::Schema`].
    pub fn schema(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Schema, message)
    }

    /// Convenience constructor for [`ErrorCode::Projection`].
    pub fn projection(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Projection, message)
    }

    /// Convenience constructor for [`ErrorCode::Geometry`].
    pub fn geometry(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Geometry, message)
    }

    /// Convenience constructor for [`ErrorCode::Replace`].
    pub fn replace(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Replace, message)
    }

    /// Convenience constructor for [`ErrorCode::ServiceUnavailable`].
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }

    /// Convenience constructor for [`ErrorCode::InternalError`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}
