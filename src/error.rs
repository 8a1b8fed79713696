//! Unified error types for quote-scorer.
//!
//! Scoring itself is total over business data: missing enrichment degrades
//! scores and confidence, it never produces an error. The variants below
//! cover the few genuinely fatal situations (malformed scoring context,
//! unreadable input files, invalid configuration) plus the ML-provider
//! failures that the orchestrator catches and logs.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for quote-scorer operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ScoringError {
    /// The scoring context cannot be used to weight axes
    #[error("Invalid scoring context: {context}")]
    Context {
        context: String,
        #[source]
        source: ContextErrorKind,
    },

    /// The ML adjustment provider failed (never fatal inside the engine)
    #[error("ML adjustment failed: {context}")]
    Ml {
        context: String,
        #[source]
        source: MlErrorKind,
    },

    /// Input documents (quote, enrichment, context) could not be loaded
    #[error("Failed to load input: {context}")]
    Input {
        context: String,
        #[source]
        source: InputErrorKind,
    },

    /// IO errors with context
    #[error("IO error at {path:?}: {message}")]
    Io {
        path: Option<PathBuf>,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration errors
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Specific context error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ContextErrorKind {
    #[error("Unknown profile '{0}' (expected B2C or B2B)")]
    UnknownProfile(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Specific ML provider error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum MlErrorKind {
    #[error("Provider unavailable: {0}")]
    Unavailable(String),

    #[error("Prediction timed out after {0} ms")]
    Timeout(u64),

    #[error("Prediction failed: {0}")]
    PredictionFailed(String),

    #[error("Invalid prediction: {0}")]
    InvalidPrediction(String),
}

/// Specific input error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum InputErrorKind {
    #[error("Invalid JSON structure: {0}")]
    InvalidJson(String),
}

// ============================================================================
// Result type alias
// ============================================================================

/// Convenient Result type for quote-scorer operations
pub type Result<T> = std::result::Result<T, ScoringError>;

// ============================================================================
// Error construction helpers
// ============================================================================

impl ScoringError {
    /// Create a context error
    pub fn context(context: impl Into<String>, source: ContextErrorKind) -> Self {
        Self::Context {
            context: context.into(),
            source,
        }
    }

    /// Create a context error for an unknown profile string
    pub fn unknown_profile(profile: impl Into<String>) -> Self {
        Self::context("resolving profile", ContextErrorKind::UnknownProfile(profile.into()))
    }

    /// Create a context error for a missing required field
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::context(
            "missing required field",
            ContextErrorKind::MissingField(field.into()),
        )
    }

    /// Create a context error for an invalid field value
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::context(
            "invalid field value",
            ContextErrorKind::InvalidValue {
                field: field.into(),
                message: message.into(),
            },
        )
    }

    /// Create an ML error
    pub fn ml(context: impl Into<String>, source: MlErrorKind) -> Self {
        Self::Ml {
            context: context.into(),
            source,
        }
    }

    /// Create an input error
    pub fn input(context: impl Into<String>, source: InputErrorKind) -> Self {
        Self::Input {
            context: context.into(),
            source,
        }
    }

    /// Create an IO error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        let message = format!("{source}");
        Self::Io {
            path: Some(path),
            message,
            source,
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

// ============================================================================
// Conversions from existing error types
// ============================================================================

impl From<std::io::Error> for ScoringError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            path: None,
            message: format!("{err}"),
            source: err,
        }
    }
}

impl From<serde_json::Error> for ScoringError {
    fn from(err: serde_json::Error) -> Self {
        Self::input(
            "JSON deserialization",
            InputErrorKind::InvalidJson(err.to_string()),
        )
    }
}

// ============================================================================
// Error context extension trait
// ============================================================================

/// Extension trait for adding context to errors.
///
/// The context string is prepended to the error's existing context, so a
/// failure deep in input loading reads as `"loading quote: JSON deserialization"`.
pub trait ErrorContext<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context from a closure, evaluated only on error.
    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T, E: Into<ScoringError>> ErrorContext<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        let ctx: String = context.into();
        self.map_err(|e| add_context_to_error(e.into(), &ctx))
    }

    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.map_err(|e| {
            let ctx: String = f().into();
            add_context_to_error(e.into(), &ctx)
        })
    }
}

/// Add context to an error, chaining with any existing context.
fn add_context_to_error(err: ScoringError, new_ctx: &str) -> ScoringError {
    match err {
        ScoringError::Context {
            context: existing,
            source,
        } => ScoringError::Context {
            context: chain_context(new_ctx, &existing),
            source,
        },
        ScoringError::Ml {
            context: existing,
            source,
        } => ScoringError::Ml {
            context: chain_context(new_ctx, &existing),
            source,
        },
        ScoringError::Input {
            context: existing,
            source,
        } => ScoringError::Input {
            context: chain_context(new_ctx, &existing),
            source,
        },
        ScoringError::Io {
            path,
            message,
            source,
        } => ScoringError::Io {
            path,
            message: chain_context(new_ctx, &message),
            source,
        },
        ScoringError::Config(msg) => ScoringError::Config(chain_context(new_ctx, &msg)),
    }
}

/// Chain two context strings together as `"new: existing"`.
fn chain_context(new: &str, existing: &str) -> String {
    if existing.is_empty() {
        new.to_string()
    } else {
        format!("{new}: {existing}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ScoringError::unknown_profile("B2G");
        let display = err.to_string();
        assert!(
            display.contains("scoring context"),
            "Error message should mention the context: {}",
            display
        );

        let err = ScoringError::missing_field("projectType");
        let source = std::error::Error::source(&err).map(ToString::to_string);
        assert_eq!(
            source.as_deref(),
            Some("Missing required field: projectType")
        );
    }

    #[test]
    fn test_io_error_keeps_path() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = ScoringError::io("/path/to/quote.json", io_err);

        assert!(err.to_string().contains("/path/to/quote.json"));
    }

    #[test]
    fn test_context_chaining_multiple_levels() {
        fn inner() -> Result<()> {
            Err(ScoringError::input(
                "base",
                InputErrorKind::InvalidJson("expected an object".to_string()),
            ))
        }

        fn middle() -> Result<()> {
            inner().context("middle layer")
        }

        fn outer() -> Result<()> {
            middle().context("outer layer")
        }

        match outer() {
            Err(ScoringError::Input { context, .. }) => {
                assert_eq!(context, "outer layer: middle layer: base");
            }
            other => panic!("Expected Input error, got {other:?}"),
        }
    }

    #[test]
    fn test_with_context_lazy_evaluation() {
        let mut called = false;

        let ok_result: Result<i32> = Ok(42);
        let _ = ok_result.with_context(|| {
            called = true;
            "should not be called"
        });
        assert!(!called, "Closure should not be called for Ok result");

        let err_result: Result<i32> = Err(ScoringError::config("error"));
        let _ = err_result.with_context(|| {
            called = true;
            "should be called"
        });
        assert!(called, "Closure should be called for Err result");
    }

    #[test]
    fn test_serde_error_converts_to_input_error() {
        let parsed: std::result::Result<serde_json::Value, _> = serde_json::from_str("{not json");
        let err: ScoringError = parsed.unwrap_err().into();
        assert!(matches!(err, ScoringError::Input { .. }));
    }

    #[test]
    fn test_chain_context_helper() {
        assert_eq!(chain_context("new", ""), "new");
        assert_eq!(chain_context("new", "existing"), "new: existing");
    }
}
