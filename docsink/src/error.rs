//! Error types and result definitions for sink operations.
//!
//! Provides an error system with classification and captured diagnostic
//! metadata for document-store sink operations. Batch processing is
//! fail-fast: the first fatal error aborts the batch and propagates, so
//! every [`SinkError`] describes a single failure.

use std::backtrace::Backtrace;
use std::borrow::Cow;
use std::error;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;

use docsink_config::ValidationError;

/// Convenient result type for sink operations using [`SinkError`] as the error type.
pub type SinkResult<T> = Result<T, SinkError>;

/// Main error type for sink operations.
///
/// [`SinkError`] carries a classification kind, a static description and
/// optional dynamic detail, while keeping the callsite location and a
/// captured backtrace for operator-visible diagnostics.
#[derive(Debug, Clone)]
pub struct SinkError {
    kind: ErrorKind,
    description: Cow<'static, str>,
    detail: Option<Cow<'static, str>>,
    source: Option<Arc<dyn error::Error + Send + Sync>>,
    location: &'static Location<'static>,
    backtrace: Arc<Backtrace>,
}

/// Specific categories of errors that can occur during sink operations.
#[derive(PartialEq, Eq, Copy, Clone, Debug, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    // Store Errors
    DestinationQueryFailed,

    // Data & Transformation Errors
    TemplateRenderFailed,
    ConversionError,

    // Configuration Errors
    ConfigError,

    // IO & Serialization Errors
    IoError,
    DeserializationError,
}

impl SinkError {
    /// Returns the [`ErrorKind`] of this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the detailed error information if available.
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    /// Returns the captured backtrace for this error.
    pub fn backtrace(&self) -> &Backtrace {
        self.backtrace.as_ref()
    }

    /// Returns the captured callsite location for this error.
    pub fn location(&self) -> &'static Location<'static> {
        self.location
    }

    /// Attaches an originating [`error::Error`] to this error and returns the
    /// modified instance.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: error::Error + Send + Sync + 'static,
    {
        self.source = Some(Arc::new(source));
        self
    }

    /// Creates a [`SinkError`] from its components.
    #[track_caller]
    fn from_components(
        kind: ErrorKind,
        description: Cow<'static, str>,
        detail: Option<Cow<'static, str>>,
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    ) -> Self {
        let location = Location::caller();
        let backtrace = Arc::new(Backtrace::capture());

        SinkError {
            kind,
            description,
            detail,
            source,
            location,
            backtrace,
        }
    }
}

impl PartialEq for SinkError {
    fn eq(&self, other: &SinkError) -> bool {
        self.kind == other.kind
    }
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        let location = self.location;
        write!(
            f,
            "[{:?}] {} @ {}:{}:{}",
            self.kind,
            self.description,
            location.file(),
            location.line(),
            location.column()
        )?;

        if let Some(detail) = self.detail.as_deref() {
            write!(f, "\n  Detail: {detail}")?;
        }

        Ok(())
    }
}

impl error::Error for SinkError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|source| source as &(dyn error::Error + 'static))
    }
}

/// Creates a [`SinkError`] from an error kind and static description.
impl From<(ErrorKind, &'static str)> for SinkError {
    #[track_caller]
    fn from((kind, desc): (ErrorKind, &'static str)) -> SinkError {
        SinkError::from_components(kind, Cow::Borrowed(desc), None, None)
    }
}

/// Creates a [`SinkError`] from an error kind, static description, and dynamic detail.
impl<D> From<(ErrorKind, &'static str, D)> for SinkError
where
    D: Into<Cow<'static, str>>,
{
    #[track_caller]
    fn from((kind, desc, detail): (ErrorKind, &'static str, D)) -> SinkError {
        SinkError::from_components(kind, Cow::Borrowed(desc), Some(detail.into()), None)
    }
}

/// Converts [`std::io::Error`] to [`SinkError`] with [`ErrorKind::IoError`].
impl From<std::io::Error> for SinkError {
    #[track_caller]
    fn from(err: std::io::Error) -> SinkError {
        let detail = err.to_string();
        let source = Arc::new(err);
        SinkError::from_components(
            ErrorKind::IoError,
            Cow::Borrowed("I/O operation failed"),
            Some(Cow::Owned(detail)),
            Some(source),
        )
    }
}

/// Converts [`serde_json::Error`] to [`SinkError`] with the appropriate error kind.
impl From<serde_json::Error> for SinkError {
    #[track_caller]
    fn from(err: serde_json::Error) -> SinkError {
        let (kind, description) = match err.classify() {
            serde_json::error::Category::Io => (ErrorKind::IoError, "JSON I/O operation failed"),
            serde_json::error::Category::Syntax
            | serde_json::error::Category::Data
            | serde_json::error::Category::Eof => (
                ErrorKind::DeserializationError,
                "JSON deserialization failed",
            ),
        };

        let detail = err.to_string();
        let source = Arc::new(err);
        SinkError::from_components(
            kind,
            Cow::Borrowed(description),
            Some(Cow::Owned(detail)),
            Some(source),
        )
    }
}

/// Converts [`chrono::ParseError`] to [`SinkError`] with [`ErrorKind::ConversionError`].
impl From<chrono::ParseError> for SinkError {
    #[track_caller]
    fn from(err: chrono::ParseError) -> SinkError {
        let detail = err.to_string();
        let source = Arc::new(err);
        SinkError::from_components(
            ErrorKind::ConversionError,
            Cow::Borrowed("Datetime parsing failed"),
            Some(Cow::Owned(detail)),
            Some(source),
        )
    }
}

/// Converts [`tera::Error`] to [`SinkError`] with [`ErrorKind::TemplateRenderFailed`].
impl From<tera::Error> for SinkError {
    #[track_caller]
    fn from(err: tera::Error) -> SinkError {
        let detail = err.to_string();
        let source = Arc::new(err);
        SinkError::from_components(
            ErrorKind::TemplateRenderFailed,
            Cow::Borrowed("Index template rendering failed"),
            Some(Cow::Owned(detail)),
            Some(source),
        )
    }
}

/// Converts [`regex::Error`] to [`SinkError`] with [`ErrorKind::ConfigError`].
impl From<regex::Error> for SinkError {
    #[track_caller]
    fn from(err: regex::Error) -> SinkError {
        let detail = err.to_string();
        let source = Arc::new(err);
        SinkError::from_components(
            ErrorKind::ConfigError,
            Cow::Borrowed("Ignored field pattern is not a valid regular expression"),
            Some(Cow::Owned(detail)),
            Some(source),
        )
    }
}

/// Converts [`ValidationError`] to [`SinkError`] with [`ErrorKind::ConfigError`].
impl From<ValidationError> for SinkError {
    #[track_caller]
    fn from(err: ValidationError) -> SinkError {
        let detail = err.to_string();
        let source = Arc::new(err);
        SinkError::from_components(
            ErrorKind::ConfigError,
            Cow::Borrowed("Sink configuration is invalid"),
            Some(Cow::Owned(detail)),
            Some(source),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_and_detail_are_exposed() {
        let error = SinkError::from((
            ErrorKind::DestinationQueryFailed,
            "store read failed",
            "index `animals`",
        ));

        assert_eq!(error.kind(), ErrorKind::DestinationQueryFailed);
        assert_eq!(error.detail(), Some("index `animals`"));
    }

    #[test]
    fn test_equality_compares_kinds_only() {
        let a = SinkError::from((ErrorKind::ConfigError, "bad template"));
        let b = SinkError::from((ErrorKind::ConfigError, "bad pattern", "detail"));
        let c = SinkError::from((ErrorKind::ConversionError, "bad date"));

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_display_includes_kind_description_and_detail() {
        let error = SinkError::from((
            ErrorKind::TemplateRenderFailed,
            "Index template rendering failed",
            "unknown variable",
        ));
        let rendered = error.to_string();

        assert!(rendered.contains("TemplateRenderFailed"));
        assert!(rendered.contains("Index template rendering failed"));
        assert!(rendered.contains("unknown variable"));
    }

    #[test]
    fn test_source_is_forwarded() {
        let underlying = std::io::Error::other("disk gone");
        let error =
            SinkError::from((ErrorKind::IoError, "I/O operation failed")).with_source(underlying);

        assert!(std::error::Error::source(&error).is_some());
    }
}
