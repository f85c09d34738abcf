use thiserror::Error;

/// Errors that can occur while validating sink configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The index name template is missing or blank.
    #[error("index_format must not be empty")]
    EmptyIndexFormat,

    /// A stream declares a composite identity key with no field names.
    #[error("composite key list for stream `{stream}` must not be empty")]
    EmptyCompositeKeys { stream: String },

    /// The diff worker pool width is zero.
    #[error("diff.max_diff_workers must be greater than 0")]
    MaxDiffWorkersZero,

    /// A per-stream ignored-field pattern is not a valid regular expression.
    #[error("invalid ignored field pattern `{pattern}` for stream `{stream}`")]
    InvalidIgnorePattern {
        stream: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
