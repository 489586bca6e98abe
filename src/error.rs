// src/error.rs
//! Error kinds raised by the fetch → normalize → filter → format pipeline.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors that can occur while processing one source.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// Network failure, non-2xx status or a body that is not JSON.
    #[error("fetch failed for {endpoint}: {message}")]
    Fetch { endpoint: String, message: String },

    /// The JSON did not have the provider's expected shape.
    #[error("malformed payload from {source_name}: {message}")]
    Parse {
        source_name: String,
        message: String,
    },

    /// The first category lacked the distinguished reference record
    /// (or its value was zero / non-finite).
    #[error("{source_name}: first category must contain base value data (reference id '{reference}')")]
    MissingBaseValue {
        source_name: String,
        reference: String,
    },

    /// Threshold input was negative, not finite, or not a number at all.
    /// `value` is the input as received.
    #[error("invalid threshold {field}: {value:?}")]
    InvalidThreshold { field: &'static str, value: String },
}

impl PipelineError {
    pub fn fetch(endpoint: impl Into<String>, message: impl ToString) -> Self {
        Self::Fetch {
            endpoint: endpoint.into(),
            message: message.to_string(),
        }
    }

    pub fn parse(source_name: impl Into<String>, message: impl ToString) -> Self {
        Self::Parse {
            source_name: source_name.into(),
            message: message.to_string(),
        }
    }

    /// Short label used in metrics and structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Fetch { .. } => "fetch",
            Self::Parse { .. } => "parse",
            Self::MissingBaseValue { .. } => "missing_base_value",
            Self::InvalidThreshold { .. } => "invalid_threshold",
        }
    }
}

/// Run-wide fatal failure: every requested source failed and nothing
/// (dynamic or static) produced output. Carries the log collected so far.
#[derive(Error, Debug, Clone)]
#[error("{message}")]
pub struct RunFailure {
    pub message: String,
    pub logs: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_context() {
        let e = PipelineError::fetch("https://x.test/a", "HTTP 503");
        assert_eq!(e.to_string(), "fetch failed for https://x.test/a: HTTP 503");
        assert_eq!(e.kind(), "fetch");

        let e = PipelineError::MissingBaseValue {
            source_name: "Poe.Ninja".into(),
            reference: "exalted".into(),
        };
        assert!(e.to_string().contains("exalted"));
    }
}
