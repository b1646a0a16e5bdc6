use thiserror::Error;

/// Boxed error raised by user-supplied components (listeners, handlers).
pub type BoxError = Box<dyn std::error::Error + 'static>;

pub type Result<T> = std::result::Result<T, VigilError>;

#[derive(Debug, Error)]
pub enum VigilError {
    #[error("result handler failed: {source}")]
    ResultHandler { source: BoxError },

    #[error("trigger listener failed: {source}")]
    Listener { source: BoxError },

    #[error("failed to dispose {component}: {source}")]
    Disposal {
        component: &'static str,
        source: BoxError,
    },

    #[error("unknown mapping strategy: {name}")]
    UnknownMapping { name: String },

    #[error("invalid configuration: {message}")]
    Config { message: String },
}

impl VigilError {
    #[must_use]
    pub fn result_handler(source: impl Into<BoxError>) -> Self {
        Self::ResultHandler {
            source: source.into(),
        }
    }

    #[must_use]
    pub fn listener(source: impl Into<BoxError>) -> Self {
        Self::Listener {
            source: source.into(),
        }
    }

    #[must_use]
    pub fn disposal(component: &'static str, source: impl Into<BoxError>) -> Self {
        Self::Disposal {
            component,
            source: source.into(),
        }
    }

    /// Short, stable name of the variant, used as a structured log field.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ResultHandler { .. } => "result_handler",
            Self::Listener { .. } => "listener",
            Self::Disposal { .. } => "disposal",
            Self::UnknownMapping { .. } => "unknown_mapping",
            Self::Config { .. } => "config",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_source() {
        let err = VigilError::result_handler("sink closed");
        assert_eq!(err.to_string(), "result handler failed: sink closed");
        assert_eq!(err.kind(), "result_handler");
    }

    #[test]
    fn disposal_names_component() {
        let err = VigilError::disposal("rule", "still referenced");
        assert_eq!(err.to_string(), "failed to dispose rule: still referenced");
    }

    #[test]
    fn source_chain_is_exposed() {
        use std::error::Error as _;
        let err = VigilError::listener("boom");
        assert_eq!(err.source().map(ToString::to_string), Some("boom".into()));
    }
}
