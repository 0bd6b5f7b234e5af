/// Convenience result type used across splinaltap.
pub type SplinalResult<T> = Result<T, SplinalError>;

/// Top-level error taxonomy used by solver APIs.
#[derive(thiserror::Error, Debug)]
pub enum SplinalError {
    /// Malformed expression, or a construct outside the expression whitelist.
    #[error("syntax error in \"{src}\" at byte {offset}: {message}")]
    Syntax {
        /// Offending expression text.
        src: String,
        /// Byte offset into `src` where parsing failed.
        offset: usize,
        /// Human-readable reason.
        message: String,
    },

    /// Identifier not present in the bindings at evaluation time.
    #[error("name error: unknown identifier \"{name}\"")]
    Name {
        /// The unresolved identifier.
        name: String,
    },

    /// Invalid keyframe data or parameters (duplicate `at`, malformed control points, ...).
    #[error("value error: {0}")]
    Value(String),

    /// No numeric backend could be selected, not even the scalar reference.
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),

    /// A channel failed to resolve; carries the query context of the failure.
    #[error(
        "failed to resolve {spline}.{channel} at position {position}{}: {source}",
        expression_suffix(.expression)
    )]
    Resolve {
        /// Spline owning the failing channel.
        spline: String,
        /// Failing channel.
        channel: String,
        /// Query position as passed by the caller.
        position: f64,
        /// Expression text being evaluated, when the failure came from an expression keyframe.
        expression: Option<String>,
        /// Underlying failure.
        #[source]
        source: Box<SplinalError>,
    },

    /// Errors when serializing or deserializing scene documents.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn expression_suffix(expression: &Option<String>) -> String {
    match expression {
        Some(e) => format!(" (expression \"{e}\")"),
        None => String::new(),
    }
}

/// Coarse classification of a [`SplinalError`], looking through context wrappers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// See [`SplinalError::Syntax`].
    Syntax,
    /// See [`SplinalError::Name`].
    Name,
    /// See [`SplinalError::Value`].
    Value,
    /// See [`SplinalError::BackendUnavailable`].
    BackendUnavailable,
    /// See [`SplinalError::Serde`].
    Serde,
    /// See [`SplinalError::Other`].
    Other,
}

impl SplinalError {
    /// Build a [`SplinalError::Value`] value.
    pub fn value(msg: impl Into<String>) -> Self {
        Self::Value(msg.into())
    }

    /// Build a [`SplinalError::Name`] value.
    pub fn name(name: impl Into<String>) -> Self {
        Self::Name { name: name.into() }
    }

    /// Build a [`SplinalError::BackendUnavailable`] value.
    pub fn backend_unavailable(msg: impl Into<String>) -> Self {
        Self::BackendUnavailable(msg.into())
    }

    /// Build a [`SplinalError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Classify this error, skipping any [`SplinalError::Resolve`] context layers.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Resolve { source, .. } => source.kind(),
            Self::Syntax { .. } => ErrorKind::Syntax,
            Self::Name { .. } => ErrorKind::Name,
            Self::Value(_) => ErrorKind::Value,
            Self::BackendUnavailable(_) => ErrorKind::BackendUnavailable,
            Self::Serde(_) => ErrorKind::Serde,
            Self::Other(_) => ErrorKind::Other,
        }
    }

    /// Innermost error below any [`SplinalError::Resolve`] context layers.
    pub fn root(&self) -> &SplinalError {
        let mut cur = self;
        while let Self::Resolve { source, .. } = cur {
            cur = source;
        }
        cur
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
