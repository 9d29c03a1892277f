use thiserror::Error;

/// Result type alias using the library's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Comprehensive error types for the prompt-flatten library.
///
/// The input-shaped conditions (`MalformedInput`, `Serialization`,
/// `UnsupportedMode`) are recovered at the optimizer boundary into a
/// best-effort diagnostic line via [`Error::recovery_line`]; only
/// configuration problems surface to callers as `Err`.
#[derive(Error, Debug, Clone)]
#[non_exhaustive]
pub enum Error {
    /// Text that looked like JSON failed to parse.
    #[error("Malformed JSON input: {message}")]
    MalformedInput {
        /// Parser error message
        message: String,
    },

    /// A structured record could not be converted to a value tree.
    #[error("Cannot serialize input of type '{type_name}': {message}")]
    Serialization {
        /// Declared type of the input record
        type_name: String,
        /// Error message
        message: String,
    },

    /// Configuration validation error.
    #[error("Invalid configuration: {message}")]
    Config {
        /// Detailed error message
        message: String,
    },

    /// A documented but unimplemented mode was requested.
    #[error("Mode '{mode}' is not implemented")]
    UnsupportedMode {
        /// Name of the requested mode
        mode: String,
    },
}

impl Error {
    /// Creates a malformed-input error from a parser message.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedInput {
            message: message.into(),
        }
    }

    /// Creates a serialization error naming the input's declared type.
    #[must_use]
    pub fn serialization(type_name: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Serialization {
            type_name: type_name.into(),
            message: source.to_string(),
        }
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates an unsupported-mode error.
    #[must_use]
    pub fn unsupported_mode(mode: impl Into<String>) -> Self {
        Self::UnsupportedMode { mode: mode.into() }
    }

    /// Returns true if this is a configuration error.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config { .. })
    }

    /// Returns true if this is a malformed-input error.
    #[must_use]
    pub const fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedInput { .. })
    }

    /// Renders the single-line diagnostic that stands in for the output
    /// when an input-shaped condition is recovered.
    ///
    /// Embedded line breaks are flattened so the diagnostic always stays
    /// on one line.
    #[must_use]
    pub fn recovery_line(&self) -> String {
        let line = match self {
            Self::MalformedInput { message } => format!("[malformed JSON: {message}]"),
            Self::Serialization { type_name, .. } => {
                format!("[unserializable input: {type_name}]")
            }
            Self::Config { message } => format!("[invalid configuration: {message}]"),
            Self::UnsupportedMode { mode } => format!("[{mode} mode is not implemented]"),
        };
        line.replace(['\n', '\r'], " ")
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::MalformedInput {
            message: e.to_string(),
        }
    }
}
