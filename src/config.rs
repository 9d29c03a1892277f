use crate::error::{Error, Result};
use crate::token::TokenizerKind;

const DEFAULT_LONG_TEXT_THRESHOLD: usize = 500;
const DEFAULT_ABBREVIATION_THRESHOLD: usize = 2;

/// How structured (JSON-like) input is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonMode {
    /// Pass the tree through as compact JSON
    None,
    /// Flatten the tree into path/value lines (default)
    #[default]
    Flatten,
    /// Convert to YAML (not implemented; returns a marked stub)
    ToYaml,
    /// Keep only selected paths (not implemented; returns a marked stub)
    Filter,
}

impl JsonMode {
    /// Returns the mode name used in diagnostics and stub output.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Flatten => "flatten",
            Self::ToYaml => "to-yaml",
            Self::Filter => "filter",
        }
    }
}

/// How over-threshold plain text is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextMode {
    /// Leave the text untouched
    None,
    /// Collapse whitespace runs (default)
    #[default]
    Clean,
    /// Fast summarization via an external model (stub truncates)
    SummarizeFast,
    /// High-quality summarization via an external model (stub truncates)
    SummarizeHighQuality,
}

/// How binary input is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageMode {
    /// No extraction; a placeholder is emitted
    None,
    /// OCR text extraction via an external model (stub placeholder)
    Ocr,
    /// Describe the blob's metadata (default)
    #[default]
    Metadata,
}

/// Configuration for the optimization pipeline.
///
/// Use [`Config::builder()`] to construct a new configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct Config {
    /// Rendering mode for structured input
    pub json_mode: JsonMode,

    /// Handling mode for long plain text
    pub text_mode: TextMode,

    /// Handling mode for binary input
    pub image_mode: ImageMode,

    /// Dotted paths to keep (only meaningful with [`JsonMode::Filter`])
    pub json_paths_to_keep: Vec<String>,

    /// Character count separating short text from long text
    pub long_text_threshold: usize,

    /// Whether to abbreviate repeated leading path segments
    pub enable_abbreviations: bool,

    /// Minimum occurrences before a segment is abbreviated
    pub abbreviation_threshold: usize,

    /// Tokenizer used for the before/after token estimates
    pub tokenizer: TokenizerKind,
}

impl Config {
    /// Creates a new configuration builder.
    ///
    /// # Examples
    ///
    /// ```
    /// use prompt_flatten::{Config, JsonMode};
    ///
    /// let config = Config::builder()
    ///     .json_mode(JsonMode::Flatten)
    ///     .long_text_threshold(1_000)
    ///     .build()
    ///     .expect("valid configuration");
    /// ```
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `long_text_threshold` is zero
    /// - `abbreviation_threshold` is zero
    pub fn validate(&self) -> Result<()> {
        if self.long_text_threshold == 0 {
            return Err(Error::config("long_text_threshold must be greater than 0"));
        }

        if self.abbreviation_threshold == 0 {
            return Err(Error::config(
                "abbreviation_threshold must be greater than 0",
            ));
        }

        if !self.json_paths_to_keep.is_empty() && self.json_mode != JsonMode::Filter {
            tracing::warn!(
                "json_paths_to_keep is only used with JsonMode::Filter. Current mode: {:?}",
                self.json_mode
            );
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            json_mode: JsonMode::Flatten,
            text_mode: TextMode::Clean,
            image_mode: ImageMode::Metadata,
            json_paths_to_keep: Vec::new(),
            long_text_threshold: DEFAULT_LONG_TEXT_THRESHOLD,
            enable_abbreviations: false,
            abbreviation_threshold: DEFAULT_ABBREVIATION_THRESHOLD,
            tokenizer: TokenizerKind::Simple,
        }
    }
}

/// Builder for creating a [`Config`].
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    json_mode: Option<JsonMode>,
    text_mode: Option<TextMode>,
    image_mode: Option<ImageMode>,
    json_paths_to_keep: Vec<String>,
    long_text_threshold: Option<usize>,
    enable_abbreviations: bool,
    abbreviation_threshold: Option<usize>,
    tokenizer: Option<TokenizerKind>,
}

impl ConfigBuilder {
    /// Sets the rendering mode for structured input.
    #[must_use]
    pub fn json_mode(mut self, mode: JsonMode) -> Self {
        self.json_mode = Some(mode);
        self
    }

    /// Sets the handling mode for long plain text.
    #[must_use]
    pub fn text_mode(mut self, mode: TextMode) -> Self {
        self.text_mode = Some(mode);
        self
    }

    /// Sets the handling mode for binary input.
    #[must_use]
    pub fn image_mode(mut self, mode: ImageMode) -> Self {
        self.image_mode = Some(mode);
        self
    }

    /// Sets the dotted paths to keep in filter mode.
    ///
    /// Order is preserved.
    #[must_use]
    pub fn json_paths_to_keep<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.json_paths_to_keep
            .extend(paths.into_iter().map(Into::into));
        self
    }

    /// Sets the character threshold separating short text from long text.
    #[must_use]
    pub fn long_text_threshold(mut self, chars: usize) -> Self {
        self.long_text_threshold = Some(chars);
        self
    }

    /// Enables or disables the abbreviation post-pass.
    #[must_use]
    pub fn enable_abbreviations(mut self, enabled: bool) -> Self {
        self.enable_abbreviations = enabled;
        self
    }

    /// Sets the minimum occurrences before a segment is abbreviated.
    #[must_use]
    pub fn abbreviation_threshold(mut self, occurrences: usize) -> Self {
        self.abbreviation_threshold = Some(occurrences);
        self
    }

    /// Sets the tokenizer used for token estimates.
    #[must_use]
    pub fn tokenizer(mut self, kind: TokenizerKind) -> Self {
        self.tokenizer = Some(kind);
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails.
    pub fn build(self) -> Result<Config> {
        let config = Config {
            json_mode: self.json_mode.unwrap_or_default(),
            text_mode: self.text_mode.unwrap_or_default(),
            image_mode: self.image_mode.unwrap_or_default(),
            json_paths_to_keep: self.json_paths_to_keep,
            long_text_threshold: self
                .long_text_threshold
                .unwrap_or(DEFAULT_LONG_TEXT_THRESHOLD),
            enable_abbreviations: self.enable_abbreviations,
            abbreviation_threshold: self
                .abbreviation_threshold
                .unwrap_or(DEFAULT_ABBREVIATION_THRESHOLD),
            tokenizer: self.tokenizer.unwrap_or(TokenizerKind::Simple),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.json_mode, JsonMode::Flatten);
        assert_eq!(config.text_mode, TextMode::Clean);
        assert_eq!(config.long_text_threshold, DEFAULT_LONG_TEXT_THRESHOLD);
        assert!(!config.enable_abbreviations);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_threshold_rejected() {
        let result = Config::builder().long_text_threshold(0).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_abbreviation_threshold_rejected() {
        let result = Config::builder().abbreviation_threshold(0).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_is_fluent() {
        let config = Config::builder()
            .json_mode(JsonMode::Filter)
            .json_paths_to_keep(["user.name", "user.email"])
            .enable_abbreviations(true)
            .abbreviation_threshold(3)
            .build()
            .unwrap();

        assert_eq!(config.json_mode, JsonMode::Filter);
        assert_eq!(config.json_paths_to_keep, vec!["user.name", "user.email"]);
        assert!(config.enable_abbreviations);
        assert_eq!(config.abbreviation_threshold, 3);
    }

    #[test]
    fn test_mode_labels() {
        assert_eq!(JsonMode::Flatten.label(), "flatten");
        assert_eq!(JsonMode::ToYaml.label(), "to-yaml");
    }
}
