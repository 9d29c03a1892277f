//! High-level, ergonomic API for common use cases. Start here if you want
//! prompt-ready text fast without configuration overhead.
//!
//! ## Examples
//!
//! ```
//! use prompt_flatten::api::Optimize;
//!
//! // Flatten JSON text in one line
//! let flat = Optimize::json(r#"{"user":{"name":"Javian","email":"x@y.com"}}"#).run()?;
//! assert_eq!(flat, "user.name:Javian\nuser.email:x@y.com");
//!
//! // Let the analyzer pick the strategy
//! let flat = Optimize::json(r#"{"items":[{"id":1},{"id":2}]}"#)
//!     .auto()
//!     .run()?;
//! assert_eq!(flat, "items[2]{id}:\n1\n2");
//! # Ok::<(), prompt_flatten::Error>(())
//! ```

use crate::{
    Config, Error, ImageMode, JsonMode, Optimized, Optimizer, Result, Source, TextMode,
    TokenizerKind,
};

/// Entry point for the fluent API.
///
/// Holds the input plus configuration deltas and executes on a terminal
/// call. A record that failed to serialize is carried along and recovered
/// into a diagnostic line at execution time, matching the optimizer's
/// behavior.
#[derive(Debug)]
#[must_use = "call .run() or .report() to execute the optimization"]
pub struct Optimize {
    source: Result<Source>,
    config: Config,
    auto: bool,
}

impl Optimize {
    fn with_source(source: Result<Source>) -> Self {
        Self {
            source,
            config: Config::default(),
            auto: false,
        }
    }

    /// Optimizes plain or JSON-shaped text.
    pub fn text(text: impl Into<String>) -> Self {
        Self::with_source(Ok(Source::text(text)))
    }

    /// Optimizes JSON text.
    ///
    /// Alias of [`Optimize::text`]; classification happens on the literal
    /// shape either way.
    pub fn json(json: impl Into<String>) -> Self {
        Self::text(json)
    }

    /// Optimizes a binary blob.
    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::with_source(Ok(Source::bytes(bytes)))
    }

    /// Optimizes any `Serialize` record.
    ///
    /// Serialization failures are not surfaced here; they degrade to a
    /// diagnostic line when the terminal call runs.
    pub fn record<T: serde::Serialize>(record: &T) -> Self {
        Self::with_source(Source::record(record))
    }

    /// Sets the rendering mode for structured input.
    pub fn json_mode(mut self, mode: JsonMode) -> Self {
        self.config.json_mode = mode;
        self
    }

    /// Sets the handling mode for long plain text.
    pub fn text_mode(mut self, mode: TextMode) -> Self {
        self.config.text_mode = mode;
        self
    }

    /// Sets the handling mode for binary input.
    pub fn image_mode(mut self, mode: ImageMode) -> Self {
        self.config.image_mode = mode;
        self
    }

    /// Sets the character threshold separating short from long text.
    pub fn long_text_threshold(mut self, chars: usize) -> Self {
        self.config.long_text_threshold = chars;
        self
    }

    /// Enables the abbreviation post-pass with the default threshold.
    pub fn abbreviations(mut self) -> Self {
        self.config.enable_abbreviations = true;
        self
    }

    /// Sets the minimum occurrences before a segment is abbreviated and
    /// enables the post-pass.
    pub fn abbreviation_threshold(mut self, occurrences: usize) -> Self {
        self.config.enable_abbreviations = true;
        self.config.abbreviation_threshold = occurrences;
        self
    }

    /// Sets the tokenizer used for the savings estimate.
    pub fn tokenizer(mut self, kind: TokenizerKind) -> Self {
        self.config.tokenizer = kind;
        self
    }

    /// Selects the encoding strategy automatically from the input shape.
    pub fn auto(mut self) -> Self {
        self.auto = true;
        self
    }

    /// Executes and returns the prompt-ready output text.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or a collaborator
    /// fails.
    pub fn run(self) -> Result<String> {
        self.report().map(|r| r.output)
    }

    /// Executes and returns the full result with token estimates.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or a collaborator
    /// fails.
    pub fn report(self) -> Result<Optimized> {
        let optimizer = Optimizer::new(self.config)?;
        match (self.source, self.auto) {
            (Ok(source), false) => optimizer.optimize(source),
            (Ok(source), true) => optimizer.optimize_auto(source),
            (Err(err), _) => Ok(recovered(&err)),
        }
    }
}

fn recovered(err: &Error) -> Optimized {
    Optimized {
        output: err.recovery_line(),
        strategy: None,
        input_tokens: 0,
        output_tokens: 0,
    }
}

/// Flattens JSON text with default settings.
///
/// # Errors
///
/// Returns an error only when a collaborator fails.
///
/// # Examples
///
/// ```
/// let flat = prompt_flatten::api::flatten_json(r#"{"a":{"b":1}}"#)?;
/// assert_eq!(flat, "a.b:1");
/// # Ok::<(), prompt_flatten::Error>(())
/// ```
pub fn flatten_json(json: impl Into<String>) -> Result<String> {
    Optimize::json(json).run()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_has_sensible_defaults() {
        let optimize = Optimize::text("x");
        assert!(!optimize.auto);
        assert_eq!(optimize.config, Config::default());
    }

    #[test]
    fn test_builder_is_fluent() {
        let optimize = Optimize::text("x")
            .json_mode(JsonMode::None)
            .text_mode(TextMode::SummarizeFast)
            .long_text_threshold(1_000)
            .abbreviation_threshold(3)
            .auto();

        assert!(optimize.auto);
        assert_eq!(optimize.config.json_mode, JsonMode::None);
        assert_eq!(optimize.config.text_mode, TextMode::SummarizeFast);
        assert_eq!(optimize.config.long_text_threshold, 1_000);
        assert!(optimize.config.enable_abbreviations);
        assert_eq!(optimize.config.abbreviation_threshold, 3);
    }

    #[test]
    fn test_flatten_json_helper() {
        assert_eq!(
            flatten_json(r#"{"order":{"orderId":"o-456","status":"SHIPPED"}}"#).unwrap(),
            "order.orderId:o-456\norder.status:SHIPPED"
        );
    }

    #[test]
    fn test_short_text_round_trip() {
        assert_eq!(Optimize::text("Hello World").run().unwrap(), "Hello World");
    }

    #[test]
    fn test_auto_reports_strategy() {
        let report = Optimize::json(r#"{"tags":[1,2,3]}"#).auto().report().unwrap();
        assert_eq!(report.strategy, Some("primitive-flatten"));
        assert_eq!(report.output, "tags[3]:1,2,3");
    }

    #[test]
    fn test_record_failure_recovers_at_run() {
        use std::collections::BTreeMap;

        let mut map: BTreeMap<(u8, u8), u32> = BTreeMap::new();
        map.insert((1, 2), 3);

        let output = Optimize::record(&map).run().unwrap();
        assert!(output.starts_with("[unserializable input:"));
    }

    #[test]
    fn test_invalid_config_still_errors() {
        let result = Optimize::text("x").long_text_threshold(0).run();
        assert!(result.is_err());
    }
}
