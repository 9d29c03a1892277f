use crate::{
    abbrev,
    analyze::analyze_input,
    collab::{ImageOptimizer, StubImageOptimizer, StubTextOptimizer, TextOptimizer},
    config::{Config, JsonMode},
    error::{Error, Result},
    flatten,
    strategy,
    token::TokenEstimator,
    value::{classify, Classified, Source, ValueNode},
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Outcome of one optimization call.
#[derive(Debug, Clone, Serialize)]
pub struct Optimized {
    /// The prompt-ready output text
    pub output: String,

    /// Name of the strategy the automatic path selected; `None` on the
    /// explicit path
    pub strategy: Option<&'static str>,

    /// Estimated tokens of the raw input
    pub input_tokens: usize,

    /// Estimated tokens of the output
    pub output_tokens: usize,
}

impl Optimized {
    /// Estimated tokens saved, floored at zero.
    #[must_use]
    pub fn saved_tokens(&self) -> usize {
        self.input_tokens.saturating_sub(self.output_tokens)
    }

    /// Fraction of input tokens saved (0.0 when the input estimate is 0).
    #[must_use]
    pub fn savings_ratio(&self) -> f64 {
        if self.input_tokens == 0 {
            return 0.0;
        }
        self.saved_tokens() as f64 / self.input_tokens as f64
    }
}

/// Orchestrates classification, strategy selection, encoding, and the
/// collaborators.
///
/// All per-call state is allocated fresh and discarded on return, so one
/// optimizer can serve concurrent calls without locking.
pub struct Optimizer {
    config: Config,
    text: Arc<dyn TextOptimizer>,
    image: Arc<dyn ImageOptimizer>,
    tokenizer: Arc<dyn TokenEstimator>,
}

impl Optimizer {
    /// Creates a new optimizer with the bundled stub collaborators.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration validation fails.
    pub fn new(config: Config) -> Result<Self> {
        Self::with_collaborators(
            config,
            Arc::new(StubTextOptimizer),
            Arc::new(StubImageOptimizer),
        )
    }

    /// Creates a new optimizer with caller-provided collaborators.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration validation fails.
    pub fn with_collaborators(
        config: Config,
        text: Arc<dyn TextOptimizer>,
        image: Arc<dyn ImageOptimizer>,
    ) -> Result<Self> {
        config.validate()?;
        let tokenizer = config.tokenizer.create();

        Ok(Self {
            config,
            text,
            image,
            tokenizer,
        })
    }

    /// Optimizes an input using the caller's configuration verbatim.
    ///
    /// Dispatch follows the literal input shape: JSON-like text is
    /// encoded, text above the threshold goes to the text collaborator,
    /// shorter text is returned unchanged, binary goes to the image
    /// collaborator, and structured values are encoded directly.
    ///
    /// # Errors
    ///
    /// Returns an error only when a collaborator fails; malformed and
    /// unserializable inputs degrade to a diagnostic line instead.
    ///
    /// # Examples
    ///
    /// ```
    /// use prompt_flatten::{Config, Optimizer, Source};
    ///
    /// # fn main() -> prompt_flatten::Result<()> {
    /// let optimizer = Optimizer::new(Config::default())?;
    /// let result = optimizer.optimize(Source::text(
    ///     r#"{"order":{"orderId":"o-456","status":"SHIPPED"}}"#,
    /// ))?;
    /// assert_eq!(result.output, "order.orderId:o-456\norder.status:SHIPPED");
    /// # Ok(())
    /// # }
    /// ```
    #[instrument(skip(self, source))]
    pub fn optimize(&self, source: Source) -> Result<Optimized> {
        let input_tokens = self.input_tokens(&source);

        let output = match classify(source, self.config.long_text_threshold) {
            Classified::Tree(node) => self.encode_tree(&node, &self.config),
            Classified::LongText(text) => self.text.optimize_long_text(&text, &self.config)?,
            Classified::Text(text) => text,
            Classified::Binary(bytes) => self.image.optimize_binary(&bytes, &self.config)?,
            Classified::Malformed(err) => err.recovery_line(),
        };

        Ok(self.finish(output, None, input_tokens))
    }

    /// Optimizes an input, selecting the encoding strategy automatically.
    ///
    /// The input is analyzed once; the winning strategy's overrides are
    /// merged onto this optimizer's configuration before dispatch.
    ///
    /// # Errors
    ///
    /// Returns an error only when a collaborator fails.
    #[instrument(skip(self, source))]
    pub fn optimize_auto(&self, source: Source) -> Result<Optimized> {
        let input_tokens = self.input_tokens(&source);
        let classified = classify(source, self.config.long_text_threshold);

        if let Classified::Malformed(err) = &classified {
            warn!("recovering malformed input: {err}");
            return Ok(self.finish(err.recovery_line(), None, input_tokens));
        }

        let analysis = analyze_input(&classified);
        let winner = strategy::select(&analysis, &self.config);
        debug!(
            strategy = winner.name,
            score = winner.score,
            complexity = ?analysis.complexity,
            reason = winner.reason,
            "selected encoding strategy"
        );
        let merged = winner.apply_to(&self.config);

        let output = match classified {
            Classified::Tree(node) => self.encode_tree(&node, &merged),
            Classified::LongText(text) => self.text.optimize_long_text(&text, &merged)?,
            Classified::Text(text) => text,
            Classified::Binary(bytes) => self.image.optimize_binary(&bytes, &merged)?,
            Classified::Malformed(err) => err.recovery_line(),
        };

        Ok(self.finish(output, Some(winner.name), input_tokens))
    }

    /// Serializes a structured record and optimizes it on the explicit
    /// path.
    ///
    /// A record that cannot be serialized degrades to a diagnostic line
    /// naming its declared type.
    ///
    /// # Errors
    ///
    /// Returns an error only when a collaborator fails.
    pub fn optimize_record<T: Serialize>(&self, record: &T) -> Result<Optimized> {
        match Source::record(record) {
            Ok(source) => self.optimize(source),
            Err(err) => Ok(self.recovered(err)),
        }
    }

    /// Serializes a structured record and optimizes it on the automatic
    /// path.
    ///
    /// # Errors
    ///
    /// Returns an error only when a collaborator fails.
    pub fn optimize_record_auto<T: Serialize>(&self, record: &T) -> Result<Optimized> {
        match Source::record(record) {
            Ok(source) => self.optimize_auto(source),
            Err(err) => Ok(self.recovered(err)),
        }
    }

    /// Encodes a value tree under the given (possibly merged) config.
    fn encode_tree(&self, node: &ValueNode, config: &Config) -> String {
        match config.json_mode {
            JsonMode::Flatten => {
                let mut lines = flatten::flatten_lines(node);
                if config.enable_abbreviations {
                    lines = abbrev::abbreviate(lines, config.abbreviation_threshold);
                }
                flatten::render(&lines)
            }
            JsonMode::None => node.to_compact_json(),
            JsonMode::ToYaml | JsonMode::Filter => {
                // Unimplemented modes degrade to a marked pass-through so
                // downstream prompt assembly still has the content.
                let mode = config.json_mode.label();
                warn!("{mode} mode requested but not implemented; passing through compact JSON");
                format!(
                    "{}\n{}",
                    Error::unsupported_mode(mode).recovery_line(),
                    node.to_compact_json()
                )
            }
        }
    }

    fn recovered(&self, err: Error) -> Optimized {
        self.finish(err.recovery_line(), None, 0)
    }

    fn input_tokens(&self, source: &Source) -> usize {
        match source {
            Source::Text(text) => self.tokenizer.estimate(text),
            // Binary is never prompt text; a flat bytes/4 stands in.
            Source::Bytes(bytes) => bytes.len().div_ceil(4),
            Source::Value(value) => self.tokenizer.estimate(&value.to_string()),
        }
    }

    fn finish(
        &self,
        output: String,
        strategy: Option<&'static str>,
        input_tokens: usize,
    ) -> Optimized {
        let output_tokens = self.tokenizer.estimate(&output);
        let result = Optimized {
            output,
            strategy,
            input_tokens,
            output_tokens,
        };

        info!(
            input_tokens,
            output_tokens,
            saved = result.saved_tokens(),
            strategy = strategy.unwrap_or("explicit"),
            "optimization complete"
        );

        result
    }
}
