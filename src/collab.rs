use crate::config::{Config, ImageMode, TextMode};
use crate::error::Result;
use tracing::debug;

/// Collaborator that reduces long plain text to a prompt-friendly form.
///
/// Implementations may call out to an external model service; the core
/// awaits the result but never retries, times out, or rate-limits.
pub trait TextOptimizer: Send + Sync {
    /// Optimizes text that exceeded the configured long-text threshold.
    ///
    /// # Errors
    ///
    /// Returns an error when the underlying service fails.
    fn optimize_long_text(&self, text: &str, config: &Config) -> Result<String>;
}

/// Collaborator that turns a binary blob into prompt text.
pub trait ImageOptimizer: Send + Sync {
    /// Extracts a textual representation from binary input.
    ///
    /// # Errors
    ///
    /// Returns an error when the underlying service fails.
    fn optimize_binary(&self, bytes: &[u8], config: &Config) -> Result<String>;
}

/// Bundled text collaborator.
///
/// Stands in for a model-backed summarizer: `Clean` collapses whitespace
/// runs, and both summarize modes truncate at the threshold and annotate
/// the elision.
#[derive(Debug, Clone, Copy, Default)]
pub struct StubTextOptimizer;

impl TextOptimizer for StubTextOptimizer {
    fn optimize_long_text(&self, text: &str, config: &Config) -> Result<String> {
        debug!(mode = ?config.text_mode, chars = text.chars().count(), "optimizing long text");

        Ok(match config.text_mode {
            TextMode::None => text.to_string(),
            TextMode::Clean => clean_whitespace(text),
            TextMode::SummarizeFast | TextMode::SummarizeHighQuality => {
                truncate_annotated(text, config.long_text_threshold)
            }
        })
    }
}

/// Bundled image collaborator returning a fixed diagnostic placeholder.
///
/// Real OCR or metadata extraction requires an external model service.
#[derive(Debug, Clone, Copy, Default)]
pub struct StubImageOptimizer;

impl ImageOptimizer for StubImageOptimizer {
    fn optimize_binary(&self, bytes: &[u8], config: &Config) -> Result<String> {
        debug!(mode = ?config.image_mode, bytes = bytes.len(), "optimizing binary input");

        Ok(match config.image_mode {
            ImageMode::None | ImageMode::Metadata => {
                format!("[binary content: {} bytes]", bytes.len())
            }
            ImageMode::Ocr => format!(
                "[binary content: {} bytes; OCR requires an external model service]",
                bytes.len()
            ),
        })
    }
}

/// Collapses runs of whitespace into single spaces and trims the ends.
fn clean_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Keeps the first `limit` characters and annotates the elided length.
fn truncate_annotated(text: &str, limit: usize) -> String {
    let total = text.chars().count();
    if total <= limit {
        return text.to_string();
    }

    let mut kept: String = text.chars().take(limit).collect();
    kept.push_str(&format!(
        " [... truncated {} of {} characters]",
        total - limit,
        total
    ));
    kept
}
