//! # prompt-flatten
//!
//! A library for converting structured data into token-efficient text for
//! LLM prompts.
//!
//! ## Features
//!
//! - Flattens JSON-like trees into compact `path:value` lines
//! - Collapses uniform arrays into tabular blocks and primitive arrays
//!   into single comma-joined lines
//! - Analyzes input shape and picks an encoding strategy automatically
//! - Optional abbreviation post-pass for repeated path segments
//! - Degrades malformed or unserializable input to diagnostic lines
//!   instead of failing
//!
//! ## Quick Start
//!
//! ```
//! use prompt_flatten::{Config, Optimizer, Source};
//!
//! # fn main() -> prompt_flatten::Result<()> {
//! let optimizer = Optimizer::new(Config::default())?;
//!
//! let result = optimizer.optimize(Source::text(
//!     r#"{"user":{"name":"Javian","email":"x@y.com"}}"#,
//! ))?;
//! assert_eq!(result.output, "user.name:Javian\nuser.email:x@y.com");
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! The library follows a pipeline architecture:
//! 1. **Adapter**: Normalizes text, binary, or structured input into a
//!    value tree or a non-tree kind
//! 2. **Analyzer**: Walks the tree once, producing shape metrics
//! 3. **Selector**: Scores a fixed rule list and merges the winner's
//!    overrides onto the configuration (automatic path only)
//! 4. **Encoder**: Renders the tree into path/value lines, with an
//!    optional abbreviation post-pass

#![warn(
    missing_docs,
    rust_2018_idioms,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery
)]
#![allow(clippy::module_name_repetitions)]

mod abbrev;
mod analyze;
mod collab;
mod config;
mod error;
mod flatten;
mod optimizer;
mod strategy;
mod token;
mod value;

pub mod api;

pub use abbrev::abbreviate;
pub use analyze::{analyze_tree, Complexity, DataAnalysis, InferredType};
pub use collab::{ImageOptimizer, StubImageOptimizer, StubTextOptimizer, TextOptimizer};
pub use config::{Config, ConfigBuilder, ImageMode, JsonMode, TextMode};
pub use error::{Error, Result};
pub use flatten::{flatten, flatten_lines, render, FlattenLine};
pub use optimizer::{Optimized, Optimizer};
pub use strategy::{candidates, select, StrategyCandidate};
pub use token::{TokenEstimator, TokenizerKind};
pub use value::{Source, ValueNode};

/// Optimizes one input with the given configuration on the explicit path.
///
/// This is the main entry point for one-off calls; construct an
/// [`Optimizer`] to reuse a configuration across calls.
///
/// # Errors
///
/// Returns an error if:
/// - Configuration validation fails
/// - A collaborator fails
///
/// # Examples
///
/// ```
/// use prompt_flatten::{optimize, Config, Source};
///
/// # fn main() -> prompt_flatten::Result<()> {
/// let result = optimize(Source::text(r#"{"a":{"b":1}}"#), Config::default())?;
/// assert_eq!(result.output, "a.b:1");
/// # Ok(())
/// # }
/// ```
pub fn optimize(source: Source, config: Config) -> Result<Optimized> {
    Optimizer::new(config)?.optimize(source)
}
