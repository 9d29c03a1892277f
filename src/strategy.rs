use crate::analyze::{Complexity, DataAnalysis, InferredType};
use crate::config::{Config, ImageMode, JsonMode, TextMode};

/// A candidate encoding approach with its score and the configuration
/// overrides it would apply.
///
/// Candidates are produced in a fixed declaration order and are immutable
/// once produced; ties are broken in favor of the first-declared candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrategyCandidate {
    /// Stable strategy name, reported in the optimization result
    pub name: &'static str,

    /// JSON mode to force, if any
    pub json_mode: Option<JsonMode>,

    /// Text mode to force, if any
    pub text_mode: Option<TextMode>,

    /// Image mode to force, if any
    pub image_mode: Option<ImageMode>,

    /// Score in 0..=100; higher wins
    pub score: u8,

    /// Why this candidate fired
    pub reason: &'static str,
}

impl StrategyCandidate {
    /// Merges this candidate's overrides onto a base configuration.
    ///
    /// Set overrides win; unset fields fall back to the base.
    #[must_use]
    pub fn apply_to(&self, base: &Config) -> Config {
        let mut merged = base.clone();
        if let Some(mode) = self.json_mode {
            merged.json_mode = mode;
        }
        if let Some(mode) = self.text_mode {
            merged.text_mode = mode;
        }
        if let Some(mode) = self.image_mode {
            merged.image_mode = mode;
        }
        merged
    }
}

const fn flatten_candidate(name: &'static str, score: u8, reason: &'static str) -> StrategyCandidate {
    StrategyCandidate {
        name,
        json_mode: Some(JsonMode::Flatten),
        text_mode: None,
        image_mode: None,
        score,
        reason,
    }
}

/// Generates the candidate list for one analysis, in declaration order.
///
/// The rule set is fixed per call; caller-registered strategies are a
/// deliberate extension point and do not participate here.
#[must_use]
pub fn candidates(analysis: &DataAnalysis, base: &Config) -> Vec<StrategyCandidate> {
    let mut out = Vec::with_capacity(4);

    if analysis.has_uniform_arrays {
        out.push(flatten_candidate(
            "tabular-flatten",
            100,
            "uniform arrays collapse to tabular blocks",
        ));
    } else if analysis.has_primitive_arrays {
        out.push(flatten_candidate(
            "primitive-flatten",
            80,
            "primitive arrays collapse to single comma lines",
        ));
    }

    if analysis.has_nested_objects || analysis.complexity == Complexity::Moderate {
        out.push(flatten_candidate(
            "nested-flatten",
            70,
            "nested structure flattens to path lines",
        ));
    }

    if analysis.inferred_type == InferredType::LongText {
        out.push(StrategyCandidate {
            name: "long-text",
            json_mode: None,
            text_mode: Some(base.text_mode),
            image_mode: None,
            score: 90,
            reason: "long text is routed to the text collaborator",
        });
    }

    if analysis.inferred_type == InferredType::Image {
        out.push(StrategyCandidate {
            name: "image",
            json_mode: None,
            text_mode: None,
            image_mode: Some(base.image_mode),
            score: 100,
            reason: "binary input is routed to the image collaborator",
        });
    }

    out
}

/// Picks the winning candidate for one analysis.
///
/// The winner is the highest score; the first-declared candidate wins
/// ties. When no rule fires, a default flatten candidate is used.
#[must_use]
pub fn select(analysis: &DataAnalysis, base: &Config) -> StrategyCandidate {
    let mut best: Option<StrategyCandidate> = None;
    for candidate in candidates(analysis, base) {
        if best.is_none_or(|b| candidate.score > b.score) {
            best = Some(candidate);
        }
    }

    best.unwrap_or(flatten_candidate(
        "default-flatten",
        50,
        "no structural signal; flatten is the safe default",
    ))
}
