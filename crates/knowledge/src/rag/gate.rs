//! Confidence gate between assembly and generation.

use super::context::EvidenceWindow;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GateDecision {
    /// Evidence is strong enough to generate from.
    Proceed { top_score: f32 },
    /// Answer with the canonical no-evidence response.
    InsufficientEvidence { top_score: Option<f32> },
}

impl GateDecision {
    pub fn proceeds(&self) -> bool {
        matches!(self, Self::Proceed { .. })
    }
}

/// Gate an evidence window against `threshold`.
pub fn evaluate(window: &EvidenceWindow, threshold: f32) -> GateDecision {
    if window.is_empty() {
        return GateDecision::InsufficientEvidence { top_score: None };
    }
    evaluate_scores(&window.scores(), threshold)
}

/// Proceed only when the best score reaches `threshold` (inclusive).
///
/// NaN scores never pass.
pub fn evaluate_scores(scores: &[f32], threshold: f32) -> GateDecision {
    let top_score = scores
        .iter()
        .copied()
        .filter(|s| !s.is_nan())
        .max_by(|a, b| a.total_cmp(b));

    match top_score {
        Some(top) if top >= threshold => GateDecision::Proceed { top_score: top },
        _ => GateDecision::InsufficientEvidence { top_score },
    }
}
