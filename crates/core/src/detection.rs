//! Per-frame classification results and the derived severity rating.
//!
//! A [`Detection`] is created exactly once per analyzed frame and never
//! mutated. The [`Rating`] is derived purely from confidence thresholds,
//! so the same detection always rates the same way.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::rubric::FLAG_CONFIDENCE_MIN;

/// One category's finding from the classification model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryFinding {
    /// Whether the model considers the category present in the frame.
    pub detected: bool,
    /// Model confidence on a 1..=5 scale.
    pub confidence: u8,
    /// One-sentence rationale from the model.
    pub reason: String,
}

impl CategoryFinding {
    /// A finding counts toward flagging when it is detected with
    /// confidence at or above the rubric threshold.
    pub fn is_significant(&self) -> bool {
        self.detected && self.confidence >= FLAG_CONFIDENCE_MIN
    }
}

/// Derived severity rating for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Rating {
    /// No significant finding in either tier.
    Safe,
    /// At least one significant tier-A finding, no significant tier-B.
    TierA,
    /// At least one significant tier-B finding.
    TierB,
}

impl Rating {
    pub fn as_str(self) -> &'static str {
        match self {
            Rating::Safe => "safe",
            Rating::TierA => "tierA",
            Rating::TierB => "tierB",
        }
    }
}

/// Full classification output for one frame.
///
/// `BTreeMap` keeps category iteration (and therefore serialized output)
/// in a stable order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Detection {
    /// Findings for tier-A (review severity) categories.
    #[serde(rename = "tierA")]
    pub tier_a: BTreeMap<String, CategoryFinding>,
    /// Findings for tier-B (critical severity) categories.
    #[serde(rename = "tierB")]
    pub tier_b: BTreeMap<String, CategoryFinding>,
    /// Set when this detection is a substituted fallback after a
    /// classification failure or timeout. Degraded detections carry no
    /// findings and never flag a frame.
    #[serde(default)]
    pub degraded: bool,
}

impl Detection {
    /// Fallback detection substituted when the classifier fails for one
    /// frame. Carries no findings so it can never flag.
    pub fn degraded() -> Self {
        Self {
            tier_a: BTreeMap::new(),
            tier_b: BTreeMap::new(),
            degraded: true,
        }
    }

    /// Derive the severity rating.
    ///
    /// Tier-B wins over tier-A: any significant tier-B finding rates the
    /// frame `TierB` regardless of tier-A findings.
    pub fn rating(&self) -> Rating {
        if self.tier_b.values().any(CategoryFinding::is_significant) {
            Rating::TierB
        } else if self.tier_a.values().any(CategoryFinding::is_significant) {
            Rating::TierA
        } else {
            Rating::Safe
        }
    }

    /// Whether this frame should produce an incident.
    pub fn is_flagged(&self) -> bool {
        self.rating() != Rating::Safe
    }

    /// Highest confidence among significant findings, if any.
    pub fn peak_confidence(&self) -> Option<u8> {
        self.tier_a
            .values()
            .chain(self.tier_b.values())
            .filter(|f| f.is_significant())
            .map(|f| f.confidence)
            .max()
    }
}
