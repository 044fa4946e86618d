//! Derived SWOT classification
//!
//! Never stored; recomputed from a record's scores on every read.
//! Weighted score `0.4·intensity + 0.35·likelihood + 0.25·relevance`:
//! 8 and up is a Strength, 5 an Opportunity, 3 a Weakness, anything lower a
//! Threat.

use insight_common::Record;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const INTENSITY_WEIGHT: f64 = 0.4;
const LIKELIHOOD_WEIGHT: f64 = 0.35;
const RELEVANCE_WEIGHT: f64 = 0.25;

const STRENGTH_THRESHOLD: f64 = 8.0;
const OPPORTUNITY_THRESHOLD: f64 = 5.0;
const WEAKNESS_THRESHOLD: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwotLabel {
    Strength,
    Weakness,
    Opportunity,
    Threat,
}

impl SwotLabel {
    /// Fixed option order offered by the filter panel
    pub const ALL: [SwotLabel; 4] = [
        SwotLabel::Strength,
        SwotLabel::Weakness,
        SwotLabel::Opportunity,
        SwotLabel::Threat,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SwotLabel::Strength => "Strength",
            SwotLabel::Weakness => "Weakness",
            SwotLabel::Opportunity => "Opportunity",
            SwotLabel::Threat => "Threat",
        }
    }
}

impl fmt::Display for SwotLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SwotLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SwotLabel::ALL
            .into_iter()
            .find(|label| label.as_str() == s)
            .ok_or_else(|| format!("Unknown SWOT label: {}", s))
    }
}

/// Weighted score the label is bucketed from
pub fn swot_score(record: &Record) -> f64 {
    record.intensity * INTENSITY_WEIGHT
        + record.likelihood * LIKELIHOOD_WEIGHT
        + record.relevance * RELEVANCE_WEIGHT
}

pub fn derive_swot(record: &Record) -> SwotLabel {
    let score = swot_score(record);
    if score >= STRENGTH_THRESHOLD {
        SwotLabel::Strength
    } else if score >= OPPORTUNITY_THRESHOLD {
        SwotLabel::Opportunity
    } else if score >= WEAKNESS_THRESHOLD {
        SwotLabel::Weakness
    } else {
        SwotLabel::Threat
    }
}
