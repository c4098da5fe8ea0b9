// src/scoring.rs
//! Match score normalization and confidence bands.
//!
//! Producers report similarity on different scales. Every candidate is
//! converted to a percentage once, when it enters a session or collection, and
//! every view classifies through [`classify`].

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::JobCandidate;

/// Scale a collaborator reports raw scores on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreScale {
    /// 0.0 to 1.0
    Fraction,
    /// 0 to 100
    #[default]
    Percent,
}

/// A score on the canonical percentage scale, clamped to 0..=100.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct MatchScore(f64);

impl MatchScore {
    pub fn from_raw(raw: f64, scale: ScoreScale) -> Self {
        let percent = match scale {
            ScoreScale::Fraction => raw * 100.0,
            ScoreScale::Percent => raw,
        };
        if percent.is_nan() {
            return Self(0.0);
        }
        Self(percent.clamp(0.0, 100.0))
    }

    pub fn percent(&self) -> f64 {
        self.0
    }

    pub fn band(&self) -> ScoreBand {
        classify(*self)
    }
}

impl fmt::Display for MatchScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.0}%", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScoreBand {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl ScoreBand {
    pub fn label(&self) -> &'static str {
        match self {
            ScoreBand::Excellent => "Excellent Match",
            ScoreBand::Good => "Good Match",
            ScoreBand::Fair => "Fair Match",
            ScoreBand::Poor => "Poor Match",
        }
    }

    pub fn color(&self) -> ScoreColor {
        match self {
            ScoreBand::Excellent => ScoreColor::Green,
            ScoreBand::Good => ScoreColor::Yellow,
            ScoreBand::Fair | ScoreBand::Poor => ScoreColor::Red,
        }
    }
}

impl fmt::Display for ScoreBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Display color tier. Fair and Poor share red.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreColor {
    Green,
    Yellow,
    Red,
}

impl ScoreColor {
    /// ANSI foreground code used by the terminal front end.
    pub fn ansi_code(&self) -> &'static str {
        match self {
            ScoreColor::Green => "32",
            ScoreColor::Yellow => "33",
            ScoreColor::Red => "31",
        }
    }
}

pub fn classify(score: MatchScore) -> ScoreBand {
    let percent = score.percent();
    if percent >= 70.0 {
        ScoreBand::Excellent
    } else if percent >= 50.0 {
        ScoreBand::Good
    } else if percent >= 30.0 {
        ScoreBand::Fair
    } else {
        ScoreBand::Poor
    }
}

pub fn classify_raw(raw: f64, scale: ScoreScale) -> ScoreBand {
    classify(MatchScore::from_raw(raw, scale))
}

/// Attach the canonical score to freshly received candidates.
pub fn ingest(candidates: &mut [JobCandidate], scale: ScoreScale) {
    for candidate in candidates.iter_mut() {
        candidate.score = candidate
            .raw_score
            .map(|raw| MatchScore::from_raw(raw, scale));
    }
}
