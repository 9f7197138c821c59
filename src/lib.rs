//! Riskboard: credit-risk dashboard client
//!
//! This library uploads a financial dataset to a remote scoring service,
//! fetches the per-company Z-score assessment, and renders it as a
//! color-coded table and bar chart on pluggable output handles.

pub mod classifier;
pub mod config;
pub mod controller;
pub mod render;
pub mod service;
pub mod watcher;

use serde::{Deserialize, Serialize};

/// Assessment of a single company as returned by the scoring service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRecord {
    /// Company name shown to the user
    pub name: String,
    /// Computed risk score (Altman Z')
    pub score: f64,
    /// Risk category text supplied by the scorer
    pub risk_label: String,
    /// Lending recommendation text supplied by the scorer
    pub recommendation: String,
}

impl ResultRecord {
    pub fn new(
        name: impl Into<String>,
        score: f64,
        risk_label: impl Into<String>,
        recommendation: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            score,
            risk_label: risk_label.into(),
            recommendation: recommendation.into(),
        }
    }
}

/// Immutable snapshot of the records of one upload cycle, in server order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ResultSet {
    records: Vec<ResultRecord>,
}

impl ResultSet {
    pub fn new(records: Vec<ResultRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[ResultRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ResultRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl From<Vec<ResultRecord>> for ResultSet {
    fn from(records: Vec<ResultRecord>) -> Self {
        Self::new(records)
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a ResultRecord;
    type IntoIter = std::slice::Iter<'a, ResultRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Display color shared by both tier families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Hue {
    Green,
    Orange,
    Red,
}

/// Chart bar outline color
pub const BAR_BORDER: &str = "rgba(30,64,175,0.9)";

impl Hue {
    /// CSS text class used for table cells
    pub fn text_class(self) -> &'static str {
        match self {
            Hue::Green => "text-green-600",
            Hue::Orange => "text-orange-600",
            Hue::Red => "text-red-600",
        }
    }

    /// Chart bar fill
    pub fn fill(self) -> &'static str {
        match self {
            Hue::Green => "rgba(34,197,94,0.6)",
            Hue::Orange => "rgba(249,115,22,0.6)",
            Hue::Red => "rgba(239,68,68,0.6)",
        }
    }
}

/// Score tier on the Altman Z-score scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING-KEBAB-CASE")]
pub enum RiskTier {
    Safe,
    GreyZone,
    Distress,
}

impl RiskTier {
    /// Lower bound (exclusive) of the safe zone
    pub const SAFE_ABOVE: f64 = 2.99;
    /// Upper bound (inclusive) of the distress zone
    pub const DISTRESS_AT_OR_BELOW: f64 = 1.8;

    pub fn from_score(score: f64) -> Self {
        if score > Self::SAFE_ABOVE {
            RiskTier::Safe
        } else if score > Self::DISTRESS_AT_OR_BELOW {
            RiskTier::GreyZone
        } else {
            RiskTier::Distress
        }
    }

    pub fn hue(self) -> Hue {
        match self {
            RiskTier::Safe => Hue::Green,
            RiskTier::GreyZone => Hue::Orange,
            RiskTier::Distress => Hue::Red,
        }
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskTier::Safe => write!(f, "SAFE"),
            RiskTier::GreyZone => write!(f, "GREY-ZONE"),
            RiskTier::Distress => write!(f, "DISTRESS"),
        }
    }
}

/// Tier derived from the recommendation text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING-KEBAB-CASE")]
pub enum RecommendationTier {
    Positive,
    Caution,
    Negative,
}

impl RecommendationTier {
    pub fn hue(self) -> Hue {
        match self {
            RecommendationTier::Positive => Hue::Green,
            RecommendationTier::Caution => Hue::Orange,
            RecommendationTier::Negative => Hue::Red,
        }
    }

    pub fn color_class(self) -> &'static str {
        self.hue().text_class()
    }
}

impl std::fmt::Display for RecommendationTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecommendationTier::Positive => write!(f, "POSITIVE"),
            RecommendationTier::Caution => write!(f, "CAUTION"),
            RecommendationTier::Negative => write!(f, "NEGATIVE"),
        }
    }
}
