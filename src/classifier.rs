//! Tier classification for score and recommendation text

use crate::config::RecommendationTokens;
use crate::{RecommendationTier, ResultRecord, RiskTier};
use serde::Serialize;

/// Both tiers of one record. The two are independent signals and may disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub risk_tier: RiskTier,
    pub recommendation_tier: RecommendationTier,
}

/// Classifier for result records
#[derive(Debug, Clone)]
pub struct Classifier {
    positive: Vec<String>,
    caution: Vec<String>,
}

impl Classifier {
    /// Create a classifier with the default token vocabulary
    pub fn new() -> Self {
        Self::with_tokens(&RecommendationTokens::default())
    }

    /// Create a classifier with a custom token vocabulary. Empty tokens are dropped.
    pub fn with_tokens(tokens: &RecommendationTokens) -> Self {
        let keep = |list: &[String]| -> Vec<String> {
            list.iter().filter(|t| !t.is_empty()).cloned().collect()
        };
        Self {
            positive: keep(&tokens.positive),
            caution: keep(&tokens.caution),
        }
    }

    /// Score tier used for chart fill
    pub fn score_tier(score: f64) -> RiskTier {
        RiskTier::from_score(score)
    }

    /// Recommendation tier used for table styling. Positive tokens win over caution tokens.
    pub fn recommendation_tier(&self, recommendation: &str) -> RecommendationTier {
        if self.positive.iter().any(|t| recommendation.contains(t.as_str())) {
            RecommendationTier::Positive
        } else if self.caution.iter().any(|t| recommendation.contains(t.as_str())) {
            RecommendationTier::Caution
        } else {
            RecommendationTier::Negative
        }
    }

    pub fn classify(&self, record: &ResultRecord) -> Classification {
        Classification {
            risk_tier: Self::score_tier(record.score),
            recommendation_tier: self.recommendation_tier(&record.recommendation),
        }
    }

    /// Get a description of the score tier
    pub fn tier_description(tier: RiskTier) -> &'static str {
        match tier {
            RiskTier::Safe => "Low risk",
            RiskTier::GreyZone => "Moderate risk",
            RiskTier::Distress => "High risk of bankruptcy",
        }
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}
