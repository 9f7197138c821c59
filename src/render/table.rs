//! Table model built from a result set

use super::{format_score, TableSink};
use crate::classifier::Classifier;
use crate::{RecommendationTier, ResultSet};
use serde::Serialize;
use std::io;

/// Fixed column labels
pub const TABLE_HEADER: [&str; 4] = ["Company", "Z-Score", "Risk", "Recommendation"];

/// One data row, already formatted for display
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRow {
    pub name: String,
    /// Score with exactly two decimals
    pub score: String,
    pub risk_label: String,
    pub recommendation: String,
    pub recommendation_tier: RecommendationTier,
    /// CSS class for the recommendation cell
    pub color_class: &'static str,
}

/// Complete table content: header plus one row per record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableView {
    pub header: [&'static str; 4],
    pub rows: Vec<TableRow>,
}

/// Builds the table and hands it to a sink
#[derive(Debug, Clone, Default)]
pub struct TableRenderer {
    classifier: Classifier,
}

impl TableRenderer {
    pub fn new(classifier: Classifier) -> Self {
        Self { classifier }
    }

    /// Build the table content for `set`, in set order
    pub fn build(&self, set: &ResultSet) -> TableView {
        let rows = set
            .iter()
            .map(|record| {
                let tier = self.classifier.recommendation_tier(&record.recommendation);
                TableRow {
                    name: record.name.clone(),
                    score: format_score(record.score),
                    risk_label: record.risk_label.clone(),
                    recommendation: record.recommendation.clone(),
                    recommendation_tier: tier,
                    color_class: tier.color_class(),
                }
            })
            .collect();

        TableView {
            header: TABLE_HEADER,
            rows,
        }
    }

    /// Replace the sink's table with the content for `set`
    pub fn render<S: TableSink + ?Sized>(&self, set: &ResultSet, sink: &mut S) -> io::Result<()> {
        sink.replace_table(&self.build(set))
    }
}
