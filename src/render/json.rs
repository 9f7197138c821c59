//! JSON reporter for machine-readable output

use super::{ChartSpec, MemoryDashboard, Status, TableView};
use crate::RiskTier;
use serde::Serialize;

/// Reporter for JSON output
pub struct JsonReporter {
    /// Whether to pretty-print JSON
    pretty: bool,
}

impl JsonReporter {
    pub fn new() -> Self {
        Self { pretty: false }
    }

    /// Enable pretty-printing
    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }

    /// Snapshot of everything the dashboard currently shows
    pub fn report(&self, board: &MemoryDashboard) -> String {
        let summary = board.chart().map(|chart| {
            let counts = chart.tier_counts();
            let count = |tier: RiskTier| {
                counts
                    .iter()
                    .find(|(t, _)| *t == tier)
                    .map(|(_, n)| *n)
                    .unwrap_or(0)
            };
            JsonSummary {
                companies: chart.bars.len(),
                safe: count(RiskTier::Safe),
                grey_zone: count(RiskTier::GreyZone),
                distress: count(RiskTier::Distress),
            }
        });

        let output = JsonOutput {
            status: board.status(),
            warnings: board.warnings(),
            table: board.table(),
            chart: board.chart(),
            summary,
        };

        if self.pretty {
            serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
        } else {
            serde_json::to_string(&output).unwrap_or_else(|_| "{}".to_string())
        }
    }
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonOutput<'a> {
    status: Option<&'a Status>,
    #[serde(skip_serializing_if = "no_warnings")]
    warnings: &'a [String],
    table: Option<&'a TableView>,
    chart: Option<&'a ChartSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<JsonSummary>,
}

fn no_warnings(warnings: &&[String]) -> bool {
    warnings.is_empty()
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonSummary {
    companies: usize,
    safe: usize,
    grey_zone: usize,
    distress: usize,
}
