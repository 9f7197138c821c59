//! Bar chart model and the dispose-then-draw replacement contract

use super::ChartSurface;
use crate::classifier::Classifier;
use crate::{ResultSet, RiskTier, BAR_BORDER};
use serde::Serialize;
use std::io;

pub const DATASET_LABEL: &str = "Z-Score (Altman)";
pub const AXIS_TITLE: &str = "Z-Score";

/// Identifier of one drawn chart instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ChartId(u64);

impl ChartId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

/// One bar: x label, height, and tier-derived fill
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bar {
    pub label: String,
    pub value: f64,
    pub tier: RiskTier,
    pub fill: &'static str,
}

/// Everything a surface needs to draw the chart
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSpec {
    pub dataset_label: &'static str,
    pub axis_title: &'static str,
    pub bars: Vec<Bar>,
    pub border_color: &'static str,
    pub border_width: u8,
    /// Value axis always includes zero
    pub begin_at_zero: bool,
    pub show_legend: bool,
    pub tooltips: bool,
}

impl ChartSpec {
    /// Number of bars per score tier, in Safe/GreyZone/Distress order
    pub fn tier_counts(&self) -> [(RiskTier, usize); 3] {
        let count = |tier| self.bars.iter().filter(|b| b.tier == tier).count();
        [
            (RiskTier::Safe, count(RiskTier::Safe)),
            (RiskTier::GreyZone, count(RiskTier::GreyZone)),
            (RiskTier::Distress, count(RiskTier::Distress)),
        ]
    }
}

/// Owns the id of the chart it last drew and replaces it on every render
#[derive(Debug, Default)]
pub struct ChartRenderer {
    current: Option<ChartId>,
    next_id: u64,
}

impl ChartRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Chart content for `set`. Fill depends on the score tier only.
    pub fn build(set: &ResultSet) -> ChartSpec {
        let bars = set
            .iter()
            .map(|record| {
                let tier = Classifier::score_tier(record.score);
                Bar {
                    label: record.name.clone(),
                    value: record.score,
                    tier,
                    fill: tier.hue().fill(),
                }
            })
            .collect();

        ChartSpec {
            dataset_label: DATASET_LABEL,
            axis_title: AXIS_TITLE,
            bars,
            border_color: BAR_BORDER,
            border_width: 1,
            begin_at_zero: true,
            show_legend: false,
            tooltips: true,
        }
    }

    /// The chart instance currently drawn by this renderer
    pub fn current(&self) -> Option<ChartId> {
        self.current
    }

    /// Dispose the previous instance, then draw a new one for `set`
    pub fn render<S: ChartSurface + ?Sized>(
        &mut self,
        set: &ResultSet,
        surface: &mut S,
    ) -> io::Result<ChartId> {
        if let Some(old) = self.current {
            surface.dispose_chart(old)?;
            self.current = None;
        }

        let id = ChartId(self.next_id);
        self.next_id += 1;
        surface.draw_chart(id, &Self::build(set))?;
        self.current = Some(id);
        Ok(id)
    }
}
