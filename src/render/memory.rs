//! In-memory dashboard: keeps the latest content instead of drawing it

use super::{ChartId, ChartSpec, ChartSurface, Status, StatusDisplay, TableSink, TableView};
use std::collections::BTreeMap;
use std::io;

#[derive(Debug, Default)]
pub struct MemoryDashboard {
    table: Option<TableView>,
    charts: BTreeMap<ChartId, ChartSpec>,
    status: Option<Status>,
    warnings: Vec<String>,
    table_writes: usize,
    chart_draws: usize,
}

impl MemoryDashboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(&self) -> Option<&TableView> {
        self.table.as_ref()
    }

    /// The most recently drawn live chart
    pub fn chart(&self) -> Option<&ChartSpec> {
        self.charts.values().next_back()
    }

    /// Number of chart instances drawn and not yet disposed
    pub fn live_charts(&self) -> usize {
        self.charts.len()
    }

    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn table_writes(&self) -> usize {
        self.table_writes
    }

    pub fn chart_draws(&self) -> usize {
        self.chart_draws
    }
}

impl TableSink for MemoryDashboard {
    fn replace_table(&mut self, view: &TableView) -> io::Result<()> {
        self.table = Some(view.clone());
        self.table_writes += 1;
        Ok(())
    }
}

impl ChartSurface for MemoryDashboard {
    fn draw_chart(&mut self, id: ChartId, spec: &ChartSpec) -> io::Result<()> {
        self.charts.insert(id, spec.clone());
        self.chart_draws += 1;
        Ok(())
    }

    fn dispose_chart(&mut self, id: ChartId) -> io::Result<()> {
        self.charts.remove(&id);
        Ok(())
    }
}

impl StatusDisplay for MemoryDashboard {
    fn set_status(&mut self, status: &Status) -> io::Result<()> {
        self.status = Some(status.clone());
        Ok(())
    }

    fn warn(&mut self, message: &str) -> io::Result<()> {
        self.warnings.push(message.to_string());
        Ok(())
    }
}
