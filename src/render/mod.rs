//! Renderers and the output handles they draw on
//!
//! The table and chart models are built by pure functions of a
//! [`ResultSet`](crate::ResultSet); output handles only decide how a model is
//! shown. Every handle replaces what it showed before, so rendering the same
//! set twice leaves the same output behind.

pub mod chart;
pub mod console;
pub mod html;
pub mod json;
pub mod memory;
pub mod table;

pub use chart::{Bar, ChartId, ChartRenderer, ChartSpec};
pub use console::ConsoleDashboard;
pub use html::HtmlDashboard;
pub use json::JsonReporter;
pub use memory::MemoryDashboard;
pub use table::{TableRenderer, TableRow, TableView};

use serde::Serialize;
use std::io;

/// Format a score to exactly two decimals.
///
/// Uses Rust fixed-point formatting: the exact binary value is rounded to the
/// nearest two-decimal string, ties to even. `-0.00` is shown as `0.00`.
pub fn format_score(score: f64) -> String {
    let formatted = format!("{:.2}", score);
    if formatted == "-0.00" {
        "0.00".to_string()
    } else {
        formatted
    }
}

/// Kind of status message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    Progress,
    Success,
    Failure,
}

impl StatusKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StatusKind::Progress => "progress",
            StatusKind::Success => "success",
            StatusKind::Failure => "failure",
        }
    }
}

/// Text shown in the status region
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Status {
    pub kind: StatusKind,
    pub text: String,
}

impl Status {
    pub fn progress(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Progress,
            text: text.into(),
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Success,
            text: text.into(),
        }
    }

    pub fn failure(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Failure,
            text: text.into(),
        }
    }
}

/// Output handle for the result table
pub trait TableSink {
    /// Replace all table content with `view`
    fn replace_table(&mut self, view: &TableView) -> io::Result<()>;
}

/// Output handle for the bar chart
pub trait ChartSurface {
    /// Draw a new chart instance identified by `id`
    fn draw_chart(&mut self, id: ChartId, spec: &ChartSpec) -> io::Result<()>;

    /// Remove the chart instance `id`. Unknown ids are ignored.
    fn dispose_chart(&mut self, id: ChartId) -> io::Result<()>;
}

/// Output handle for the status region and user prompts
pub trait StatusDisplay {
    fn set_status(&mut self, status: &Status) -> io::Result<()>;

    /// Blocking warning for a submission that could not start
    fn warn(&mut self, message: &str) -> io::Result<()>;
}

/// All three output handles together
pub trait Dashboard: TableSink + ChartSurface + StatusDisplay {}

impl<T: TableSink + ChartSurface + StatusDisplay + ?Sized> Dashboard for T {}

/// Forwards every call to two dashboards, first then second
#[derive(Debug, Default)]
pub struct Tee<A, B> {
    first: A,
    second: B,
}

impl<A, B> Tee<A, B> {
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }

    pub fn first(&self) -> &A {
        &self.first
    }

    pub fn second(&self) -> &B {
        &self.second
    }
}

impl<A: TableSink, B: TableSink> TableSink for Tee<A, B> {
    fn replace_table(&mut self, view: &TableView) -> io::Result<()> {
        self.first.replace_table(view)?;
        self.second.replace_table(view)
    }
}

impl<A: ChartSurface, B: ChartSurface> ChartSurface for Tee<A, B> {
    fn draw_chart(&mut self, id: ChartId, spec: &ChartSpec) -> io::Result<()> {
        self.first.draw_chart(id, spec)?;
        self.second.draw_chart(id, spec)
    }

    fn dispose_chart(&mut self, id: ChartId) -> io::Result<()> {
        self.first.dispose_chart(id)?;
        self.second.dispose_chart(id)
    }
}

impl<A: StatusDisplay, B: StatusDisplay> StatusDisplay for Tee<A, B> {
    fn set_status(&mut self, status: &Status) -> io::Result<()> {
        self.first.set_status(status)?;
        self.second.set_status(status)
    }

    fn warn(&mut self, message: &str) -> io::Result<()> {
        self.first.warn(message)?;
        self.second.warn(message)
    }
}

// An absent optional output (e.g. no --html) swallows every call.

impl<T: TableSink> TableSink for Option<T> {
    fn replace_table(&mut self, view: &TableView) -> io::Result<()> {
        match self {
            Some(inner) => inner.replace_table(view),
            None => Ok(()),
        }
    }
}

impl<T: ChartSurface> ChartSurface for Option<T> {
    fn draw_chart(&mut self, id: ChartId, spec: &ChartSpec) -> io::Result<()> {
        match self {
            Some(inner) => inner.draw_chart(id, spec),
            None => Ok(()),
        }
    }

    fn dispose_chart(&mut self, id: ChartId) -> io::Result<()> {
        match self {
            Some(inner) => inner.dispose_chart(id),
            None => Ok(()),
        }
    }
}

impl<T: StatusDisplay> StatusDisplay for Option<T> {
    fn set_status(&mut self, status: &Status) -> io::Result<()> {
        match self {
            Some(inner) => inner.set_status(status),
            None => Ok(()),
        }
    }

    fn warn(&mut self, message: &str) -> io::Result<()> {
        match self {
            Some(inner) => inner.warn(message),
            None => Ok(()),
        }
    }
}
