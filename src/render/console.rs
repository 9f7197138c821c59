//! Console dashboard with colored output

use super::{ChartId, ChartSpec, ChartSurface, Status, StatusDisplay, StatusKind, TableSink, TableView};
use crate::classifier::Classifier;
use crate::render::format_score;
use crate::Hue;
use colored::Colorize;
use std::io::{self, Write};

/// Width of the longest bar in cells
const CHART_WIDTH: usize = 40;

/// Dashboard that prints to a terminal (or any writer)
pub struct ConsoleDashboard<W: Write> {
    out: W,
    /// Whether to use colors
    use_colors: bool,
    live_chart: Option<ChartId>,
}

impl ConsoleDashboard<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleDashboard<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            use_colors: true,
            live_chart: None,
        }
    }

    /// Disable colors
    pub fn without_colors(mut self) -> Self {
        self.use_colors = false;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn paint(&self, text: &str, hue: Hue) -> String {
        if !self.use_colors {
            return text.to_string();
        }
        match hue {
            Hue::Green => text.green().to_string(),
            Hue::Orange => text.truecolor(249, 115, 22).to_string(),
            Hue::Red => text.red().to_string(),
        }
    }

    fn bold(&self, text: &str) -> String {
        if self.use_colors {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn dimmed(&self, text: &str) -> String {
        if self.use_colors {
            text.dimmed().to_string()
        } else {
            text.to_string()
        }
    }

    /// Table as printed: padded columns, recommendation colored by tier
    pub fn format_table(&self, view: &TableView) -> String {
        let mut widths = view.header.map(|h| h.chars().count());
        for row in &view.rows {
            let cells = [&row.name, &row.score, &row.risk_label, &row.recommendation];
            for (width, cell) in widths.iter_mut().zip(cells) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let mut lines = Vec::with_capacity(view.rows.len() + 2);
        let header = format!(
            "   {:<w0$}  {:>w1$}  {:<w2$}  {}",
            view.header[0],
            view.header[1],
            view.header[2],
            view.header[3],
            w0 = widths[0],
            w1 = widths[1],
            w2 = widths[2],
        );
        lines.push(self.bold(header.trim_end()));
        let rule_len = widths.iter().sum::<usize>() + 6;
        lines.push(format!("   {}", self.dimmed(&"─".repeat(rule_len))));

        for row in &view.rows {
            let recommendation = self.paint(&row.recommendation, row.recommendation_tier.hue());
            lines.push(format!(
                "   {:<w0$}  {:>w1$}  {:<w2$}  {}",
                row.name,
                row.score,
                row.risk_label,
                recommendation,
                w0 = widths[0],
                w1 = widths[1],
                w2 = widths[2],
            ));
        }

        lines.join("\n") + "\n"
    }

    /// Horizontal bar chart scaled to the largest positive score
    pub fn format_chart(&self, spec: &ChartSpec) -> String {
        let label_width = spec
            .bars
            .iter()
            .map(|b| b.label.chars().count())
            .max()
            .unwrap_or(0);
        let max = spec.bars.iter().map(|b| b.value).fold(0.0_f64, f64::max);

        let mut lines = vec![format!("   {}", self.bold(spec.dataset_label))];
        for bar in &spec.bars {
            let cells = if max > 0.0 && bar.value > 0.0 {
                ((bar.value / max) * CHART_WIDTH as f64).round() as usize
            } else {
                0
            };
            let filled = self.paint(&"█".repeat(cells), bar.tier.hue());
            lines.push(format!(
                "   {:<lw$} │{} {}",
                bar.label,
                filled,
                format_score(bar.value),
                lw = label_width
            ));
        }

        // Axes are drawn even without bars
        lines.push(format!(
            "   {:<lw$} └{}",
            "",
            "─".repeat(CHART_WIDTH),
            lw = label_width
        ));
        lines.push(format!(
            "   {:<lw$}  0{:>rest$}",
            "",
            format_score(max),
            lw = label_width,
            rest = CHART_WIDTH - 1
        ));

        let summary = spec
            .tier_counts()
            .iter()
            .map(|(tier, n)| {
                let text = format!("{} {} ({})", n, tier, Classifier::tier_description(*tier));
                self.paint(&text, tier.hue())
            })
            .collect::<Vec<_>>()
            .join(" · ");
        lines.push(format!("   {}", summary));

        lines.join("\n") + "\n"
    }

    fn format_status(&self, status: &Status) -> String {
        let prefix = match status.kind {
            StatusKind::Progress => {
                if self.use_colors {
                    "Info".blue().to_string()
                } else {
                    "Info".to_string()
                }
            }
            StatusKind::Success => self.paint("Done", Hue::Green),
            StatusKind::Failure => self.paint("Error", Hue::Red),
        };
        format!("{}: {}\n", prefix, status.text)
    }
}

impl<W: Write> TableSink for ConsoleDashboard<W> {
    fn replace_table(&mut self, view: &TableView) -> io::Result<()> {
        let text = self.format_table(view);
        writeln!(self.out)?;
        self.out.write_all(text.as_bytes())?;
        self.out.flush()
    }
}

impl<W: Write> ChartSurface for ConsoleDashboard<W> {
    fn draw_chart(&mut self, id: ChartId, spec: &ChartSpec) -> io::Result<()> {
        let text = self.format_chart(spec);
        writeln!(self.out)?;
        self.out.write_all(text.as_bytes())?;
        self.live_chart = Some(id);
        self.out.flush()
    }

    fn dispose_chart(&mut self, id: ChartId) -> io::Result<()> {
        // Printed output cannot be taken back; the next draw starts a fresh block
        if self.live_chart == Some(id) {
            self.live_chart = None;
        }
        Ok(())
    }
}

impl<W: Write> StatusDisplay for ConsoleDashboard<W> {
    fn set_status(&mut self, status: &Status) -> io::Result<()> {
        let text = self.format_status(status);
        self.out.write_all(text.as_bytes())?;
        self.out.flush()
    }

    fn warn(&mut self, message: &str) -> io::Result<()> {
        let prefix = if self.use_colors {
            "Warning".yellow().bold().to_string()
        } else {
            "Warning".to_string()
        };
        writeln!(self.out, "{}: {}", prefix, message)?;
        self.out.flush()
    }
}
