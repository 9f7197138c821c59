//! HTML dashboard: a self-contained page rewritten on every change
//!
//! The page holds the status line, the result table and an inline SVG bar
//! chart. Region ids (`status`, `resultTable`, `zscoreChart`) are stable so
//! the page can be embedded or scraped. Header clicks sort the table
//! client-side; the initial order is always the server order.
//!
//! Nothing is written until this dashboard has rendered a table or chart, so
//! a run that fails before rendering leaves the previous page on disk. Each
//! write goes to a hidden sibling file that is then renamed over the page.

use super::{
    format_score, ChartId, ChartSpec, ChartSurface, Status, StatusDisplay, TableSink, TableView,
};
use std::ffi::{OsStr, OsString};
use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const SLOT: f64 = 72.0;
const MIN_WIDTH: f64 = 480.0;
const PLOT_HEIGHT: f64 = 240.0;
const MARGIN_LEFT: f64 = 56.0;
const MARGIN_RIGHT: f64 = 16.0;
const MARGIN_TOP: f64 = 16.0;
const MARGIN_BOTTOM: f64 = 48.0;
const TICKS: usize = 4;

/// Escape text for HTML element content and attribute values
fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Dashboard that keeps an HTML file in sync with the latest content
#[derive(Debug)]
pub struct HtmlDashboard {
    path: PathBuf,
    status: Option<Status>,
    table: Option<TableView>,
    chart: Option<(ChartId, ChartSpec)>,
}

impl HtmlDashboard {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            status: None,
            table: None,
            chart: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Generate the full HTML page for the current content
    pub fn document(&self) -> String {
        let mut html = String::with_capacity(16_384);
        html.push_str(Self::template_head());
        html.push_str("<body>\n<header><h1>Credit Risk Dashboard</h1></header>\n");

        match &self.status {
            Some(status) => {
                let _ = writeln!(
                    html,
                    "<p id=\"status\" class=\"status {}\">{}</p>",
                    status.kind.as_str(),
                    escape_html(&status.text)
                );
            }
            None => html.push_str("<p id=\"status\" class=\"status\"></p>\n"),
        }

        html.push_str("<section class=\"card\">\n");
        html.push_str(&self.table_markup());
        html.push_str("</section>\n<section class=\"card\">\n<div id=\"zscoreChart\">");
        if let Some((_, spec)) = &self.chart {
            html.push_str(&chart_svg(spec));
        }
        html.push_str("</div>\n</section>\n");
        html.push_str(Self::template_script());
        html.push_str("</body>\n</html>\n");
        html
    }

    fn table_markup(&self) -> String {
        let mut out = String::from("<table id=\"resultTable\">\n<thead><tr>");
        let header = self
            .table
            .as_ref()
            .map(|t| t.header)
            .unwrap_or(super::table::TABLE_HEADER);
        for (i, label) in header.iter().enumerate() {
            let _ = write!(out, "<th data-col=\"{}\">{}</th>", i, escape_html(label));
        }
        out.push_str("</tr></thead>\n<tbody>\n");

        if let Some(table) = &self.table {
            for row in &table.rows {
                let _ = writeln!(
                    out,
                    "<tr><td>{}</td><td class=\"num\">{}</td><td class=\"center\">{}</td><td class=\"center strong {}\">{}</td></tr>",
                    escape_html(&row.name),
                    escape_html(&row.score),
                    escape_html(&row.risk_label),
                    row.color_class,
                    escape_html(&row.recommendation)
                );
            }
        }
        out.push_str("</tbody>\n</table>\n");
        out
    }

    /// Sibling file the page is staged in before the rename
    fn staging_path(&self) -> PathBuf {
        let mut name = OsString::from(".");
        name.push(self.path.file_name().unwrap_or(OsStr::new("dashboard.html")));
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn flush(&self) -> io::Result<()> {
        if self.table.is_none() && self.chart.is_none() {
            log::debug!("nothing rendered yet; keeping {}", self.path.display());
            return Ok(());
        }
        let staging = self.staging_path();
        fs::write(&staging, self.document())?;
        fs::rename(&staging, &self.path)
    }

    // ─── HTML template pieces ────────────────────────────────────────────

    fn template_head() -> &'static str {
        r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Riskboard: Credit Risk Dashboard</title>
<style>
:root{--bg:#f8fafc;--surface:#fff;--border:#e2e8f0;--text:#1e293b;--muted:#64748b;--blue:#1d4ed8;--radius:8px}
*{box-sizing:border-box;margin:0;padding:0}
body{font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',Roboto,Oxygen,sans-serif;background:var(--bg);color:var(--text);line-height:1.5;padding:1.5rem;max-width:1100px;margin:0 auto}
header h1{font-size:1.25rem;font-weight:700;color:var(--blue);margin-bottom:.75rem}
.status{min-height:1.5rem;margin-bottom:1rem;font-size:.9rem;color:var(--muted)}
.status.success{color:#15803d}
.status.failure{color:#b91c1c}
.card{background:var(--surface);border:1px solid var(--border);border-radius:var(--radius);padding:1rem;margin-bottom:1rem;overflow-x:auto}
table{border-collapse:collapse;width:100%;font-size:.875rem}
th,td{padding:.5rem;border:1px solid var(--border)}
th{background:#dbeafe;color:var(--blue);font-weight:600;cursor:pointer;user-select:none}
tbody tr:hover{background:#f9fafb}
.num{text-align:right;font-variant-numeric:tabular-nums}
.center{text-align:center}
.strong{font-weight:600}
.text-green-600{color:#16a34a}
.text-orange-600{color:#ea580c}
.text-red-600{color:#dc2626}
svg text{font-size:11px;fill:var(--muted)}
svg .bar:focus{outline:none;stroke-width:2}
</style>
</head>
"##
    }

    fn template_script() -> &'static str {
        r##"<script>
(function(){
  const table=document.getElementById("resultTable");
  const dir={};
  table.querySelectorAll("th").forEach(th=>{
    th.addEventListener("click",()=>{
      const col=+th.dataset.col;
      const body=table.tBodies[0];
      const rows=[...body.rows];
      dir[col]=!dir[col];
      const key=r=>r.cells[col].textContent.trim();
      rows.sort((a,b)=>{
        const x=key(a),y=key(b);
        const c=col===1?parseFloat(x)-parseFloat(y):x.localeCompare(y);
        return dir[col]?c:-c;
      });
      rows.forEach(r=>body.appendChild(r));
    });
  });
})();
</script>
"##
    }
}

/// Inline SVG bar chart with a zero baseline and per-bar tooltips
fn chart_svg(spec: &ChartSpec) -> String {
    let n = spec.bars.len();
    let plot_width = (MIN_WIDTH - MARGIN_LEFT - MARGIN_RIGHT).max(SLOT * n as f64);
    let width = MARGIN_LEFT + plot_width + MARGIN_RIGHT;
    let height = MARGIN_TOP + PLOT_HEIGHT + MARGIN_BOTTOM;
    let slot = if n == 0 { plot_width } else { plot_width / n as f64 };

    let hi = spec.bars.iter().map(|b| b.value).fold(0.0_f64, f64::max);
    let lo = spec.bars.iter().map(|b| b.value).fold(0.0_f64, f64::min);
    let (lo, hi) = if hi - lo <= f64::EPSILON { (0.0, 1.0) } else { (lo, hi) };
    let y = |v: f64| MARGIN_TOP + (hi - v) / (hi - lo) * PLOT_HEIGHT;

    let mut svg = String::with_capacity(4096);
    let _ = writeln!(
        svg,
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{:.0}" height="{:.0}" viewBox="0 0 {:.0} {:.0}" role="img" aria-label="{}">"##,
        width,
        height,
        width,
        height,
        escape_html(spec.dataset_label)
    );

    for k in 0..=TICKS {
        let v = lo + (hi - lo) * k as f64 / TICKS as f64;
        let _ = writeln!(
            svg,
            r##"<line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="#e2e8f0"/><text x="{:.1}" y="{:.1}" text-anchor="end">{:.1}</text>"##,
            MARGIN_LEFT,
            y(v),
            MARGIN_LEFT + plot_width,
            y(v),
            MARGIN_LEFT - 6.0,
            y(v) + 4.0,
            v
        );
    }

    // Axes: value axis and zero baseline
    let _ = writeln!(
        svg,
        r##"<line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="#64748b"/><line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="#64748b"/>"##,
        MARGIN_LEFT,
        MARGIN_TOP,
        MARGIN_LEFT,
        MARGIN_TOP + PLOT_HEIGHT,
        MARGIN_LEFT,
        y(0.0),
        MARGIN_LEFT + plot_width,
        y(0.0)
    );
    let _ = writeln!(
        svg,
        r##"<text x="14" y="{:.1}" text-anchor="middle" transform="rotate(-90 14 {:.1})">{}</text>"##,
        MARGIN_TOP + PLOT_HEIGHT / 2.0,
        MARGIN_TOP + PLOT_HEIGHT / 2.0,
        escape_html(spec.axis_title)
    );

    for (i, bar) in spec.bars.iter().enumerate() {
        let x = MARGIN_LEFT + i as f64 * slot + slot * 0.15;
        let top = y(bar.value.max(0.0));
        let bottom = y(bar.value.min(0.0));
        let label = escape_html(&bar.label);
        let tooltip = if spec.tooltips {
            format!(
                "<title>{}: {}</title>",
                label,
                format_score(bar.value)
            )
        } else {
            String::new()
        };
        let _ = writeln!(
            svg,
            r##"<rect class="bar" tabindex="0" x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{}" stroke="{}" stroke-width="{}">{}</rect>"##,
            x,
            top,
            slot * 0.7,
            bottom - top,
            bar.fill,
            spec.border_color,
            spec.border_width,
            tooltip
        );
        let _ = writeln!(
            svg,
            r##"<text x="{:.1}" y="{:.1}" text-anchor="middle">{}</text>"##,
            MARGIN_LEFT + i as f64 * slot + slot / 2.0,
            MARGIN_TOP + PLOT_HEIGHT + 18.0,
            label
        );
    }

    svg.push_str("</svg>");
    svg
}

impl TableSink for HtmlDashboard {
    fn replace_table(&mut self, view: &TableView) -> io::Result<()> {
        self.table = Some(view.clone());
        self.flush()
    }
}

impl ChartSurface for HtmlDashboard {
    fn draw_chart(&mut self, id: ChartId, spec: &ChartSpec) -> io::Result<()> {
        if let Some((live, _)) = &self.chart {
            log::warn!("chart {} still live when drawing chart {}; replacing it", live.get(), id.get());
        }
        self.chart = Some((id, spec.clone()));
        self.flush()
    }

    // The page is rewritten by the draw that follows
    fn dispose_chart(&mut self, id: ChartId) -> io::Result<()> {
        if matches!(&self.chart, Some((live, _)) if *live == id) {
            self.chart = None;
        }
        Ok(())
    }
}

impl StatusDisplay for HtmlDashboard {
    fn set_status(&mut self, status: &Status) -> io::Result<()> {
        self.status = Some(status.clone());
        self.flush()
    }

    fn warn(&mut self, _message: &str) -> io::Result<()> {
        // Prompts belong to the interactive surface; the page keeps its status
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{ChartRenderer, TableRenderer};
    use crate::{ResultRecord, ResultSet};
    use tempfile::TempDir;

    fn sample() -> ResultSet {
        ResultSet::from(vec![
            ResultRecord::new("Acme", 3.5, "Low", "Should lend"),
            ResultRecord::new("Beta", 2.0, "Medium", "Should review further"),
        ])
    }

    fn render(board: &mut HtmlDashboard, chart: &mut ChartRenderer, set: &ResultSet) {
        TableRenderer::default().render(set, board).unwrap();
        chart.render(set, board).unwrap();
        board.set_status(&Status::success("Processed 2 rows")).unwrap();
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<b>\"A&B\" 'x'</b>"),
            "&lt;b&gt;&quot;A&amp;B&quot; &#39;x&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_document_regions_and_rows() {
        let dir = TempDir::new().unwrap();
        let mut board = HtmlDashboard::new(dir.path().join("board.html"));
        render(&mut board, &mut ChartRenderer::new(), &sample());

        let html = fs::read_to_string(board.path()).unwrap();
        assert!(html.contains("id=\"status\" class=\"status success\">Processed 2 rows<"));
        assert!(html.contains("id=\"resultTable\""));
        assert!(html.contains("id=\"zscoreChart\""));
        assert!(html.contains("<td>Acme</td><td class=\"num\">3.50</td>"));
        assert!(html.contains("text-green-600\">Should lend</td>"));
        assert!(html.contains("text-orange-600\">Should review further</td>"));
        assert!(html.contains("fill=\"rgba(34,197,94,0.6)\""));
        assert!(html.contains("fill=\"rgba(249,115,22,0.6)\""));
        assert!(html.contains("<title>Acme: 3.50</title>"));
    }

    #[test]
    fn test_render_twice_is_identical() {
        let dir = TempDir::new().unwrap();
        let mut board = HtmlDashboard::new(dir.path().join("board.html"));
        let mut chart = ChartRenderer::new();

        render(&mut board, &mut chart, &sample());
        let first = fs::read_to_string(board.path()).unwrap();
        render(&mut board, &mut chart, &sample());
        let second = fs::read_to_string(board.path()).unwrap();

        assert_eq!(first, second);
        assert_eq!(second.matches("<svg").count(), 1);
        assert_eq!(second.matches("<tr><td>").count(), 2);
    }

    #[test]
    fn test_empty_set_renders_header_and_axes() {
        let dir = TempDir::new().unwrap();
        let mut board = HtmlDashboard::new(dir.path().join("board.html"));
        render(&mut board, &mut ChartRenderer::new(), &ResultSet::default());

        let html = fs::read_to_string(board.path()).unwrap();
        assert_eq!(html.matches("<th ").count(), 4);
        assert!(!html.contains("<tr><td>"));
        assert!(html.contains("<svg"));
        assert!(html.contains("<line"));
        assert!(!html.contains("class=\"bar\""));
    }

    #[test]
    fn test_names_are_escaped() {
        let set = ResultSet::from(vec![ResultRecord::new(
            "<script>alert(1)</script>",
            1.0,
            "High",
            "No",
        )]);
        let mut board = HtmlDashboard::new("unused.html");
        board.table = Some(TableRenderer::default().build(&set));
        board.chart = Some((ChartId::new(0), ChartRenderer::build(&set)));
        let html = board.document();
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    }

    #[test]
    fn test_dispose_only_removes_matching_chart() {
        let dir = TempDir::new().unwrap();
        let mut board = HtmlDashboard::new(dir.path().join("board.html"));
        let spec = ChartRenderer::build(&sample());
        board.draw_chart(ChartId::new(3), &spec).unwrap();

        board.dispose_chart(ChartId::new(2)).unwrap();
        assert!(board.document().contains("<svg"));

        board.dispose_chart(ChartId::new(3)).unwrap();
        assert!(!board.document().contains("<svg"));
    }

    #[test]
    fn test_status_alone_keeps_previous_page() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("board.html");
        fs::write(&path, "<p>previous run</p>").unwrap();

        let mut board = HtmlDashboard::new(&path);
        board.set_status(&Status::progress("Uploading")).unwrap();
        board.set_status(&Status::failure("Error")).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "<p>previous run</p>");
    }

    #[test]
    fn test_status_after_render_rewrites_page() {
        let dir = TempDir::new().unwrap();
        let mut board = HtmlDashboard::new(dir.path().join("board.html"));
        render(&mut board, &mut ChartRenderer::new(), &sample());

        board.set_status(&Status::failure("Error while processing data!")).unwrap();

        let html = fs::read_to_string(board.path()).unwrap();
        assert!(html.contains("class=\"status failure\">Error while processing data!<"));
        assert!(html.contains("<td>Acme</td>"));
        assert!(html.contains("<svg"));
    }

    #[test]
    fn test_write_leaves_only_the_page() {
        let dir = TempDir::new().unwrap();
        let mut board = HtmlDashboard::new(dir.path().join("board.html"));
        let mut chart = ChartRenderer::new();
        render(&mut board, &mut chart, &sample());
        render(&mut board, &mut chart, &sample());

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![OsString::from("board.html")]);
        assert_eq!(
            board.staging_path(),
            dir.path().join(".board.html.tmp")
        );
    }

    #[test]
    fn test_redraw_keeps_chart_on_disk_until_replaced() {
        let dir = TempDir::new().unwrap();
        let mut board = HtmlDashboard::new(dir.path().join("board.html"));
        let mut chart = ChartRenderer::new();
        render(&mut board, &mut chart, &sample());
        let id = chart.current().unwrap();

        board.dispose_chart(id).unwrap();

        let html = fs::read_to_string(board.path()).unwrap();
        assert!(html.contains("<svg"));
        assert!(!board.document().contains("<svg"));
    }

    #[test]
    fn test_negative_bar_hangs_below_baseline() {
        let set = ResultSet::from(vec![
            ResultRecord::new("Up", 2.0, "Medium", "review"),
            ResultRecord::new("Down", -2.0, "High", "No"),
        ]);
        let svg = chart_svg(&ChartRenderer::build(&set));
        // lo = -2, hi = 2: baseline sits mid-plot, both bars are half the plot tall
        let baseline = MARGIN_TOP + PLOT_HEIGHT / 2.0;
        assert!(svg.contains(&format!("y=\"{:.1}\" width", baseline)));
        assert_eq!(svg.matches(&format!("height=\"{:.1}\"", PLOT_HEIGHT / 2.0)).count(), 2);
    }
}
