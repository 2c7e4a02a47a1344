//! HTML results report generator.
//!
//! Produces a self-contained HTML file with all CSS/JS inlined.

use anyhow::Result;
use std::path::Path;

use classmark_core::results::ResultRecord;
use classmark_core::statistics::{ResultsSummary, ScoreDistribution};

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn score_band(score: u8) -> &'static str {
    if score >= 80 {
        "high"
    } else if score >= 60 {
        "mid"
    } else {
        "low"
    }
}

/// Generate an HTML results page for one test's published records.
///
/// `title` is whatever the caller knows about the test, usually its
/// title when the definition is at hand and its id otherwise.
pub fn generate_html(title: &str, records: &[ResultRecord]) -> String {
    let summary = ResultsSummary::from_records(records);
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>classmark results — {}</title>\n",
        html_escape(title)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str("<h1>classmark results</h1>\n");
    html.push_str(&format!(
        "<p class=\"meta\">Test: <strong>{}</strong> | {} attempts | {}</p>\n",
        html_escape(title),
        summary.attempts,
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    // Summary dashboard
    html.push_str("<section class=\"dashboard\">\n");
    html.push_str("<h2>Summary</h2>\n");
    html.push_str("<table class=\"summary\">\n");
    html.push_str(
        "<thead><tr><th>Attempts</th><th>Average</th><th>Highest</th><th>Lowest</th></tr></thead>\n",
    );
    html.push_str(&format!(
        "<tbody><tr><td>{}</td><td>{:.1}%</td><td>{}%</td><td>{}%</td></tr></tbody>\n",
        summary.attempts, summary.average_score, summary.highest_score, summary.lowest_score
    ));
    html.push_str("</table>\n");

    if !records.is_empty() {
        html.push_str("<h2>Score distribution</h2>\n");
        html.push_str(&generate_distribution_chart(&summary.distribution));
    }
    html.push_str("</section>\n");

    // Per-student records
    html.push_str("<section class=\"records\">\n");
    html.push_str("<h2>Attempts</h2>\n");
    html.push_str("<table class=\"records-table\" id=\"records\">\n");
    html.push_str("<thead><tr><th onclick=\"sortTable(0)\">Student</th><th onclick=\"sortTable(1)\">Class</th><th onclick=\"sortTable(2)\">Score</th><th onclick=\"sortTable(3)\">Correct</th><th onclick=\"sortTable(4)\">Submitted</th></tr></thead>\n");
    html.push_str("<tbody>\n");

    for record in records {
        let band = score_band(record.score);
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td class=\"{}\">{}%</td><td>{}/{}</td><td>{}</td></tr>\n",
            html_escape(&record.student_name),
            html_escape(&record.class_name),
            band,
            record.score,
            record.correct_count,
            record.total_count,
            record.submitted_at.format("%Y-%m-%d %H:%M"),
        ));
    }

    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(
        &serde_json::to_string_pretty(records)
            .unwrap_or_default()
            .replace('<', "&lt;")
            .replace('>', "&gt;"),
    );
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    // JavaScript for sorting
    html.push_str("<script>\n");
    html.push_str(JS);
    html.push_str("</script>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write an HTML results page to a file.
pub fn write_html_report(title: &str, records: &[ResultRecord], path: &Path) -> Result<()> {
    let html = generate_html(title, records);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)?;
    Ok(())
}

fn generate_distribution_chart(distribution: &ScoreDistribution) -> String {
    let bar_height = 30;
    let max_width = 400;
    let padding = 10;
    let label_width = 110;

    let buckets = distribution.buckets();
    let max_count = buckets.iter().map(|(_, count)| *count).max().unwrap_or(0);

    let total_height = buckets.len() * (bar_height + padding) + padding;

    let mut svg = format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        label_width + max_width + 60,
        total_height
    );

    // Highest band first, same order as the buckets.
    let colors = ["#22c55e", "#4ade80", "#eab308", "#f97316", "#ef4444"];

    for (i, (label, count)) in buckets.iter().enumerate() {
        let y = i * (bar_height + padding) + padding;
        let width = if max_count == 0 {
            0
        } else {
            (f64::from(*count) / f64::from(max_count) * max_width as f64) as usize
        };

        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"14\" fill=\"currentColor\" text-anchor=\"end\" dominant-baseline=\"middle\">{}</text>\n",
            label_width - 10,
            y + bar_height / 2,
            label
        ));
        svg.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" rx=\"4\"/>\n",
            label_width, y, width, bar_height, colors[i]
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"currentColor\" dominant-baseline=\"middle\">{}</text>\n",
            label_width + width + 8,
            y + bar_height / 2,
            count
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --muted: #6b7280; --high: #dcfce7; --mid: #fef9c3; --low: #fde2e2; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --muted: #9ca3af; --high: #064e3b; --mid: #713f12; --low: #7f1d1d; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: var(--muted); }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); cursor: pointer; }
.high { background: var(--high); }
.mid { background: var(--mid); }
.low { background: var(--low); }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 1rem 0; }
"#;

const JS: &str = r#"
function sortTable(col) {
  const table = document.getElementById('records');
  const tbody = table.querySelector('tbody');
  const rows = Array.from(tbody.querySelectorAll('tr'));
  const asc = table.dataset.sortCol == col && table.dataset.sortDir == 'asc' ? false : true;
  rows.sort((a, b) => {
    const va = a.cells[col].textContent;
    const vb = b.cells[col].textContent;
    const na = parseFloat(va);
    const nb = parseFloat(vb);
    if (!isNaN(na) && !isNaN(nb)) return asc ? na - nb : nb - na;
    return asc ? va.localeCompare(vb) : vb.localeCompare(va);
  });
  table.dataset.sortCol = col;
  table.dataset.sortDir = asc ? 'asc' : 'desc';
  rows.forEach(r => tbody.appendChild(r));
}
"#;
