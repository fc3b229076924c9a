//! HTML and JSON output for a finished (or cancelled) run.
use anyhow::{Context, Result};
use rampup::{BatchSummary, Latency, RunReport};
use std::fmt::Write as _;
use std::path::Path;

pub fn write_html(report: &RunReport, path: &Path) -> Result<()> {
    let title = title_for(path);
    std::fs::write(path, render_html(report, &title))
        .with_context(|| format!("writing HTML report to {}", path.display()))
}

pub fn write_json(report: &RunReport, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json).with_context(|| format!("writing JSON report to {}", path.display()))
}

/// Page title: the report file name without its extension.
pub fn title_for(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Load Test".to_string())
}

pub fn render_html(report: &RunReport, title: &str) -> String {
    let title = escape(title);
    let mut summary_rows = String::new();
    let mut distribution = String::new();

    for summary in &report.summaries {
        let _ = writeln!(
            summary_rows,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            summary.concurrency_level,
            summary.count_succeeded,
            summary.count_failed,
            Latency(summary.mean_latency),
            Latency(summary.p95_latency),
            Latency(summary.max_latency),
            throughput(summary),
        );
        distribution.push_str(&distribution_table(summary));
    }

    let notice = if report.partial {
        "<p class=\"notice\">Run cancelled: only completed levels are shown.</p>"
    } else {
        ""
    };

    format!(
        r#"<html>
<head>
    <title>{title}</title>
    <style>
        body {{ font-family: Arial, sans-serif; margin: 0; padding: 20px; background-color: #f4f4f4; }}
        table {{ width: 100%; border-collapse: collapse; margin: 20px 0; box-shadow: 0 2px 15px rgba(0, 0, 0, 0.1); }}
        th, td {{ padding: 12px 15px; text-align: center; }}
        th {{ background-color: #009879; color: #ffffff; text-transform: uppercase; font-weight: 600; }}
        tr {{ border-bottom: 1px solid #dddddd; }}
        tr:nth-of-type(even) {{ background-color: #f3f3f3; }}
        .bar {{ display: inline-block; height: 10px; background-color: #009879; }}
        .notice {{ color: #b00020; font-weight: 600; }}
    </style>
</head>
<body>
    <h1>{title}</h1>
    <p>Endpoint: {endpoint}</p>
    {notice}
    <table>
        <tr><th>Concurrent users</th><th>Succeeded</th><th>Failed</th><th>Average</th><th>95th percentile</th><th>Max</th><th>Throughput (req/s)</th></tr>
{summary_rows}    </table>
{distribution}</body>
</html>
"#,
        endpoint = escape(&report.endpoint),
    )
}

fn distribution_table(summary: &BatchSummary) -> String {
    let mut rows = String::new();
    let peak = summary
        .latency_histogram_buckets
        .iter()
        .map(|b| b.count)
        .max()
        .unwrap_or(0)
        .max(1);

    for bucket in &summary.latency_histogram_buckets {
        let _ = writeln!(
            rows,
            "<tr><td>{} - {}</td><td>{}</td><td style=\"text-align: left\"><span class=\"bar\" style=\"width: {}%\"></span></td></tr>",
            Latency(Some(bucket.lower)),
            Latency(Some(bucket.upper)),
            bucket.count,
            bucket.count * 100 / peak,
        );
    }

    if rows.is_empty() {
        rows.push_str("<tr><td colspan=\"3\">No successful requests</td></tr>\n");
    }

    format!(
        "    <h2>Response time distribution with {} concurrent users</h2>\n    <table>\n        <tr><th>Latency</th><th>Requests</th><th></th></tr>\n{rows}    </table>\n",
        summary.concurrency_level
    )
}

fn throughput(summary: &BatchSummary) -> String {
    match summary.throughput_requests_per_second {
        Some(tps) => format!("{tps:.2}"),
        None => "n/a".to_string(),
    }
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
