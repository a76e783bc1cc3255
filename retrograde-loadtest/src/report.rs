//! Rendering of the final statistics

use crate::error::LoadTestResult;
use crate::metrics::{EntryReport, LoadTestReport};
use std::fmt::Write as _;
use std::path::Path;

const HEADER: [&str; 10] = [
    "Type", "Name", "# reqs", "# fails", "Avg", "Min", "Max", "p50", "p95", "req/s",
];

/// Plain-text table, one row per `(method, name)` plus the aggregate
pub fn render_table(report: &LoadTestReport) -> String {
    let mut rows: Vec<[String; 10]> = report.entries.iter().map(row).collect();
    rows.push(row(&report.aggregated));

    let mut widths = HEADER.map(str::len);
    for r in &rows {
        for (width, cell) in widths.iter_mut().zip(r.iter()) {
            *width = (*width).max(cell.len());
        }
    }

    let mut out = String::new();
    push_line(&mut out, &HEADER.map(str::to_string), &widths);
    let rule = "-".repeat(widths.iter().sum::<usize>() + 2 * (widths.len() - 1));
    let _ = writeln!(out, "{}", rule);

    let last = rows.len() - 1;
    for (index, r) in rows.iter().enumerate() {
        if index == last {
            let _ = writeln!(out, "{}", rule);
        }
        push_line(&mut out, r, &widths);
    }

    let failures: Vec<(&EntryReport, &String, &u64)> = report
        .entries
        .iter()
        .flat_map(|e| e.failure_reasons.iter().map(move |(reason, count)| (e, reason, count)))
        .collect();

    if !failures.is_empty() {
        let _ = writeln!(out, "\nFailures:");
        for (entry, reason, count) in failures {
            let method = entry.method.map(|m| m.as_str()).unwrap_or("");
            let _ = writeln!(out, "  {:>6}  {} {}: {}", count, method, entry.name, reason);
        }
    }

    let _ = writeln!(
        out,
        "\n{} users, {:.1}s, {:.2}% failed",
        report.users,
        report.duration_ms as f64 / 1000.0,
        report.aggregated.failure_rate * 100.0
    );

    out
}

/// Write the report as pretty-printed JSON
pub fn write_json(report: &LoadTestReport, path: impl AsRef<Path>) -> LoadTestResult<()> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)?;
    Ok(())
}

fn row(entry: &EntryReport) -> [String; 10] {
    [
        entry.method.map(|m| m.to_string()).unwrap_or_default(),
        entry.name.clone(),
        entry.requests.to_string(),
        format!("{} ({:.1}%)", entry.failures, entry.failure_rate * 100.0),
        format!("{:.0}", entry.average_response_time_ms),
        entry.min_response_time_ms.to_string(),
        entry.max_response_time_ms.to_string(),
        entry.p50_response_time_ms.to_string(),
        entry.p95_response_time_ms.to_string(),
        format!("{:.2}", entry.requests_per_second),
    ]
}

fn push_line(out: &mut String, cells: &[String; 10], widths: &[usize; 10]) {
    let line = cells
        .iter()
        .zip(widths.iter())
        .enumerate()
        .map(|(index, (cell, width))| {
            // Name left-aligned, figures right-aligned
            if index <= 1 {
                format!("{:<width$}", cell, width = width)
            } else {
                format!("{:>width$}", cell, width = width)
            }
        })
        .collect::<Vec<_>>()
        .join("  ");
    let _ = writeln!(out, "{}", line.trim_end());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{MetricsCollector, RequestRecord};
    use crate::outcome::Outcome;
    use retrograde_http::HttpMethod;
    use std::time::Duration;

    async fn sample_report() -> LoadTestReport {
        let metrics = MetricsCollector::new().unwrap();
        metrics
            .record(RequestRecord {
                method: HttpMethod::Get,
                name: "Load Board".to_string(),
                status: Some(200),
                elapsed: Duration::from_millis(12),
                outcome: Outcome::Success,
            })
            .await;
        metrics
            .record(RequestRecord {
                method: HttpMethod::Post,
                name: "Vote on a Card".to_string(),
                status: Some(500),
                elapsed: Duration::from_millis(40),
                outcome: Outcome::Failure("HTTP 500".to_string()),
            })
            .await;
        metrics.snapshot(2).await
    }

    #[tokio::test]
    async fn test_render_table() {
        let table = render_table(&sample_report().await);

        assert!(table.starts_with("Type"));
        assert!(table.contains("GET   Load Board"));
        assert!(table.contains("POST  Vote on a Card"));
        assert!(table.contains("Aggregated"));
        assert!(table.contains("Failures:"));
        assert!(table.contains("POST Vote on a Card: HTTP 500"));
        assert!(table.contains("2 users"));
        assert!(table.contains("50.00% failed"));
    }

    #[tokio::test]
    async fn test_write_json() {
        let report = sample_report().await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");

        write_json(&report, &path).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["users"], 2);
        assert_eq!(written["aggregated"]["requests"], 2);
        assert_eq!(written["entries"][0]["method"], "GET");
        assert_eq!(written["entries"][1]["failure_reasons"]["HTTP 500"], 1);
    }
}
