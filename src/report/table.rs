use chrono::{DateTime, Utc};

use super::{RankedReport, ReportRow};

const MISSING: &str = "MISSING";

const COLUMNS: [&str; 10] = [
    "global_index",
    "out_height",
    "out_timestamp",
    "age_seconds",
    "inv_age",
    "norm_age",
    "neglog",
    "softmax_norm_age",
    "gnh_score",
    "newest_rank",
];

fn int_cell(v: Option<u64>) -> String {
    v.map_or_else(|| MISSING.to_string(), |v| v.to_string())
}

fn float_cell(v: Option<f64>) -> String {
    v.map_or_else(|| MISSING.to_string(), |v| format!("{v:.6}"))
}

fn cells(row: &ReportRow) -> [String; 10] {
    [
        row.global_index.to_string(),
        int_cell(row.out_height),
        int_cell(row.out_timestamp),
        int_cell(row.age_seconds),
        row.inv_age
            .map_or_else(|| MISSING.to_string(), |v| format!("{v:.6e}")),
        float_cell(row.norm_age),
        float_cell(row.neglog),
        float_cell(row.softmax_norm_age),
        float_cell(row.gnh_score),
        row.newest_rank
            .map_or_else(|| MISSING.to_string(), |v| format!("{v:.1}")),
    ]
}

/// Ranked table as shown to the operator. Every ring member appears.
pub fn render_table(report: &RankedReport) -> String {
    let body: Vec<[String; 10]> = report.ranked().into_iter().map(cells).collect();

    let mut widths: [usize; 10] = COLUMNS.map(str::len);
    for row in &body {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.len());
        }
    }

    let mut out = String::from("=== Ranking by gnh_score");
    if report.has_missing() {
        out.push_str(&format!(" (missing shown as {MISSING})"));
    }
    out.push_str(" ===\n");

    out.push_str(&aligned(COLUMNS.iter().copied(), &widths));
    out.push('\n');
    for row in &body {
        out.push_str(&aligned(row.iter().map(String::as_str), &widths));
        out.push('\n');
    }
    out
}

fn aligned<'a>(cols: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    cols.zip(widths)
        .map(|(c, &w)| format!("{c:>w$}"))
        .collect::<Vec<_>>()
        .join("  ")
}

fn format_time(ts: u64) -> String {
    i64::try_from(ts)
        .ok()
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .map_or_else(|| ts.to_string(), |t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
}

pub fn render_summary(report: &RankedReport) -> String {
    let mut out = format!(
        "Transaction {} at height {} ({})\nRing size: {}, members with known age: {}\n",
        report.tx_hash,
        report.tx_height,
        format_time(report.tx_timestamp),
        report.ring_size(),
        report.known_ages(),
    );
    match report.top_suspect() {
        Some(row) => {
            let days = row.age_seconds.unwrap_or_default() as f64 / 86_400.0;
            out.push_str(&format!(
                "Most likely real spend (newest): global index {} at height {}, {days:.2} days old, newest_rank {}\n",
                row.global_index,
                int_cell(row.out_height),
                row.newest_rank
                    .map_or_else(|| MISSING.to_string(), |v| format!("{v:.1}")),
            ));
        }
        None => out.push_str("No ring member has a known age; nothing to rank.\n"),
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::sample_report;

    #[test]
    fn table_lists_every_member_ranked() {
        let table = render_table(&sample_report());
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "=== Ranking by gnh_score (missing shown as MISSING) ===");
        assert!(lines[1].trim_start().starts_with("global_index"));
        assert_eq!(lines.len(), 6);
        assert!(lines[2].trim_start().starts_with("15 "));
        assert!(lines[3].trim_start().starts_with("10 "));
        assert!(lines[4].contains(MISSING));
        assert!(lines[5].trim_start().starts_with("16 "));
    }

    #[test]
    fn columns_are_aligned() {
        let table = render_table(&sample_report());
        let widths: Vec<usize> = table.lines().skip(1).map(str::len).collect();
        assert!(widths.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn header_without_missing() {
        let mut report = sample_report();
        report.rows.retain(|r| r.gnh_score.is_some());
        let table = render_table(&report);
        assert!(table.starts_with("=== Ranking by gnh_score ===\n"));
    }

    #[test]
    fn summary_names_top_member() {
        let summary = render_summary(&sample_report());
        assert!(summary.contains("Ring size: 4, members with known age: 2"));
        assert!(summary.contains("global index 15 at height 200, 1.16 days old, newest_rank 1.0"));
        assert!(summary.contains("1970-01-24"));
    }

    #[test]
    fn summary_with_nothing_known() {
        let mut report = sample_report();
        for row in &mut report.rows {
            *row = ReportRow {
                global_index: row.global_index,
                out_height: None,
                out_timestamp: None,
                age_seconds: None,
                inv_age: None,
                norm_age: None,
                neglog: None,
                softmax_norm_age: None,
                gnh_score: None,
                newest_rank: None,
            };
        }
        assert!(render_summary(&report).contains("nothing to rank"));
    }
}
