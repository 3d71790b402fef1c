//! Coverage report rendering - console and Markdown

use crate::coverage::CoverageReport;

/// Render coverage as GitHub-flavoured Markdown (e.g. for a job summary).
///
/// Returns an empty string when there is nothing to report.
#[must_use]
pub fn render_markdown(reports: &[CoverageReport]) -> String {
    if reports.is_empty() {
        return String::new();
    }

    let mut lines = vec![
        "## OpenAPI Contract Test Coverage".to_string(),
        String::new(),
    ];

    for report in reports {
        lines.push(format!(
            "### {} — {}/{} endpoints ({}%)",
            report.contract,
            report.covered_count,
            report.total,
            format_pct(report.percentage())
        ));
        lines.push(String::new());

        if !report.covered.is_empty() {
            lines.push("| Status | Endpoint |".to_string());
            lines.push("|--------|----------|".to_string());
            for endpoint in &report.covered {
                lines.push(format!("| :white_check_mark: | `{endpoint}` |"));
            }
            lines.push(String::new());
        }

        if !report.uncovered.is_empty() {
            lines.push("<details>".to_string());
            lines.push(format!(
                "<summary>{} uncovered endpoints</summary>",
                report.uncovered.len()
            ));
            lines.push(String::new());
            lines.push("| Endpoint |".to_string());
            lines.push("|----------|".to_string());
            for endpoint in &report.uncovered {
                lines.push(format!("| `{endpoint}` |"));
            }
            lines.push(String::new());
            lines.push("</details>".to_string());
            lines.push(String::new());
        }
    }

    lines.join("\n")
}

/// Render coverage for a terminal.
///
/// Contracts with nothing covered are listed only if at least one contract
/// has coverage; with no coverage at all the result is empty.
#[must_use]
pub fn render_console(reports: &[CoverageReport]) -> String {
    if reports.iter().all(|r| r.covered_count == 0) {
        return String::new();
    }

    let rule = "=".repeat(50);
    let thin = "-".repeat(50);
    let mut lines = vec![
        String::new(),
        "OpenAPI Contract Test Coverage".to_string(),
        rule,
    ];

    for report in reports {
        lines.push(String::new());
        lines.push(format!(
            "[{}] {}/{} endpoints ({}%)",
            report.contract,
            report.covered_count,
            report.total,
            format_pct(report.percentage())
        ));
        lines.push(thin.clone());

        if !report.covered.is_empty() {
            lines.push("Covered:".to_string());
            for endpoint in &report.covered {
                lines.push(format!("  ✓ {endpoint}"));
            }
        }

        let uncovered = report.total.saturating_sub(report.covered_count);
        if uncovered > 0 {
            lines.push(format!("Uncovered: {uncovered} endpoints"));
        }
    }

    lines.push(String::new());
    lines.join("\n")
}

/// `100`, `0`, `33.3` - whole numbers lose the decimal.
fn format_pct(pct: f64) -> String {
    if pct.fract() == 0.0 {
        format!("{pct:.0}")
    } else {
        format!("{pct:.1}")
    }
}
