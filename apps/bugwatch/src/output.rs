//! Rendering of report rows and notification bodies.
//!
//! Report modes: `tsv` (default), `html` and `json`. Notification mail is
//! always HTML.

use crate::models::{Bug, SeverityRank, TriagedBug};
use serde_json::json;
use serde_json::Value as JsonVal;
use std::collections::BTreeMap;

/// One line per row: id, summary, severity, product, component.
///
/// Tabs or newlines inside a summary are written as-is.
pub fn render_tsv(rows: &[TriagedBug]) -> String {
    let mut out = String::new();
    for r in rows {
        out.push_str(&format!(
            "{}\t{}\t{}\t{}\t{}\n",
            r.bug.id, r.bug.summary, r.severity, r.bug.product, r.bug.component
        ));
    }
    out
}

/// Minimal HTML document listing each bug as a link, in the given order.
pub fn render_html(bugs: &[Bug], show_bug_url: &str, intro: Option<&str>) -> String {
    let mut html = String::from("<html>\n<body>\n");
    if let Some(p) = intro {
        html.push_str(&format!("<p>{}</p>\n", escape_html(p)));
    }
    html.push_str("<ul>\n");
    for b in bugs {
        html.push_str(&format!(
            "<li><a href=\"{}{}\">{}: {}</a></li>\n",
            escape_html(show_bug_url),
            b.id,
            b.id,
            escape_html(&b.summary)
        ));
    }
    html.push_str("</ul>\n</body>\n</html>");
    html
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Compose report JSON object (pure) for testing/snapshot purposes.
pub fn compose_report_json(rows: &[TriagedBug]) -> JsonVal {
    let mut by_rank: BTreeMap<SeverityRank, usize> = BTreeMap::new();
    for r in rows {
        *by_rank.entry(r.severity.rank()).or_default() += 1;
    }
    let counts: serde_json::Map<String, JsonVal> = by_rank
        .into_iter()
        .map(|(rank, n)| {
            let key = serde_json::to_value(rank)
                .ok()
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_default();
            (key, json!(n))
        })
        .collect();
    json!({
        "results": rows,
        "summary": {"total": rows.len(), "by_severity": counts},
    })
}

/// Render the report in the requested mode.
pub fn render_report(rows: &[TriagedBug], output: &str, show_bug_url: &str) -> String {
    match output {
        "json" => {
            let mut s = serde_json::to_string_pretty(&compose_report_json(rows))
                .unwrap_or_else(|_| "{}".to_string());
            s.push('\n');
            s
        }
        "html" => {
            let bugs: Vec<Bug> = rows.iter().map(|r| r.bug.clone()).collect();
            let mut s = render_html(&bugs, show_bug_url, None);
            s.push('\n');
            s
        }
        _ => render_tsv(rows),
    }
}
