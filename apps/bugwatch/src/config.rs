//! Configuration discovery and effective settings resolution.
//!
//! Bugwatch reads `bugwatch.toml|yaml|yml` from the start directory (or the
//! closest ancestor) and merges it with CLI flags to produce an `Effective`
//! config. Defaults reproduce the Mozilla accessibility triage setup:
//! - `search.endpoint`: Bugzilla REST `bug` endpoint
//! - `report.queries`: the two accessibility quicksearch queries
//! - `notify.queries`: open bugs with a11y-review requested
//! - `notify.state_file`: `~/data/mozA11yReviewNotifier.json`
//! - `notify.smtp_host|smtp_port`: `localhost:25`
//!
//! Overrides precedence: CLI > config file > defaults.

use crate::error::ConfigError;
use crate::notify::MailSettings;
use crate::query::Query;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_ENDPOINT: &str = "https://bugzilla.mozilla.org/rest/bug";
pub const DEFAULT_SHOW_BUG_URL: &str = "https://bugzilla.mozilla.org/show_bug.cgi?id=";
pub const REPORT_FIELDS: &[&str] = &[
    "id",
    "summary",
    "product",
    "component",
    "severity",
    "type",
    "whiteboard",
];
pub const NOTIFY_FIELDS: &[&str] = &["id", "summary", "status"];
pub const OUTPUT_MODES: &[&str] = &["tsv", "html", "json"];

const CONFIG_NAMES: &[&str] = &["bugwatch.toml", "bugwatch.yaml", "bugwatch.yml"];

#[derive(Debug, Default, Deserialize, Clone)]
/// Search endpoint section under `[search]`.
pub struct SearchCfg {
    pub endpoint: Option<String>,
    pub show_bug_url: Option<String>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Report pipeline section under `[report]`.
pub struct ReportCfg {
    pub queries: Option<Vec<Query>>,
    pub fields: Option<Vec<String>>,
    pub output: Option<String>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Notifier pipeline section under `[notify]`.
pub struct NotifyCfg {
    pub queries: Option<Vec<Query>>,
    pub fields: Option<Vec<String>>,
    pub state_file: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub subject: Option<String>,
    pub intro: Option<String>,
    pub smtp_host: Option<String>,
    pub smtp_port: Option<u16>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Root configuration loaded from `bugwatch.toml|yaml`.
pub struct BugwatchConfig {
    #[serde(default)]
    pub search: Option<SearchCfg>,
    #[serde(default)]
    pub report: Option<ReportCfg>,
    #[serde(default)]
    pub notify: Option<NotifyCfg>,
}

#[derive(Debug, Clone)]
/// Fully-resolved configuration used by commands after applying precedence.
pub struct Effective {
    pub config_path: Option<PathBuf>,
    pub endpoint: String,
    pub show_bug_url: String,
    pub report_queries: Vec<Query>,
    pub report_fields: Vec<String>,
    pub output: String,
    pub notify_queries: Vec<Query>,
    pub notify_fields: Vec<String>,
    pub state_file: PathBuf,
    pub mail: MailSettings,
    pub smtp_host: String,
    pub smtp_port: u16,
}

#[derive(Debug, Default, Clone)]
/// CLI flags that take part in resolution.
pub struct Overrides {
    pub repo_root: Option<String>,
    pub config: Option<String>,
    pub endpoint: Option<String>,
    pub queries: Vec<String>,
    pub output: Option<String>,
    pub state_file: Option<String>,
    pub to: Option<String>,
}

pub fn default_report_queries() -> Vec<Query> {
    vec![
        Query::quick("component:disability -product:thunderbird"),
        Query::quick(
            "keywords:access -component:disability product:core,devtools,fenix,firefox,focus,toolkit -product:graveyard",
        ),
    ]
}

pub fn default_notify_queries() -> Vec<Query> {
    let params = [
        ("bug_status", "UNCONFIRMED"),
        ("bug_status", "NEW"),
        ("bug_status", "ASSIGNED"),
        ("bug_status", "REOPENED"),
        ("f1", "classification"),
        ("o1", "notequals"),
        ("v1", "Graveyard"),
        ("field0-0-0", "cf_a11y_review_project_flag"),
        ("type0-0-0", "substring"),
        ("value0-0-0", "requested"),
    ];
    vec![Query::Advanced {
        params: params
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    }]
}

/// Walk upward from `start` to find a config file.
///
/// Stops at the first directory holding `bugwatch.toml|yaml|yml` or `.git`.
pub fn find_config(start: &Path) -> Option<PathBuf> {
    // A relative start such as "." has no parent to walk to.
    let start = if start.is_absolute() {
        start.to_path_buf()
    } else {
        std::env::current_dir().ok()?.join(start)
    };
    let mut cur = start.as_path();
    loop {
        for name in CONFIG_NAMES {
            let p = cur.join(name);
            if p.is_file() {
                return Some(p);
            }
        }
        if cur.join(".git").exists() {
            return None;
        }
        cur = cur.parent()?;
    }
}

/// Parse a config file; format is chosen by extension.
pub fn load_config(path: &Path) -> Result<BugwatchConfig, ConfigError> {
    let s = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    let parsed = if is_yaml {
        serde_yaml::from_str(&s).map_err(|e| e.to_string())
    } else {
        toml::from_str(&s).map_err(|e| e.to_string())
    };
    parsed.map_err(|reason| ConfigError::Parse {
        path: path.to_path_buf(),
        reason,
    })
}

/// Expand a leading `~/` using `HOME`.
pub fn expand_home(p: &str) -> PathBuf {
    if let Some(rest) = p.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(rest);
        }
    }
    PathBuf::from(p)
}

/// Resolve `Effective` by merging CLI flags, discovered config, and defaults.
pub fn resolve_effective(cli: &Overrides) -> Result<Effective, ConfigError> {
    let config_path = match cli.config.as_deref() {
        Some(p) => Some(PathBuf::from(p)),
        None => find_config(&PathBuf::from(cli.repo_root.as_deref().unwrap_or("."))),
    };
    let cfg = match config_path.as_deref() {
        Some(p) => load_config(p)?,
        None => BugwatchConfig::default(),
    };
    let search = cfg.search.unwrap_or_default();
    let report = cfg.report.unwrap_or_default();
    let notify = cfg.notify.unwrap_or_default();

    let endpoint = cli
        .endpoint
        .clone()
        .or(search.endpoint)
        .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
    let show_bug_url = search
        .show_bug_url
        .unwrap_or_else(|| DEFAULT_SHOW_BUG_URL.to_string());

    let report_queries = if !cli.queries.is_empty() {
        cli.queries.iter().map(Query::quick).collect()
    } else {
        report.queries.unwrap_or_else(default_report_queries)
    };
    let report_fields = report
        .fields
        .unwrap_or_else(|| REPORT_FIELDS.iter().map(|s| s.to_string()).collect());

    let output = cli
        .output
        .clone()
        .or(report.output)
        .unwrap_or_else(|| "tsv".to_string());
    if !OUTPUT_MODES.contains(&output.as_str()) {
        return Err(ConfigError::Invalid(format!(
            "unknown output mode '{}' (expected one of: {})",
            output,
            OUTPUT_MODES.join(", ")
        )));
    }

    let notify_queries = notify.queries.unwrap_or_else(default_notify_queries);
    let notify_fields = notify
        .fields
        .unwrap_or_else(|| NOTIFY_FIELDS.iter().map(|s| s.to_string()).collect());
    let state_file = expand_home(
        cli.state_file
            .as_deref()
            .or(notify.state_file.as_deref())
            .unwrap_or("~/data/mozA11yReviewNotifier.json"),
    );

    let mail = MailSettings {
        from: notify.from.unwrap_or_else(|| {
            "Moz a11y-review request notifier <jamie+mozA11yReviewNotifier@jantrid.net>"
                .to_string()
        }),
        to: cli
            .to
            .clone()
            .or(notify.to)
            .unwrap_or_else(|| "jteh@mozilla.com".to_string()),
        subject: notify
            .subject
            .unwrap_or_else(|| "New a11y-review requests".to_string()),
        intro: Some(
            notify
                .intro
                .unwrap_or_else(|| "There are new requests for a11y-review!".to_string()),
        )
        .filter(|s| !s.is_empty()),
        show_bug_url: show_bug_url.clone(),
    };

    Ok(Effective {
        config_path,
        endpoint,
        show_bug_url,
        report_queries,
        report_fields,
        output,
        notify_queries,
        notify_fields,
        state_file,
        mail,
        smtp_host: notify.smtp_host.unwrap_or_else(|| "localhost".to_string()),
        smtp_port: notify.smtp_port.unwrap_or(25),
    })
}
