//! Report and notifier pipelines wired from their stages.

use crate::config::Effective;
use crate::error::Result;
use crate::models::{Bug, SeenSet, TriagedBug};
use crate::notify::{Email, MailTransport, Notifier};
use crate::normalize::triage;
use crate::query::{run_queries, SearchClient};
use crate::sort::{sort_bugs, sort_by_id};
use crate::state::{self, StateStore};
use tracing::info;

/// Query, normalize and sort bugs for the tabular report.
pub fn run_report<C: SearchClient + ?Sized>(client: &C, eff: &Effective) -> Result<Vec<TriagedBug>> {
    let bugs = run_queries(client, &eff.report_queries, &eff.report_fields)?;
    let mut rows = triage(bugs);
    sort_bugs(&mut rows);
    info!(count = rows.len(), "report ready");
    Ok(rows)
}

#[derive(Debug)]
pub struct NotifyOutcome {
    /// Newly seen bugs, ascending by id.
    pub new: Vec<Bug>,
    pub sent: bool,
    /// Size of the id set saved for the next run.
    pub seen: usize,
}

/// Query, diff against the saved set, save the current set, then mail new
/// bugs. The state is saved before delivery, so a failed send is not
/// retried by the next run.
pub fn run_notify<C, T>(
    client: &C,
    store: &StateStore,
    notifier: &Notifier<'_, T>,
    eff: &Effective,
) -> Result<NotifyOutcome>
where
    C: SearchClient + ?Sized,
    T: MailTransport + ?Sized,
{
    let (current, new) = find_new(client, store, eff)?;
    store.save(&current)?;
    info!(new = new.len(), seen = current.len(), "state updated");
    let sent = notifier.notify(&new)?;
    Ok(NotifyOutcome {
        new,
        sent,
        seen: current.len(),
    })
}

/// Dry run: the mail that would be sent, without saving state or sending.
pub fn preview_notify<C, T>(
    client: &C,
    store: &StateStore,
    notifier: &Notifier<'_, T>,
    eff: &Effective,
) -> Result<Option<Email>>
where
    C: SearchClient + ?Sized,
    T: MailTransport + ?Sized,
{
    let (_, new) = find_new(client, store, eff)?;
    if new.is_empty() {
        return Ok(None);
    }
    Ok(Some(notifier.build_email(&new)))
}

fn find_new<C: SearchClient + ?Sized>(
    client: &C,
    store: &StateStore,
    eff: &Effective,
) -> Result<(SeenSet, Vec<Bug>)> {
    let bugs = run_queries(client, &eff.notify_queries, &eff.notify_fields)?;
    let previous = store.load()?;
    let mut new = state::diff(&bugs, &previous);
    sort_by_id(&mut new);
    Ok((state::ids(&bugs), new))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{resolve_effective, Overrides};
    use crate::error::Error;
    use crate::notify::tests::{settings, RecordingTransport};
    use crate::query::tests::{bug, FakeSearch};
    use crate::query::Query;
    use std::fs;
    use tempfile::tempdir;

    fn effective(dir: &std::path::Path) -> Effective {
        fs::create_dir_all(dir.join(".git")).unwrap();
        let mut eff = resolve_effective(&Overrides {
            repo_root: dir.to_str().map(str::to_string),
            ..Default::default()
        })
        .unwrap();
        eff.notify_queries = vec![Query::quick("review")];
        eff.report_queries = vec![Query::quick("one"), Query::quick("two")];
        eff.state_file = dir.join("seen.json");
        eff
    }

    fn search_with(review: Vec<Bug>) -> FakeSearch {
        let mut fake = FakeSearch::default();
        fake.results.insert("review".into(), review);
        fake
    }

    #[test]
    fn test_first_run_everything_is_new_and_sorted_by_id() {
        let dir = tempdir().unwrap();
        let eff = effective(dir.path());
        let store = StateStore::new(&eff.state_file);
        let transport = RecordingTransport::default();
        let notifier = Notifier::new(&transport, settings());
        let client = search_with(vec![bug(30, "c"), bug(10, "a"), bug(20, "b")]);

        let out = run_notify(&client, &store, &notifier, &eff).unwrap();
        assert!(out.sent);
        assert_eq!(out.new.iter().map(|b| b.id).collect::<Vec<_>>(), vec![10, 20, 30]);
        let sent = transport.sent.borrow();
        assert_eq!(sent.len(), 1);
        let html = &sent[0].html;
        assert!(html.find("10: a").unwrap() < html.find("30: c").unwrap());
        assert_eq!(store.load().unwrap().len(), 3);
    }

    #[test]
    fn test_unchanged_second_run_sends_nothing_but_saves() {
        let dir = tempdir().unwrap();
        let eff = effective(dir.path());
        let store = StateStore::new(&eff.state_file);
        fs::write(&eff.state_file, "[1,2]").unwrap();
        let transport = RecordingTransport::default();
        let notifier = Notifier::new(&transport, settings());

        let out = run_notify(&search_with(vec![bug(2, "b"), bug(1, "a")]), &store, &notifier, &eff)
            .unwrap();
        assert!(!out.sent);
        assert!(out.new.is_empty());
        assert!(transport.sent.borrow().is_empty());
        assert_eq!(fs::read_to_string(&eff.state_file).unwrap(), "[1,2]");
    }

    #[test]
    fn test_state_replaced_by_current_set() {
        let dir = tempdir().unwrap();
        let eff = effective(dir.path());
        let store = StateStore::new(&eff.state_file);
        fs::write(&eff.state_file, "[1,2,3]").unwrap();
        let transport = RecordingTransport::default();
        let notifier = Notifier::new(&transport, settings());

        let out = run_notify(&search_with(vec![bug(3, "c"), bug(4, "d")]), &store, &notifier, &eff)
            .unwrap();
        assert_eq!(out.new.iter().map(|b| b.id).collect::<Vec<_>>(), vec![4]);
        assert_eq!(fs::read_to_string(&eff.state_file).unwrap(), "[3,4]");
    }

    #[test]
    fn test_query_failure_leaves_state_untouched() {
        let dir = tempdir().unwrap();
        let eff = effective(dir.path());
        let store = StateStore::new(&eff.state_file);
        fs::write(&eff.state_file, "[1]").unwrap();
        let transport = RecordingTransport::default();
        let notifier = Notifier::new(&transport, settings());
        let mut client = search_with(vec![bug(2, "b")]);
        client.failing = Some("review".into());

        let err = run_notify(&client, &store, &notifier, &eff).unwrap_err();
        assert!(matches!(err, Error::Query(_)));
        assert_eq!(err.exit_code(), 1);
        assert_eq!(fs::read_to_string(&eff.state_file).unwrap(), "[1]");
    }

    #[test]
    fn test_corrupt_state_is_fatal() {
        let dir = tempdir().unwrap();
        let eff = effective(dir.path());
        let store = StateStore::new(&eff.state_file);
        fs::write(&eff.state_file, "oops").unwrap();
        let transport = RecordingTransport::default();
        let notifier = Notifier::new(&transport, settings());

        let err = run_notify(&search_with(vec![bug(2, "b")]), &store, &notifier, &eff).unwrap_err();
        assert!(matches!(err, Error::State(_)));
        assert!(transport.sent.borrow().is_empty());
    }

    #[test]
    fn test_delivery_failure_after_state_saved() {
        let dir = tempdir().unwrap();
        let eff = effective(dir.path());
        let store = StateStore::new(&eff.state_file);
        let transport = RecordingTransport {
            fail: true,
            ..Default::default()
        };
        let notifier = Notifier::new(&transport, settings());

        let err = run_notify(&search_with(vec![bug(5, "e")]), &store, &notifier, &eff).unwrap_err();
        assert_eq!(err.exit_code(), 1);
        assert!(matches!(err, Error::Delivery(_)));
        assert_eq!(fs::read_to_string(&eff.state_file).unwrap(), "[5]");
    }

    #[test]
    fn test_preview_does_not_save() {
        let dir = tempdir().unwrap();
        let eff = effective(dir.path());
        let store = StateStore::new(&eff.state_file);
        let transport = RecordingTransport::default();
        let notifier = Notifier::new(&transport, settings());

        let email = preview_notify(&search_with(vec![bug(5, "e")]), &store, &notifier, &eff)
            .unwrap()
            .unwrap();
        assert!(email.html.contains("5: e"));
        assert!(!eff.state_file.exists());
        assert!(transport.sent.borrow().is_empty());
    }

    #[test]
    fn test_report_pipeline_merges_normalizes_and_sorts() {
        let dir = tempdir().unwrap();
        let eff = effective(dir.path());
        let raw = |id: u64, sev: &str, ty: &str, wb: &str| -> Bug {
            serde_json::from_value(serde_json::json!({
                "id": id, "summary": "s", "severity": sev, "type": ty,
                "product": "Core", "component": "A", "whiteboard": wb
            }))
            .unwrap()
        };
        let mut client = FakeSearch::default();
        client.results.insert(
            "one".into(),
            vec![raw(1, "normal", "defect", ""), raw(2, "--", "enhancement", "")],
        );
        client.results.insert(
            "two".into(),
            vec![raw(3, "normal", "defect", "[access-s1]"), raw(1, "normal", "defect", "")],
        );

        let rows = run_report(&client, &eff).unwrap();
        let got: Vec<(u64, String)> = rows
            .iter()
            .map(|r| (r.bug.id, r.severity.label().to_string()))
            .collect();
        assert_eq!(
            got,
            vec![
                (3, "s1".to_string()),
                (1, "s3".to_string()),
                (1, "s3".to_string()),
                (2, "enhancement".to_string()),
            ]
        );
    }
}
