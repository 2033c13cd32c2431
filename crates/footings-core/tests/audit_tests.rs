use footings_core::constants::AUDIT_FORMAT_VERSION;
use footings_core::{AuditError, AuditTrace, Footing, RunConfig};
use serde_json::Value;

mod common;
use common::Three;

fn config() -> RunConfig {
    RunConfig { enforce_frozen: true,
                catch_panics: true,
                capture_backtrace: false }
}

#[test]
fn audit_records_one_snapshot_per_step() {
    let f = Footing::new(Three::new(1)).unwrap().with_config(config());
    let trace = f.audit().expect("audit");

    assert_eq!(trace.step_names(), vec!["s1", "s2", "s3"]);
    assert_eq!(trace.model, "Three");
    assert_eq!(trace.definition_hash, f.schema().definition_hash());
    assert!(trace.finished_at.is_some());

    for (i, entry) in trace.entries.iter().enumerate() {
        assert_eq!(entry.index, i);
        assert_eq!(entry.changed, entry.impacts, "step {}", entry.step);
        assert_eq!(entry.fingerprint.len(), 64);
    }
    assert_eq!(trace.entries[0].uses, vec!["start"]);
    assert_eq!(trace.entries[2].docstring.as_deref(), Some("Add the offset."));

    // snapshots are independent copies
    assert_eq!((trace.entries[0].state.a, trace.entries[0].state.b), (2, 0));
    assert_eq!((trace.entries[1].state.b, trace.entries[1].state.c), (20, 0));
    assert_eq!(trace.final_state().c, 25);
    assert_eq!(trace.entries[0].state.calls, vec!["s1"]);
}

#[test]
fn audit_leaves_the_instance_untouched() {
    let f = Footing::new(Three::new(1)).unwrap().with_config(config());
    let before = f.state().clone();
    f.audit().unwrap();
    assert_eq!(f.state(), &before);
}

#[test]
fn repeated_audits_share_fingerprints_but_not_run_ids() {
    let f = Footing::new(Three::new(7)).unwrap().with_config(config());
    let a = f.audit().unwrap();
    let b = f.audit().unwrap();
    assert_ne!(a.run_id, b.run_id);
    assert_eq!(a.fingerprint(), b.fingerprint());
}

#[test]
fn failed_audit_returns_the_partial_trace() {
    let f = Footing::new(Three::failing(3)).unwrap().with_config(config());
    let failure = f.audit().unwrap_err();
    assert_eq!(failure.error.step, "s2");
    assert_eq!(failure.trace.step_names(), vec!["s1"]);
    assert!(failure.trace.finished_at.is_none());
    assert!(failure.to_string().contains("At step [s2]"));
}

#[test]
fn audit_to_writes_pretty_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("three.json");
    let f = Footing::new(Three::new(1)).unwrap().with_config(config());
    let trace = f.audit_to(&path).expect("audit written");

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("\n  \"format_version\""));
    let parsed: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed["format_version"], AUDIT_FORMAT_VERSION);
    assert_eq!(parsed["entries"][1]["step"], "s2");
    assert_eq!(parsed["entries"][1]["state"]["b"], 20);

    let back: AuditTrace<Three> = serde_json::from_str(&text).unwrap();
    assert_eq!(back.run_id, trace.run_id);
    assert_eq!(back.fingerprint(), trace.fingerprint());
}

#[test]
fn audit_to_rejects_unknown_formats_and_failed_runs() {
    let dir = tempfile::tempdir().unwrap();

    let xlsx = dir.path().join("three.xlsx");
    let f = Footing::new(Three::new(1)).unwrap().with_config(config());
    assert!(matches!(f.audit_to(&xlsx), Err(AuditError::UnsupportedFormat(ext)) if ext == "xlsx"));
    assert!(!xlsx.exists());

    let json = dir.path().join("failed.json");
    let f = Footing::new(Three::failing(1)).unwrap().with_config(config());
    match f.audit_to(&json) {
        Err(AuditError::Run(e)) => assert_eq!(e.step, "s2"),
        other => panic!("unexpected result: {:?}", other.map(|t| t.len())),
    }
    assert!(!json.exists());
}
