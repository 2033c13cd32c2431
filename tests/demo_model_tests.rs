use footings::demo::TermReserve;
use footings::{Footing, FootingsError, RunOutput};
use footings_core::RunError;
use serde_json::Value;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn flat_table_gives_closed_form_values() {
    let mut f = Footing::new(TermReserve::new(40, "U", "flat", 1000.0, 0.0, 2)).unwrap();
    let (pv, premium): (f64, f64) = f.run().unwrap().parse().unwrap();
    assert!(close(pv, 19.9), "pv = {pv}");
    assert!(close(premium, 10.0), "premium = {premium}");
    assert_eq!(f.state().survival, vec![1.0, 0.99]);
}

#[test]
fn partial_run_exposes_intermediates() {
    let mut f = Footing::new(TermReserve::new(40, "F", "2017-CSO", 1000.0, 0.05, 5)).unwrap();
    let state = f.run_to("calc_discount").unwrap().state();
    assert_eq!(state.mortality.len(), 5);
    assert_eq!(state.discount.len(), 5);
    assert!(close(state.discount[0], 1.0 / 1.05));
    assert_eq!(state.pv_benefits, 0.0);
}

#[test]
fn unknown_table_fails_at_the_lookup_step() {
    let mut f = Footing::new(TermReserve::new(40, "M", "1980-CSO", 1000.0, 0.03, 5)).unwrap();
    match f.run() {
        Err(RunError::Step(e)) => {
            assert_eq!(e.step, "get_mortality");
            assert_eq!(e.cause.kind, "DispatcherKeyError");
            assert!(e.to_string().contains("1980-CSO"));
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn invalid_gender_is_rejected_on_construction() {
    let err = Footing::new(TermReserve::new(40, "X", "flat", 1000.0, 0.03, 5)).unwrap_err();
    assert!(matches!(err, FootingsError::Argument(_)));
}

#[test]
fn audit_trace_follows_declared_impacts() {
    let f = Footing::new(TermReserve::new(30, "M", "2001-CSO", 500.0, 0.04, 3)).unwrap();
    let trace = f.audit().unwrap();
    assert_eq!(trace.len(), 5);
    for entry in &trace.entries {
        assert_eq!(entry.changed, entry.impacts, "step {}", entry.step);
    }
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reserve.json");
    f.audit_to(&path).unwrap();
    let written: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(written["model"], "TermReserve");
    assert_eq!(written["entries"].as_array().map(Vec::len), Some(5));
}

#[test]
fn two_outputs_come_back_as_a_tuple() {
    let mut f = Footing::new(TermReserve::new(50, "F", "flat", 1.0, 0.0, 1)).unwrap();
    assert!(matches!(f.run().unwrap(), RunOutput::Tuple(values) if values.len() == 2));
}
