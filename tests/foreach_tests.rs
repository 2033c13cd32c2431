use footings::demo::TermReserve;
use footings::foreach::run_foreach;
use footings_core::FootingsError;

fn records() -> Vec<TermReserve> {
    vec![TermReserve::new(40, "M", "flat", 1000.0, 0.0, 2),
         TermReserve::new(41, "M", "missing-table", 1000.0, 0.0, 2),
         TermReserve::new(42, "F", "2017-CSO", 1000.0, 0.03, 4),
         TermReserve::new(43, "Q", "flat", 1000.0, 0.0, 2)]
}

#[test]
fn failures_are_collected_per_record() {
    let outcome = run_foreach(records(), true);
    assert_eq!(outcome.total(), 4);
    assert_eq!(outcome.outputs.iter().map(|(i, _)| *i).collect::<Vec<_>>(), vec![0, 2]);
    assert_eq!(outcome.errors.iter().map(|(i, _)| *i).collect::<Vec<_>>(), vec![1, 3]);
    assert!(matches!(outcome.errors[0].1, FootingsError::Run(_)));
    assert!(matches!(outcome.errors[1].1, FootingsError::Argument(_)));
    assert!(!outcome.is_clean());
}

#[test]
fn parallel_and_sequential_runs_agree() {
    let par = run_foreach(records(), true);
    let seq = run_foreach(records(), false);
    assert_eq!(par.outputs, seq.outputs);
}
