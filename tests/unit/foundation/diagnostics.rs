use super::*;

fn subjects(d: &Diagnostics) -> Vec<&str> {
    d.records().iter().map(|r| r.subject.as_str()).collect()
}

#[test]
fn push_keeps_insertion_order_and_counts_by_kind() {
    let mut d = Diagnostics::new();
    assert!(d.is_empty());
    d.out_of_range("mh1", "pan 600 clamped to 540");
    d.fallback("zigzag", "intensity DRAMATIC not defined; using SMOOTH");
    d.out_of_range("mh2", "tilt -10 clamped to 0");
    d.push(DiagnosticKind::Conflict, "center", "pose defined twice");

    assert_eq!(d.len(), 4);
    assert_eq!(subjects(&d), vec!["mh1", "zigzag", "mh2", "center"]);
    assert_eq!(d.count(DiagnosticKind::OutOfRange), 2);
    assert_eq!(d.count(DiagnosticKind::Fallback), 1);
    assert_eq!(d.count(DiagnosticKind::Conflict), 1);
    assert_eq!(d.records()[1].kind, DiagnosticKind::Fallback);
}

#[test]
fn extend_appends_after_existing_records() {
    let mut a = Diagnostics::new();
    a.fallback("mh1", "missing pose");
    let mut b = Diagnostics::new();
    b.conflict("mh2", "duplicate binding");
    b.out_of_range("mh3", "limit");

    a.extend(b);
    assert_eq!(subjects(&a), vec!["mh1", "mh2", "mh3"]);
    a.extend(Diagnostics::new());
    assert_eq!(a.len(), 3);
    assert_eq!(a.into_vec()[2].kind, DiagnosticKind::OutOfRange);
}

#[test]
fn serializes_as_a_plain_list() {
    let mut d = Diagnostics::new();
    d.fallback("mh1", "rest pose used");
    let json = serde_json::to_value(&d).unwrap();
    assert_eq!(json[0]["kind"], "fallback");
    assert_eq!(json[0]["subject"], "mh1");
    assert_eq!(json.as_array().map(Vec::len), Some(1));
}
