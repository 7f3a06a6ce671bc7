// Error-path behavior of the public API.
use netdoc_core::error::NetdocError;
use netdoc_core::{analyze_capture, Dialect};

const UNDECIDABLE: &str = "\
completely free text
no vendor tokens anywhere
just prose about a device
";

#[test]
fn test_unknown_dialect_without_hint_is_an_error() {
    let result = analyze_capture(UNDECIDABLE, "dev1", None);
    assert!(matches!(result, Err(NetdocError::Dialect(_))));
}

#[test]
fn test_unknown_dialect_produces_no_document() {
    // The error carries everything; there is no partial document to leak.
    let result = analyze_capture("", "dev1", None);
    assert!(result.is_err());
}

#[test]
fn test_hint_rescues_an_undecidable_capture() {
    let analysis = analyze_capture(UNDECIDABLE, "dev1", Some(Dialect::Vrp)).unwrap();
    assert_eq!(analysis.document.dialect, Dialect::Vrp);
    // Nothing parseable: the document is degenerate but real.
    assert!(analysis.document.interfaces.is_empty());
    assert!(analysis.document.overview.hostname.is_none());
}

#[test]
fn test_sniffed_dialect_wins_over_contradicting_hint() {
    let analysis = analyze_capture("hostname ACC4\nswitchport mode trunk\n", "dev1", Some(Dialect::Vrp)).unwrap();
    assert_eq!(analysis.document.dialect, Dialect::Ios);
}

#[test]
fn test_error_renders_with_source_context() {
    let err = analyze_capture(UNDECIDABLE, "dev1", None).unwrap_err();
    let report = miette::Report::new(err);
    let rendered = format!("{report:?}");
    assert!(rendered.contains("dialect"));
}
