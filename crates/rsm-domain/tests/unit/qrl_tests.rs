//! QRL wire format tests

use proptest::prelude::*;
use rsm_domain::{Error, Qrl};
use serde_json::json;

#[test]
fn test_parse_full_form() {
    let qrl: Qrl = "ui:/components/counter.js#increment?step=2&label=hi"
        .parse()
        .unwrap();
    assert_eq!(qrl.module_path(), "ui:/components/counter.js");
    assert_eq!(qrl.export_name(), "increment");
    assert_eq!(qrl.protocol(), Some("ui"));
    assert_eq!(
        qrl.params(),
        &[
            ("step".to_string(), "2".to_string()),
            ("label".to_string(), "hi".to_string())
        ]
    );
    assert!(qrl.captured().is_empty());
}

#[test]
fn test_export_defaults_to_default() {
    let qrl: Qrl = "./counter.js".parse().unwrap();
    assert_eq!(qrl.export_name(), "default");
    assert_eq!(qrl.protocol(), None);

    let empty_export: Qrl = "./counter.js#".parse().unwrap();
    assert_eq!(empty_export.export_name(), "default");
}

#[test]
fn test_query_without_export() {
    let qrl: Qrl = "builtin:/events?$type=open&k=v".parse().unwrap();
    assert_eq!(qrl.export_name(), "default");
    let props = qrl.props();
    assert_eq!(props.get("$type").map(String::as_str), Some("open"));
    assert_eq!(props.get("k").map(String::as_str), Some("v"));
}

#[test]
fn test_captured_arguments_are_lifted_out_of_params() {
    let qrl: Qrl = "./m.js#f?a=1&%24capture=%5B1%2C%22x%22%5D".parse().unwrap();
    assert_eq!(qrl.captured(), &[json!(1), json!("x")]);
    assert_eq!(qrl.params().len(), 1);
    assert!(!qrl.props().contains_key("$capture"));
}

#[test]
fn test_captured_arguments_must_be_json_array() {
    let err = "./m.js#f?$capture=nope".parse::<Qrl>().unwrap_err();
    assert!(matches!(err, Error::InvalidQrl { .. }));
}

#[test]
fn test_rejects_empty_and_missing_module() {
    assert!("".parse::<Qrl>().is_err());
    assert!("   ".parse::<Qrl>().is_err());
    assert!("#export".parse::<Qrl>().is_err());
}

#[test]
fn test_equality_ignores_params_but_not_captures() {
    let a: Qrl = "./m.js#f?x=1".parse().unwrap();
    let b: Qrl = "./m.js#f?x=2".parse().unwrap();
    assert_eq!(a, b);

    let c = Qrl::new("./m.js", "f").with_captured(vec![json!(1)]);
    let d = Qrl::new("./m.js", "f").with_captured(vec![json!(2)]);
    assert_ne!(c, d);
    assert_ne!(a, Qrl::new("./m.js", "g"));
}

#[test]
fn test_display_round_trips_with_captures() {
    let qrl = Qrl::new("ui:/todo.js", "toggle")
        .with_param("$type", "open")
        .with_captured(vec![json!({"id": 3}), json!(true)]);
    let text = qrl.to_string();
    let parsed: Qrl = text.parse().unwrap();
    assert_eq!(parsed, qrl);
    assert_eq!(parsed.params(), qrl.params());
}

#[test]
fn test_display_omits_default_export() {
    assert_eq!(Qrl::default_export("./a.js").to_string(), "./a.js");
    assert_eq!(Qrl::new("./a.js", "b").to_string(), "./a.js#b");
}

#[test]
fn test_serde_uses_string_form() {
    let qrl = Qrl::new("./a.js", "b").with_param("k", "v");
    let encoded = serde_json::to_string(&qrl).unwrap();
    assert_eq!(encoded, "\"./a.js#b?k=v\"");
    let decoded: Qrl = serde_json::from_str(&encoded).unwrap();
    assert_eq!(decoded, qrl);
}

#[test]
fn test_protocol_requires_scheme_syntax() {
    assert_eq!(Qrl::default_export("1x:/a").protocol(), None);
    assert_eq!(Qrl::default_export("/abs/path.js").protocol(), None);
    assert_eq!(Qrl::default_export("https://cdn/x.js").protocol(), Some("https"));
}

proptest! {
    #[test]
    fn prop_display_then_parse_is_identity(
        module in "[a-z]{1,6}:/[a-z0-9/_.]{1,16}",
        export in "[a-zA-Z_][a-zA-Z0-9_]{0,10}",
        params in prop::collection::vec(("[a-z$]{1,5}", "[ -~]{0,8}"), 0..4),
        captured in prop::collection::vec(any::<i64>(), 0..3),
    ) {
        let mut qrl = Qrl::new(module, export)
            .with_captured(captured.into_iter().map(|n| json!(n)).collect());
        for (k, v) in params.iter().filter(|(k, _)| k != "$capture") {
            qrl = qrl.with_param(k.clone(), v.clone());
        }
        let parsed: Qrl = qrl.to_string().parse().unwrap();
        prop_assert_eq!(&parsed, &qrl);
        prop_assert_eq!(parsed.params(), qrl.params());
    }
}
