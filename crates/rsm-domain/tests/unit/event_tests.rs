//! Event value object tests

use rsm_domain::value_objects::kebab_case;
use rsm_domain::{Event, NodeId};

#[test]
fn test_kebab_case() {
    assert_eq!(kebab_case("click"), "click");
    assert_eq!(kebab_case("dblClick"), "dbl-click");
    assert_eq!(kebab_case("QRLResolved"), "q-r-l-resolved");
}

#[test]
fn test_attribute_name_uses_prefix() {
    let event = Event::new("keyDown", NodeId::new(3));
    assert_eq!(event.attribute_name("on:"), "on:key-down");
    assert_eq!(event.attribute_name("on-"), "on-key-down");
}

#[test]
fn test_own_properties() {
    let event = Event::new("open", NodeId::new(1))
        .with_property("k", "v")
        .with_property("n", "2");
    assert_eq!(event.property("k"), Some("v"));
    assert_eq!(event.property("missing"), None);
    assert_eq!(event.properties.len(), 2);
}

#[test]
fn test_event_json_shape() {
    let event = Event::new("open", NodeId::new(4)).with_property("k", "v");
    let value = serde_json::to_value(&event).unwrap();
    assert_eq!(value["event_type"], "open");
    assert_eq!(value["target"], 4);
    assert_eq!(value["properties"]["k"], "v");
}
