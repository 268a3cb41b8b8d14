//! Event dispatch and re-emit

use crate::support::{Counter, Fixture, STORE_URL, TODO_PAGE, node, runtime, runtime_with};
use rsm_application::providers::provide_props;
use rsm_application::{
    DispatchOutcome, Injected, Injector, Module, Provided, RuntimeSettings, inject,
};
use rsm_domain::error::Error;
use rsm_domain::{CompositeKey, DocumentTree, Event};
use rsm_infrastructure::StaticModuleLoader;
use serde_json::json;
use std::sync::atomic::Ordering;

#[tokio::test]
async fn test_click_runs_the_nearest_listener() {
    let fixture = Fixture::new();
    let (document, _, runtime) = runtime(TODO_PAGE, fixture.loader());
    let inc = node(&document, "inc");

    let outcome = runtime
        .dispatcher()
        .dispatch(Event::new("click", node(&document, "label")))
        .await
        .unwrap();

    match outcome {
        DispatchOutcome::Handled { node, url, result } => {
            assert_eq!(node, inc);
            assert_eq!(url.as_str(), "file:///app/store.js?id=a#increment");
            assert_eq!(result.as_json(), Some(&json!(1)));
        }
        DispatchOutcome::Unhandled => panic!("click was not handled"),
    }

    let counter = runtime
        .injector(inc)
        .unwrap()
        .get_instance(&CompositeKey::new("counter", ["a"]), None)
        .await
        .unwrap()
        .downcast_arc::<Counter>()
        .ok()
        .unwrap();
    assert_eq!(counter.count.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_repeated_dispatch_imports_the_module_once() {
    let fixture = Fixture::new();
    let (document, loader, runtime) = runtime(TODO_PAGE, fixture.loader());
    let dispatcher = runtime.dispatcher();
    let inc = node(&document, "inc");

    for expected in 1..=3 {
        let result = dispatcher
            .dispatch(Event::new("click", inc))
            .await
            .unwrap()
            .into_injected();
        assert_eq!(result.as_json(), Some(&json!(expected)));
    }
    assert_eq!(loader.load_count(STORE_URL), 1);
    assert_eq!(fixture.counters.constructed.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_event_without_listener_is_unhandled() {
    let fixture = Fixture::new();
    let (document, _, runtime) = runtime(TODO_PAGE, fixture.loader());

    let outcome = runtime
        .dispatcher()
        .dispatch(Event::new("click", node(&document, "text")))
        .await
        .unwrap();
    assert!(!outcome.is_handled());
}

#[tokio::test]
async fn test_broken_listener_fails_loudly() {
    let page = r##"{ "tag": "html", "attributes": { "q:base": "/app/" }, "children": [
        { "tag": "button", "attributes": { "id": "gone", "on:click": "./missing.js#run" } },
        { "tag": "button", "attributes": { "id": "typo", "on:click": "./store.js#incremnt" } },
        { "tag": "button", "attributes": { "id": "bad", "on:click": "#nothing" } }
    ] }"##;
    let fixture = Fixture::new();
    let (document, _, runtime) = runtime(page, fixture.loader());
    let dispatcher = runtime.dispatcher();

    let err = dispatcher
        .dispatch(Event::new("click", node(&document, "gone")))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ModuleLoad { ref url, .. } if url == "file:///app/missing.js"));

    let err = dispatcher
        .dispatch(Event::new("click", node(&document, "typo")))
        .await
        .unwrap_err();
    assert_eq!(err, Error::symbol_not_found(STORE_URL, "incremnt"));

    let err = dispatcher
        .dispatch(Event::new("click", node(&document, "bad")))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidQrl { .. }));
}

#[tokio::test]
async fn test_handler_receives_element_event_url_and_captures() {
    let page = r#"{ "tag": "html", "attributes": { "q:base": "/app/" }, "children": [
        { "tag": "button", "attributes": { "id": "b", "on:click": "./store.js#record?$capture=[\"x\",2]" } }
    ] }"#;
    let fixture = Fixture::new();
    let (document, _, runtime) = runtime(page, fixture.loader());
    let button = node(&document, "b");

    runtime
        .dispatcher()
        .dispatch(Event::new("click", button))
        .await
        .unwrap();

    let seen = fixture.seen();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].listener, button);
    assert_eq!(seen[0].args[0], "\"x\"");
    assert_eq!(seen[0].args[1], "2");
    assert_eq!(seen[0].args[2], format!("element {button}"));
    assert_eq!(seen[0].args[3], "event click");
    assert!(seen[0].args[4].starts_with("url file:///app/store.js?"));
}

#[tokio::test]
async fn test_captured_arguments_are_not_handler_props() {
    let page = r#"{ "tag": "html", "children": [
        { "tag": "button", "attributes": { "id": "b", "on:click": "ui:/props.js#echo?id=7&$capture=[1]" } }
    ] }"#;
    let echo = inject(
        vec![provide_props()],
        |props: Injected, _args: Vec<Injected>| {
            let names: Vec<String> = props
                .as_props()
                .map(|props| props.keys().cloned().collect())
                .unwrap_or_default();
            Provided::value(Injected::Json(json!(names)))
        },
    );
    let loader = StaticModuleLoader::new()
        .with_module("https://assets.example/props.js", Module::new().with_handler("echo", echo));
    let settings = RuntimeSettings::default()
        .with_protocol("ui", "https://assets.example")
        .unwrap();
    let (document, _, runtime) = runtime_with(page, loader, settings);

    let names = runtime
        .dispatcher()
        .dispatch(Event::new("click", node(&document, "b")))
        .await
        .unwrap()
        .into_injected();
    assert_eq!(names.as_json(), Some(&json!(["id"])));
}

#[tokio::test]
async fn test_emit_event_bubbles_from_the_listener_node() {
    let fixture = Fixture::new();
    let (document, _, runtime) = runtime(TODO_PAGE, fixture.loader());
    let add = node(&document, "add");

    let outcome = runtime
        .dispatcher()
        .dispatch(Event::new("click", add))
        .await
        .unwrap();
    assert_eq!(outcome.into_injected().as_json(), Some(&json!("todoAdded")));

    let seen = fixture.seen();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].listener, node(&document, "host"));
    assert_eq!(seen[0].event.event_type, "todoAdded");
    assert_eq!(seen[0].event.target, add);
    assert_eq!(seen[0].event.property("text"), Some("milk"));
    assert_eq!(seen[0].event.property("$type"), None);
}

#[tokio::test]
async fn test_emit_without_type_fails() {
    let fixture = Fixture::new();
    let (document, _, runtime) = runtime(TODO_PAGE, fixture.loader());

    let err = runtime
        .dispatcher()
        .dispatch(Event::new("click", node(&document, "bare")))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::MissingEventType { .. }));
}

#[tokio::test]
async fn test_emit_without_listener_fails() {
    let fixture = Fixture::new();
    let (document, _, runtime) = runtime(TODO_PAGE, fixture.loader());
    let lonely = node(&document, "lonely");

    let err = runtime
        .dispatcher()
        .dispatch(Event::new("click", lonely))
        .await
        .unwrap_err();
    match err {
        Error::NoListenerFound {
            event, attribute, ..
        } => {
            assert_eq!(event, "nobodyCares");
            assert_eq!(attribute, "on:nobody-cares");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(fixture.seen().is_empty());
}

#[tokio::test]
async fn test_event_context_refuses_serialization() {
    let page = r#"{ "tag": "html", "attributes": { "q:base": "/app/" }, "children": [
        { "tag": "button", "attributes": { "id": "b", "on:click": "./store.js#persist" } }
    ] }"#;
    let fixture = Fixture::new();
    let (document, _, runtime) = runtime(page, fixture.loader());

    let err = runtime
        .dispatcher()
        .dispatch(Event::new("click", node(&document, "b")))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotSerializable { .. }));
}

#[tokio::test]
async fn test_base_override_and_protocol_alias() {
    let page = r#"{ "tag": "html", "children": [
        { "tag": "div", "attributes": { "q:base": "https://cdn.example/lib/" }, "children": [
            { "tag": "button", "attributes": { "id": "cdn", "on:click": "./widgets.js#ping" } } ] },
        { "tag": "button", "attributes": { "id": "aliased", "on:click": "ui:/widgets.js#ping" } }
    ] }"#;
    let ping = |ctx: std::sync::Arc<dyn Injector>, _args: Vec<Injected>| {
        Provided::value(Injected::Json(json!(ctx.url().map(|u| u.to_string()))))
    };
    let loader = StaticModuleLoader::new()
        .with_module(
            "https://cdn.example/lib/widgets.js",
            Module::new().with_handler("ping", ping),
        )
        .with_module(
            "https://assets.example/v2/widgets.js",
            Module::new().with_handler("ping", ping),
        );
    let settings = RuntimeSettings::default()
        .with_protocol("ui", "https://assets.example/v2")
        .unwrap();
    let (document, loader, runtime) = runtime_with(page, loader, settings);
    let dispatcher = runtime.dispatcher();

    let from_cdn = dispatcher
        .dispatch(Event::new("click", node(&document, "cdn")))
        .await
        .unwrap()
        .into_injected();
    assert_eq!(
        from_cdn.as_json(),
        Some(&json!("https://cdn.example/lib/widgets.js#ping"))
    );

    let aliased = dispatcher
        .dispatch(Event::new("click", node(&document, "aliased")))
        .await
        .unwrap()
        .into_injected();
    assert_eq!(
        aliased.as_json(),
        Some(&json!("https://assets.example/v2/widgets.js#ping"))
    );
    assert_eq!(loader.total_loads(), 2);
}

#[tokio::test]
async fn test_detached_target_is_rejected() {
    let fixture = Fixture::new();
    let (document, _, runtime) = runtime(TODO_PAGE, fixture.loader());
    let other = node(&document, "other");
    document.remove(other).unwrap();

    let err = runtime
        .dispatcher()
        .dispatch(Event::new("click", other))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}
