//! Document-level event listener and composition root

use crate::support::{Fixture, TODO_PAGE, node, runtime};
use rsm_application::{DEFAULT_BUS_CAPACITY, DispatchReport, EventBootstrap};
use rsm_domain::Event;
use rsm_domain::error::Error;
use rsm_infrastructure::{AppConfig, MemoryDocument, init_app};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

async fn next_report(reports: &mut broadcast::Receiver<DispatchReport>) -> DispatchReport {
    tokio::time::timeout(Duration::from_secs(5), reports.recv())
        .await
        .expect("no dispatch report")
        .unwrap()
}

#[tokio::test]
async fn test_published_events_are_dispatched_and_reported() {
    let fixture = Fixture::new();
    let (document, _, runtime) = runtime(TODO_PAGE, fixture.loader());
    let bootstrap = EventBootstrap::new(runtime.dispatcher(), DEFAULT_BUS_CAPACITY);
    let mut reports = bootstrap.subscribe_reports();

    assert!(bootstrap.listen("click"));
    assert!(!bootstrap.listen("click"));
    assert!(bootstrap.start());
    assert!(!bootstrap.start());
    assert!(bootstrap.is_running());

    let inc = node(&document, "inc");
    assert!(bootstrap.publish(Event::new("click", inc)));

    let report = next_report(&mut reports).await;
    assert!(!report.is_failure());
    assert_eq!(report.event.target, inc);
    assert_eq!(report.outcome, Ok(Some(inc)));
}

#[tokio::test]
async fn test_unlistened_types_are_ignored() {
    let fixture = Fixture::new();
    let (document, _, runtime) = runtime(TODO_PAGE, fixture.loader());
    let bootstrap = EventBootstrap::new(runtime.dispatcher(), 16);
    let mut reports = bootstrap.subscribe_reports();
    bootstrap.listen("click");
    bootstrap.start();

    let host = node(&document, "host");
    bootstrap.publish(Event::new("todoAdded", host));
    bootstrap.publish(Event::new("click", node(&document, "text")));

    // Only the click produces a report, and nobody listens for it there.
    let report = next_report(&mut reports).await;
    assert_eq!(report.event.event_type, "click");
    assert_eq!(report.outcome, Ok(None));
    assert!(fixture.seen().is_empty());
}

#[tokio::test]
async fn test_failed_dispatch_is_reported() {
    let fixture = Fixture::new();
    let (document, _, runtime) = runtime(TODO_PAGE, fixture.loader());
    let bootstrap = EventBootstrap::new(runtime.dispatcher(), 16);
    let mut reports = bootstrap.subscribe_reports();
    bootstrap.listen("click");
    bootstrap.start();

    bootstrap.publish(Event::new("click", node(&document, "bare")));

    let report = next_report(&mut reports).await;
    assert!(report.is_failure());
    assert!(matches!(report.outcome, Err(Error::MissingEventType { .. })));
}

#[tokio::test]
async fn test_publish_requires_a_running_listener() {
    let fixture = Fixture::new();
    let (document, _, runtime) = runtime(TODO_PAGE, fixture.loader());
    let bootstrap = EventBootstrap::new(runtime.dispatcher(), 16);
    bootstrap.listen("click");

    assert!(!bootstrap.is_running());
    assert!(!bootstrap.publish(Event::new("click", node(&document, "inc"))));

    bootstrap.start();
    assert!(bootstrap.stop());
    assert!(!bootstrap.stop());
    assert!(!bootstrap.is_listening("click"));
    assert!(bootstrap.event_types().is_empty());
}

#[tokio::test]
async fn test_app_context_uses_the_module_registry() {
    let page = r#"{ "tag": "html", "children": [
        { "tag": "button", "attributes": { "id": "ping", "on:click": "builtin:/events#emitEvent?$type=ping" } }
    ] }"#;
    let document = Arc::new(MemoryDocument::from_json(page).unwrap());
    let app = init_app(AppConfig::default(), Arc::clone(&document)).unwrap();
    assert_eq!(app.runtime.symbols().loader_name(), "registry");

    let bootstrap = app.event_bootstrap();
    let mut reports = bootstrap.subscribe_reports();
    bootstrap.listen("click");
    bootstrap.start();
    bootstrap.publish(Event::new("click", document.find_by_id("ping").unwrap()));

    let report = next_report(&mut reports).await;
    match report.outcome {
        Err(Error::NoListenerFound { event, .. }) => assert_eq!(event, "ping"),
        other => panic!("unexpected outcome: {other:?}"),
    }
}
