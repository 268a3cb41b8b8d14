//! Demo module
//!
//! `demo:/counter` is compiled into the binary so that documents can be
//! dispatched from the command line without a module host:
//!
//! ```json
//! { "tag": "html", "attributes": { "::counter": "demo:/counter#Counter" },
//!   "children": [ { "tag": "button",
//!                   "attributes": { "id": "inc", "on:click": "demo:/counter#increment?id=a" } } ] }
//! ```
//!
//! | Export | Kind | Behavior |
//! |--------|------|----------|
//! | `Counter` | type | counter keyed by the `id` prop, state `{"count": n}` |
//! | `increment` | handler | adds one to the counter named by the `id` prop |
//! | `reset` | handler | sets the counter named by the `id` prop back to zero |

use async_trait::async_trait;
use rsm_application::providers::provide_entity_from_props;
use rsm_application::{EntityType, Injectable, Injected, Instance, Module, Provided, inject};
use rsm_domain::Props;
use rsm_domain::error::{Error, Result};
use rsm_infrastructure::modules::{MODULES, ModuleEntry};
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

/// URL of the demo module
pub const COUNTER_MODULE_URL: &str = "demo:/counter";

/// A counter instance
#[derive(Debug)]
pub struct Counter {
    id: String,
    count: AtomicI64,
}

impl Counter {
    /// Identity of the counter
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Current value
    pub fn count(&self) -> i64 {
        self.count.load(Ordering::SeqCst)
    }
}

impl Instance for Counter {
    fn state(&self) -> Result<Value> {
        Ok(json!({ "count": self.count() }))
    }
}

/// Counter type, keyed by `id`
#[derive(Debug, Default, Clone, Copy)]
pub struct CounterType;

#[async_trait]
impl EntityType for CounterType {
    fn type_tag(&self) -> &str {
        "counter"
    }

    fn identity_props(&self) -> &[&str] {
        &["id"]
    }

    fn construct(&self, props: Props, state: Value) -> Result<Arc<dyn Instance>> {
        let id = props
            .get("id")
            .cloned()
            .ok_or_else(|| Error::invalid_key("counter", "missing identity prop 'id'"))?;
        let count = match state.get("count") {
            None => 0,
            Some(count) => count
                .as_i64()
                .ok_or_else(|| Error::internal(format!("counter '{id}' has a non-integer count")))?,
        };
        Ok(Arc::new(Counter {
            id,
            count: AtomicI64::new(count),
        }))
    }

    async fn initial_state(&self, _props: &Props) -> Result<Value> {
        Ok(json!({ "count": 0 }))
    }
}

fn counter_handler(update: fn(&Counter) -> i64) -> Injectable {
    inject(
        vec![provide_entity_from_props(Arc::new(CounterType))],
        move |this: Injected, _args: Vec<Injected>| match this.instance::<Counter>() {
            Some(counter) => Provided::value(Injected::Json(json!(update(&counter)))),
            None => Provided::error(Error::internal("demo handler expected a counter")),
        },
    )
}

/// Build the demo module
pub fn counter_module() -> Module {
    Module::new()
        .with_type("Counter", CounterType)
        .with_handler(
            "increment",
            counter_handler(|counter| counter.count.fetch_add(1, Ordering::SeqCst) + 1),
        )
        .with_handler(
            "reset",
            counter_handler(|counter| {
                counter.count.store(0, Ordering::SeqCst);
                0
            }),
        )
}

#[linkme::distributed_slice(MODULES)]
static COUNTER_MODULE: ModuleEntry = ModuleEntry {
    url: COUNTER_MODULE_URL,
    description: "Demo counter: a keyed Counter type with increment and reset handlers",
    build: counter_module,
};
