//! Builtin modules

use crate::modules::registry::{MODULES, ModuleEntry};
use rsm_application::{EVENTS_MODULE_URL, events_module};

#[linkme::distributed_slice(MODULES)]
static EVENTS_MODULE: ModuleEntry = ModuleEntry {
    url: EVENTS_MODULE_URL,
    description: "Event helpers: emitEvent re-emits a new event from the listener node",
    build: events_module,
};
