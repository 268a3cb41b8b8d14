//! Event Bootstrap
//!
//! Document-level listener that feeds published events into the dispatcher.
//! Events travel over a tokio broadcast bus; each accepted event is
//! dispatched on its own task so one slow handler never blocks the bus.
//!
//! Only event types registered through [`EventBootstrap::listen`] are
//! dispatched. Every dispatch produces a [`DispatchReport`]; failures are also
//! logged at error level.

use crate::dispatch::Dispatcher;
use dashmap::DashSet;
use rsm_domain::error::Error;
use rsm_domain::{Event, NodeId};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Default capacity of the event bus
pub const DEFAULT_BUS_CAPACITY: usize = 1024;

/// Outcome of dispatching one published event
#[derive(Debug, Clone)]
pub struct DispatchReport {
    /// The published event
    pub event: Event,
    /// Listener node on success, `None` when nobody listened
    pub outcome: Result<Option<NodeId>, Error>,
}

impl DispatchReport {
    /// Whether the dispatch failed
    pub fn is_failure(&self) -> bool {
        self.outcome.is_err()
    }
}

/// Document-level event listener
pub struct EventBootstrap {
    dispatcher: Dispatcher,
    events: broadcast::Sender<Event>,
    reports: broadcast::Sender<DispatchReport>,
    listening: Arc<DashSet<String>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl EventBootstrap {
    /// Create a stopped bootstrap over `dispatcher`
    pub fn new(dispatcher: Dispatcher, capacity: usize) -> Self {
        let (events, _) = broadcast::channel(capacity.max(1));
        let (reports, _) = broadcast::channel(capacity.max(1));
        Self {
            dispatcher,
            events,
            reports,
            listening: Arc::new(DashSet::new()),
            task: Mutex::new(None),
        }
    }

    /// Register an event type; returns `false` when it was already registered
    pub fn listen<S: Into<String>>(&self, event_type: S) -> bool {
        let event_type = event_type.into();
        let added = self.listening.insert(event_type.clone());
        if added {
            debug!(event = %event_type, "Listening for event type");
        }
        added
    }

    /// Whether an event type is registered
    pub fn is_listening(&self, event_type: &str) -> bool {
        self.listening.contains(event_type)
    }

    /// Registered event types, sorted
    pub fn event_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.listening.iter().map(|t| t.key().clone()).collect();
        types.sort_unstable();
        types
    }

    /// Start the listener loop; returns `false` when it is already running
    ///
    /// Must be called inside a tokio runtime.
    pub fn start(&self) -> bool {
        let mut task = self.task.lock().unwrap_or_else(PoisonError::into_inner);
        if task.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return false;
        }
        let receiver = self.events.subscribe();
        *task = Some(tokio::spawn(run(
            receiver,
            self.dispatcher.clone(),
            Arc::clone(&self.listening),
            self.reports.clone(),
        )));
        info!("Event bootstrap started");
        true
    }

    /// Stop the listener loop and forget every registered type
    pub fn stop(&self) -> bool {
        let handle = self
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        self.listening.clear();
        match handle {
            Some(handle) => {
                handle.abort();
                info!("Event bootstrap stopped");
                true
            }
            None => false,
        }
    }

    /// Whether the listener loop is running
    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Publish an event; returns `false` when the bootstrap is not running
    pub fn publish(&self, event: Event) -> bool {
        match self.events.send(event) {
            Ok(_) => true,
            Err(broadcast::error::SendError(event)) => {
                debug!(event = %event.event_type, "Event dropped, bootstrap not running");
                false
            }
        }
    }

    /// Subscribe to dispatch reports
    pub fn subscribe_reports(&self) -> broadcast::Receiver<DispatchReport> {
        self.reports.subscribe()
    }
}

impl Drop for EventBootstrap {
    fn drop(&mut self) {
        if let Some(handle) = self
            .task
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            handle.abort();
        }
    }
}

async fn run(
    mut receiver: broadcast::Receiver<Event>,
    dispatcher: Dispatcher,
    listening: Arc<DashSet<String>>,
    reports: broadcast::Sender<DispatchReport>,
) {
    loop {
        match receiver.recv().await {
            Ok(event) => {
                if !listening.contains(&event.event_type) {
                    continue;
                }
                let dispatcher = dispatcher.clone();
                let reports = reports.clone();
                tokio::spawn(async move {
                    let outcome = dispatcher
                        .dispatch(event.clone())
                        .await
                        .map(|outcome| outcome.node());
                    if let Err(e) = &outcome {
                        error!(
                            event = %event.event_type,
                            target = %event.target,
                            error = %e,
                            "Event dispatch failed"
                        );
                    }
                    // No subscribers is fine.
                    let _ = reports.send(DispatchReport { event, outcome });
                });
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "Event bootstrap lagged behind the bus");
            }
            Err(RecvError::Closed) => break,
        }
    }
}
