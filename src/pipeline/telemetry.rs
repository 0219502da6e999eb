//! Build event observers
//!
//! The executor announces state changes and milestones to every registered
//! [`BuildObserver`]. Dispatch iterates over a copy of the observer list, so an observer
//! may register further observers while handling an event; they receive the next event.

use parking_lot::{Mutex, RwLock};
use std::path::PathBuf;
use std::sync::Arc;

use super::secondary::SecondaryPass;
use super::variant::BuildVariant;
use crate::settings::RestoreReport;

/// Executor lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuildState {
    /// No build running
    #[default]
    Idle,
    /// Settings planned and written
    ConfigApplied,
    /// Toolchain running
    Building,
    /// Primary build succeeded
    Succeeded,
    /// Primary build failed or faulted
    Failed,
}

/// Something observers are told about
#[derive(Debug, Clone, PartialEq)]
pub enum BuildEvent {
    /// The executor moved to a new state
    StateChanged {
        /// Variant being built
        variant: BuildVariant,
        /// New state
        state: BuildState,
    },
    /// The optimization plan was written to the settings store
    ConfigurationApplied {
        /// Number of recorded options
        optimizations: usize,
    },
    /// A secondary pass finished
    SecondaryPassFinished {
        /// Which pass
        pass: SecondaryPass,
        /// Prefixed artifact name, `None` when the pass produced nothing
        artifact: Option<String>,
    },
    /// The build report was written
    ReportWritten {
        /// Report path
        path: PathBuf,
    },
    /// The summary was persisted
    SummaryWritten {
        /// Summary path
        path: PathBuf,
    },
    /// The settings snapshot was written back
    ConfigurationRestored {
        /// Restore outcome
        report: RestoreReport,
    },
}

/// Receives build events
pub trait BuildObserver: Send + Sync {
    /// Observer name
    fn name(&self) -> &str;

    /// Handle one event
    fn on_event(&self, event: &BuildEvent);
}

/// Ordered set of observers
#[derive(Default)]
pub struct ObserverRegistry {
    observers: RwLock<Vec<Arc<dyn BuildObserver>>>,
}

impl ObserverRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an observer after the existing ones
    pub fn register(&self, observer: Arc<dyn BuildObserver>) {
        log::trace!("Registering build observer '{}'", observer.name());
        self.observers.write().push(observer);
    }

    /// Number of registered observers
    pub fn len(&self) -> usize {
        self.observers.read().len()
    }

    /// True when no observer is registered
    pub fn is_empty(&self) -> bool {
        self.observers.read().is_empty()
    }

    /// Deliver `event` to every observer registered when dispatch starts
    pub fn dispatch(&self, event: &BuildEvent) {
        let observers = self.observers.read().clone();
        for observer in observers {
            observer.on_event(event);
        }
    }
}

/// Forwards events to the `log` facade
pub struct LogObserver;

impl BuildObserver for LogObserver {
    fn name(&self) -> &str {
        "log"
    }

    fn on_event(&self, event: &BuildEvent) {
        match event {
            BuildEvent::StateChanged { variant, state } => {
                log::info!("{} build: {:?}", variant, state)
            }
            BuildEvent::ConfigurationApplied { optimizations } => {
                log::info!("Applied {} build setting(s)", optimizations)
            }
            BuildEvent::SecondaryPassFinished {
                pass,
                artifact: Some(name),
            } => log::info!("{} pass produced {}", pass, name),
            BuildEvent::SecondaryPassFinished {
                pass,
                artifact: None,
            } => log::warn!("{} pass produced no artifact", pass),
            BuildEvent::ReportWritten { path } => {
                log::info!("Build report written to {}", path.display())
            }
            BuildEvent::SummaryWritten { path } => {
                log::info!("Build summary written to {}", path.display())
            }
            BuildEvent::ConfigurationRestored { report } => log::info!(
                "Restored {} setting(s), {} failure(s)",
                report.restored.len(),
                report.failures.len()
            ),
        }
    }
}

/// In-memory observer for testing
#[derive(Default)]
pub struct MemoryObserver {
    events: Mutex<Vec<BuildEvent>>,
}

impl MemoryObserver {
    /// Create a new memory observer
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded events
    pub fn events(&self) -> Vec<BuildEvent> {
        self.events.lock().clone()
    }

    /// Only the state transitions, in order
    pub fn states(&self) -> Vec<BuildState> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                BuildEvent::StateChanged { state, .. } => Some(*state),
                _ => None,
            })
            .collect()
    }

    /// Clear all recorded events
    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl BuildObserver for MemoryObserver {
    fn name(&self) -> &str {
        "memory"
    }

    fn on_event(&self, event: &BuildEvent) {
        self.events.lock().push(event.clone());
    }
}
