//! Platform event source abstraction

use crate::entry::ObservedEvent;
use crate::error::{MonitorError, MonitorResult};
use crate::kind::MetricKind;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, TryLockError};

/// Receives each batch of entries the platform delivers.
pub type BatchCallback = Box<dyn FnMut(&[ObservedEvent]) + Send>;

/// A live registration with an [`EventSource`].
///
/// Implementations disconnect when dropped.
pub trait Subscription {
    /// Stop delivery. No callback runs after this returns.
    fn disconnect(&mut self);
}

/// Producer of performance timeline entries.
///
/// In a browser this is `PerformanceObserver`; anywhere else it is whatever
/// the host wires up, typically a [`ManualSource`].
pub trait EventSource {
    /// Whether the facility exists in this environment.
    fn is_supported(&self) -> bool;

    /// Register interest in `kinds`; `callback` then receives batches until
    /// the returned subscription is disconnected.
    fn subscribe(
        &self,
        kinds: &[MetricKind],
        callback: BatchCallback,
    ) -> MonitorResult<Box<dyn Subscription>>;
}

type SharedCallback = Arc<Mutex<BatchCallback>>;

struct Registration {
    id: u64,
    kinds: Vec<MetricKind>,
    callback: SharedCallback,
}

impl Registration {
    fn matching(&self, batch: &[ObservedEvent]) -> Vec<ObservedEvent> {
        batch
            .iter()
            .filter(|entry| self.kinds.iter().any(|kind| kind.as_str() == entry.entry_type))
            .cloned()
            .collect()
    }
}

#[derive(Default)]
struct SourceState {
    registrations: Vec<Registration>,
    next_id: u64,
}

/// An event source driven by the host.
///
/// Entries pushed through [`emit`](ManualSource::emit) are delivered to every
/// live subscription whose kinds include the entry type, in the order given.
/// Clones share state.
#[derive(Clone)]
pub struct ManualSource {
    supported: bool,
    refusal: Option<String>,
    state: Arc<Mutex<SourceState>>,
}

impl ManualSource {
    /// A supported source.
    pub fn new() -> Self {
        Self {
            supported: true,
            refusal: None,
            state: Arc::new(Mutex::new(SourceState::default())),
        }
    }

    /// A source that reports the facility as missing.
    pub fn unsupported() -> Self {
        Self {
            supported: false,
            ..Self::new()
        }
    }

    /// A supported source whose `subscribe` fails with `reason`.
    pub fn refusing(reason: impl Into<String>) -> Self {
        Self {
            refusal: Some(reason.into()),
            ..Self::new()
        }
    }

    /// Deliver one batch. Returns how many subscriptions received entries.
    ///
    /// Callbacks run without the source's lock held, so they may call back
    /// into the source. A nested `emit` is not delivered to the callback
    /// that is already running.
    pub fn emit(&self, batch: &[ObservedEvent]) -> usize {
        let pending: Vec<(u64, SharedCallback, Vec<ObservedEvent>)> = self
            .lock()
            .registrations
            .iter()
            .map(|registration| {
                (
                    registration.id,
                    Arc::clone(&registration.callback),
                    registration.matching(batch),
                )
            })
            .filter(|(_, _, matching)| !matching.is_empty())
            .collect();

        let mut delivered = 0;
        for (id, callback, matching) in pending {
            // An earlier callback may have disconnected this one.
            if !self.is_registered(id) {
                continue;
            }
            let mut callback = match callback.try_lock() {
                Ok(guard) => guard,
                Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
                Err(TryLockError::WouldBlock) => continue,
            };
            (*callback)(&matching);
            delivered += 1;
        }
        delivered
    }

    /// Number of live subscriptions.
    pub fn active_subscriptions(&self) -> usize {
        self.lock().registrations.len()
    }

    /// Kinds requested by each live subscription.
    pub fn observed_kinds(&self) -> Vec<Vec<MetricKind>> {
        self.lock()
            .registrations
            .iter()
            .map(|registration| registration.kinds.clone())
            .collect()
    }

    fn is_registered(&self, id: u64) -> bool {
        self.lock()
            .registrations
            .iter()
            .any(|registration| registration.id == id)
    }

    fn lock(&self) -> MutexGuard<'_, SourceState> {
        lock_state(&self.state)
    }
}

fn lock_state(state: &Mutex<SourceState>) -> MutexGuard<'_, SourceState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Default for ManualSource {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ManualSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualSource")
            .field("supported", &self.supported)
            .field("active_subscriptions", &self.active_subscriptions())
            .finish()
    }
}

impl EventSource for ManualSource {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn subscribe(
        &self,
        kinds: &[MetricKind],
        callback: BatchCallback,
    ) -> MonitorResult<Box<dyn Subscription>> {
        if !self.supported {
            return Err(MonitorError::Platform(
                "event source is not available".to_string(),
            ));
        }
        if let Some(reason) = &self.refusal {
            return Err(MonitorError::Platform(reason.clone()));
        }

        let mut state = self.lock();

        let id = state.next_id;
        state.next_id += 1;
        state.registrations.push(Registration {
            id,
            kinds: kinds.to_vec(),
            callback: Arc::new(Mutex::new(callback)),
        });

        Ok(Box::new(ManualSubscription {
            id,
            state: Arc::clone(&self.state),
        }))
    }
}

struct ManualSubscription {
    id: u64,
    state: Arc<Mutex<SourceState>>,
}

impl Subscription for ManualSubscription {
    fn disconnect(&mut self) {
        lock_state(&self.state)
            .registrations
            .retain(|registration| registration.id != self.id);
    }
}

impl Drop for ManualSubscription {
    fn drop(&mut self) {
        self.disconnect();
    }
}
