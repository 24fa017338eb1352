//! Async resource loader: runs a producer and tracks the lifecycle of its
//! latest attempt as a [`LoadState`] snapshot.

use std::{
    any::Any,
    future::Future,
    panic::{self, AssertUnwindSafe},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, PoisonError,
    },
};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use futures::{future::BoxFuture, FutureExt};
use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, warn};

/// Shown when a producer fails with an error that renders as empty text.
pub const FALLBACK_FAILURE_MESSAGE: &str = "An error occurred";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadPhase {
    #[default]
    NotStarted,
    InProgress,
    Succeeded,
    Failed,
}

/// Snapshot of one loader.
///
/// `value` survives later attempts until a new success replaces it, so a
/// consumer can keep rendering stale data under a loading indicator or a
/// failure message.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadState<T> {
    pub value: Option<T>,
    pub pending: bool,
    pub failure: Option<String>,
    pub phase: LoadPhase,
}

impl<T> Default for LoadState<T> {
    fn default() -> Self {
        Self {
            value: None,
            pending: false,
            failure: None,
            phase: LoadPhase::NotStarted,
        }
    }
}

impl<T> LoadState<T> {
    pub fn is_settled(&self) -> bool {
        matches!(self.phase, LoadPhase::Succeeded | LoadPhase::Failed)
    }

    fn begin(&mut self) {
        self.pending = true;
        self.phase = LoadPhase::InProgress;
        self.failure = None;
    }

    fn succeed(&mut self, value: T) {
        self.value = Some(value);
        self.failure = None;
        self.phase = LoadPhase::Succeeded;
        self.pending = false;
    }

    fn fail(&mut self, message: String) {
        self.failure = Some(message);
        self.phase = LoadPhase::Failed;
        self.pending = false;
    }
}

/// Zero-argument async operation yielding a value or failing.
#[async_trait]
pub trait Producer<T>: Send + Sync {
    async fn produce(&self) -> Result<T>;
}

#[async_trait]
impl<T, F, Fut> Producer<T> for F
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<T>> + Send + 'static,
    T: Send + 'static,
{
    async fn produce(&self) -> Result<T> {
        (self)().await
    }
}

type Fetch<T, K> = Arc<dyn Fn(K) -> BoxFuture<'static, Result<T>> + Send + Sync>;

struct Shared<T, K> {
    fetch: Fetch<T, K>,
    state: watch::Sender<LoadState<T>>,
    latest_attempt: AtomicU64,
    trigger_key: Mutex<K>,
}

impl<T, K> Shared<T, K> {
    fn begin_attempt(&self) -> u64 {
        let mut attempt = 0;
        self.state.send_modify(|state| {
            attempt = self.latest_attempt.fetch_add(1, Ordering::SeqCst) + 1;
            state.begin();
        });
        attempt
    }

    /// Applies `outcome` only if `attempt` is still the most recently started
    /// one. Returns whether the snapshot changed.
    fn complete(&self, attempt: u64, outcome: Result<T>) -> bool {
        let outcome = outcome.map_err(|err| failure_message(&err));
        let failed = outcome.as_ref().err().cloned();

        let applied = self.state.send_if_modified(|state| {
            if self.latest_attempt.load(Ordering::SeqCst) != attempt {
                return false;
            }
            match outcome {
                Ok(value) => state.succeed(value),
                Err(message) => state.fail(message),
            }
            true
        });

        match (applied, failed) {
            (false, _) => debug!(attempt, "discarded superseded load attempt"),
            (true, Some(message)) => warn!(attempt, failure = %message, "load attempt failed"),
            (true, None) => debug!(attempt, "load attempt succeeded"),
        }
        applied
    }
}

fn failure_message(err: &anyhow::Error) -> String {
    let message = err.to_string();
    if message.trim().is_empty() {
        FALLBACK_FAILURE_MESSAGE.to_string()
    } else {
        message
    }
}

/// A producer that panics fails its attempt instead of leaving it pending.
fn panic_error(payload: Box<dyn Any + Send>) -> anyhow::Error {
    let detail = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned());
    match detail {
        Some(detail) => anyhow!("producer panicked: {detail}"),
        None => anyhow!("producer panicked"),
    }
}

/// Tracks one producer for one consumer.
///
/// Attempts run as tokio tasks, so `attach`, `observe` and `refetch` must be
/// called from within a runtime. Overlapping attempts are allowed; only the
/// most recently started one may publish its outcome.
pub struct ResourceLoader<T, K = ()> {
    shared: Arc<Shared<T, K>>,
}

impl<T, K> Clone for ResourceLoader<T, K> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T, K> ResourceLoader<T, K>
where
    T: Send + Sync + 'static,
    K: Clone + PartialEq + Send + 'static,
{
    /// Starts observing `producer` and kicks off the first attempt.
    pub fn attach(producer: impl Producer<T> + 'static, trigger_key: K) -> Self {
        let producer = Arc::new(producer);
        Self::attach_with(
            move |_key: K| {
                let producer = Arc::clone(&producer);
                async move { producer.produce().await }
            },
            trigger_key,
        )
    }

    /// Like [`attach`](Self::attach), for producers that read the trigger key.
    pub fn attach_with<F, Fut>(fetch: F, trigger_key: K) -> Self
    where
        F: Fn(K) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let (state, _) = watch::channel(LoadState::default());
        let loader = Self {
            shared: Arc::new(Shared {
                fetch: Arc::new(move |key| fetch(key).boxed()),
                state,
                latest_attempt: AtomicU64::new(0),
                trigger_key: Mutex::new(trigger_key),
            }),
        };
        drop(loader.start_attempt());
        loader
    }

    /// Compares `trigger_key` with the key seen on the previous observation
    /// and starts a new attempt when it differs.
    pub fn observe(&self, trigger_key: K) -> Option<JoinHandle<()>> {
        {
            let mut current = self
                .shared
                .trigger_key
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if *current == trigger_key {
                return None;
            }
            *current = trigger_key;
        }
        Some(self.start_attempt())
    }

    /// Starts a new attempt with the current key, whether or not one is
    /// already in flight.
    pub fn refetch(&self) -> JoinHandle<()> {
        self.start_attempt()
    }

    pub fn trigger_key(&self) -> K {
        self.shared
            .trigger_key
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn start_attempt(&self) -> JoinHandle<()> {
        let key = self.trigger_key();
        let attempt = self.shared.begin_attempt();
        debug!(attempt, "load attempt started");

        let fetch = Arc::clone(&self.shared.fetch);
        let pending = match panic::catch_unwind(AssertUnwindSafe(|| fetch(key))) {
            Ok(pending) => AssertUnwindSafe(pending)
                .catch_unwind()
                .map(|outcome| outcome.unwrap_or_else(|payload| Err(panic_error(payload))))
                .boxed(),
            Err(payload) => {
                let err = panic_error(payload);
                async move { Err::<T, anyhow::Error>(err) }.boxed()
            }
        };
        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            let outcome = pending.await;
            shared.complete(attempt, outcome);
        })
    }
}

impl<T, K> ResourceLoader<T, K>
where
    T: Clone,
{
    pub fn current_state(&self) -> LoadState<T> {
        self.shared.state.borrow().clone()
    }

    /// Receiver notified on every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<LoadState<T>> {
        self.shared.state.subscribe()
    }

    /// Waits until no attempt is pending and returns that snapshot.
    pub async fn settled(&self) -> LoadState<T> {
        let mut rx = self.subscribe();
        let settled = match rx.wait_for(|state| !state.pending).await {
            Ok(state) => (*state).clone(),
            Err(_) => self.current_state(),
        };
        settled
    }
}

#[cfg(test)]
#[path = "tests/loader_tests.rs"]
mod tests;
