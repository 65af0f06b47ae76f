use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tls_bridge::{Engine, Result};

/// One boundary crossing, in the order it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(dead_code)]
pub enum Call {
    Request,
    Release(String),
    DestroySession,
    DestroyAll,
}

/// Wrap an engine and record every call crossing the boundary.
#[allow(dead_code)]
pub struct CallTracker<E> {
    inner: Arc<E>,
    calls: Arc<Mutex<Vec<Call>>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
    delay: Duration,
}

impl<E> Clone for CallTracker<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            calls: Arc::clone(&self.calls),
            in_flight: Arc::clone(&self.in_flight),
            max_in_flight: Arc::clone(&self.max_in_flight),
            delay: self.delay,
        }
    }
}

#[allow(dead_code)]
impl<E: Engine> CallTracker<E> {
    pub fn new(inner: E) -> Self {
        Self {
            inner: Arc::new(inner),
            calls: Arc::new(Mutex::new(Vec::new())),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
            delay: Duration::ZERO,
        }
    }

    /// Hold every request for `delay` to widen overlap windows.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Highest number of `request` calls running at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl<E: Engine> Engine for CallTracker<E> {
    fn request(&self, payload: &str) -> Result<String> {
        self.record(Call::Request);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        let reply = self.inner.request(payload);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        reply
    }

    fn free_memory(&self, id: &str) -> Result<()> {
        self.record(Call::Release(id.to_string()));
        self.inner.free_memory(id)
    }

    fn destroy_session(&self, payload: &str) -> Result<String> {
        self.record(Call::DestroySession);
        self.inner.destroy_session(payload)
    }

    fn destroy_all(&self) -> Result<String> {
        self.record(Call::DestroyAll);
        self.inner.destroy_all()
    }
}
