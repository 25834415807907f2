//! Throttle policies
//!
//! A throttle is the admission gate in front of every attempt. It is shared
//! (`Arc`) by all calls that should be limited together, and hands out a
//! [`ThrottlePermit`] that is held while the attempt runs and released when
//! it is dropped, whatever the outcome.

use async_trait::async_trait;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::Instant;

use crate::error::ModelError;

/// Admission granted by a [`ThrottlePolicy`]; dropping it releases the slot.
pub struct ThrottlePermit {
    _guard: Option<Box<dyn std::any::Any + Send + Sync>>,
}

impl ThrottlePermit {
    /// A permit that holds nothing.
    pub fn unrestricted() -> Self {
        Self { _guard: None }
    }

    /// A permit that keeps `guard` alive until it is dropped.
    pub fn new<G: Send + Sync + 'static>(guard: G) -> Self {
        Self {
            _guard: Some(Box::new(guard)),
        }
    }
}

impl fmt::Debug for ThrottlePermit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThrottlePermit")
            .field("restricted", &self._guard.is_some())
            .finish()
    }
}

/// Decides whether and when an attempt may be dispatched.
#[async_trait]
pub trait ThrottlePolicy: Send + Sync + fmt::Debug {
    /// Wait for admission.
    async fn acquire(&self) -> Result<ThrottlePermit, ModelError>;
}

/// No throttling.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThrottleOff;

#[async_trait]
impl ThrottlePolicy for ThrottleOff {
    async fn acquire(&self) -> Result<ThrottlePermit, ModelError> {
        Ok(ThrottlePermit::unrestricted())
    }
}

/// At most `max` attempts in flight at any instant; excess callers wait in
/// FIFO order.
#[derive(Debug, Clone)]
pub struct MaxConcurrency {
    semaphore: Arc<Semaphore>,
    max: usize,
}

impl MaxConcurrency {
    pub fn new(max: usize) -> Self {
        let max = max.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(max)),
            max,
        }
    }

    pub const fn max(&self) -> usize {
        self.max
    }

    /// Slots currently free.
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }
}

#[async_trait]
impl ThrottlePolicy for MaxConcurrency {
    async fn acquire(&self) -> Result<ThrottlePermit, ModelError> {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| ModelError::Internal("throttle semaphore closed".to_string()))?;
        Ok(ThrottlePermit::new(permit))
    }
}

/// Spaces dispatches at least `interval` apart.
#[derive(Debug)]
pub struct RateLimit {
    interval: Duration,
    next_slot: Mutex<Option<Instant>>,
}

impl RateLimit {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_slot: Mutex::new(None),
        }
    }

    /// Allow `requests` dispatches per second, evenly spaced.
    pub fn per_second(requests: u32) -> Self {
        Self::new(Duration::from_secs(1) / requests.max(1))
    }

    pub const fn interval(&self) -> Duration {
        self.interval
    }
}

impl RateLimit {
    fn reserve(&self) -> Reservation<'_> {
        let mut next_slot = self.next_slot.lock().unwrap_or_else(PoisonError::into_inner);
        let previous = *next_slot;
        let now = Instant::now();
        let slot = previous.map_or(now, |next| next.max(now));
        *next_slot = Some(slot + self.interval);
        Reservation {
            next_slot: &self.next_slot,
            previous,
            slot,
            reserved_until: slot + self.interval,
            kept: false,
        }
    }
}

/// Slot taken by a waiting admission; handed back if the wait is cancelled.
struct Reservation<'a> {
    next_slot: &'a Mutex<Option<Instant>>,
    previous: Option<Instant>,
    slot: Instant,
    reserved_until: Instant,
    kept: bool,
}

impl Drop for Reservation<'_> {
    fn drop(&mut self) {
        if self.kept {
            return;
        }
        let mut next_slot = self.next_slot.lock().unwrap_or_else(PoisonError::into_inner);
        // later reservations were stacked on top of this one; leave them alone
        if *next_slot == Some(self.reserved_until) {
            *next_slot = self.previous;
        }
    }
}

#[async_trait]
impl ThrottlePolicy for RateLimit {
    async fn acquire(&self) -> Result<ThrottlePermit, ModelError> {
        let mut reservation = self.reserve();
        tokio::time::sleep_until(reservation.slot).await;
        reservation.kept = true;
        Ok(ThrottlePermit::unrestricted())
    }
}
