//! Pool of reusable, stateful processing objects.
//!
//! Analyzers and stemmers are expensive to build and not thread-safe, so each
//! clustering request borrows one from a [`Pool`] instead of creating its own.
//!
//! # Lifecycle
//!
//! ```text
//!            factory()                 passivate() ok
//!   (none) ───────────► in use ──drop──────────────────► idle ──acquire──► in use
//!                          │                 │
//!                          │ discard()       │ passivate() err or panic
//!                          ▼                 ▼
//!                       dropped           dropped
//! ```
//!
//! The [`Pooled`] guard returns the object on drop, so release happens exactly
//! once on every exit path, panics and early returns included.
//!
//! # Bounded vs unbounded
//!
//! With `max_size = None` the pool allocates whenever no idle object exists.
//! With `max_size = Some(n)` at most `n` objects exist at once (idle + in use);
//! `acquire` then blocks until another caller releases one, or fails with
//! [`Error::ResourceUnavailable`] once `acquire_timeout` has elapsed.

use crate::error::{Error, Result};
use parking_lot::{Condvar, Mutex};
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Sizing and waiting policy for a [`Pool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoolConfig {
    /// Upper bound on live objects. `None` = unbounded.
    pub max_size: Option<usize>,
    /// How long `acquire` may block. `None` = wait indefinitely.
    pub acquire_timeout: Option<Duration>,
}

impl PoolConfig {
    /// Unbounded pool.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Pool holding at most `max_size` objects.
    pub fn bounded(max_size: usize) -> Self {
        Self {
            max_size: Some(max_size),
            acquire_timeout: None,
        }
    }

    /// Set the acquisition timeout.
    pub fn with_acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = Some(timeout);
        self
    }

    /// Check parameter ranges.
    pub fn validate(&self) -> Result<()> {
        if self.max_size == Some(0) {
            return Err(Error::InvalidParameter {
                name: "max_size",
                message: "must be at least 1",
            });
        }
        Ok(())
    }
}

type Factory<T> = Box<dyn Fn() -> Result<T> + Send + Sync>;
type Passivation<T> = Box<dyn Fn(&mut T) -> Result<()> + Send + Sync>;

struct State<T> {
    idle: Vec<T>,
    in_use: usize,
    created: usize,
    discarded: usize,
}

/// A pool of reusable objects of type `T`.
pub struct Pool<T> {
    config: PoolConfig,
    factory: Factory<T>,
    passivate: Passivation<T>,
    state: Mutex<State<T>>,
    available: Condvar,
}

impl<T> Pool<T> {
    /// Create a pool that builds objects with `factory`.
    ///
    /// Objects go back to the pool unchanged unless a passivation step is
    /// registered with [`Pool::with_passivation`].
    pub fn new<F>(config: PoolConfig, factory: F) -> Result<Self>
    where
        F: Fn() -> Result<T> + Send + Sync + 'static,
    {
        config.validate()?;
        Ok(Self {
            config,
            factory: Box::new(factory),
            passivate: Box::new(|_| Ok(())),
            state: Mutex::new(State {
                idle: Vec::new(),
                in_use: 0,
                created: 0,
                discarded: 0,
            }),
            available: Condvar::new(),
        })
    }

    /// Register the reset run on every released object.
    ///
    /// Objects whose reset fails are dropped instead of re-entering the pool.
    pub fn with_passivation<P>(mut self, passivate: P) -> Self
    where
        P: Fn(&mut T) -> Result<()> + Send + Sync + 'static,
    {
        self.passivate = Box::new(passivate);
        self
    }

    /// Borrow an object, blocking if the pool is bounded and exhausted.
    pub fn acquire(&self) -> Result<Pooled<'_, T>> {
        // A blocking checkout either yields an object or errors.
        self.checkout(true)?.ok_or(Error::ResourceUnavailable {
            waited: Duration::ZERO,
        })
    }

    /// Borrow an object without blocking. `Ok(None)` if the pool is exhausted.
    pub fn try_acquire(&self) -> Result<Option<Pooled<'_, T>>> {
        self.checkout(false)
    }

    fn checkout(&self, blocking: bool) -> Result<Option<Pooled<'_, T>>> {
        let start = Instant::now();
        let deadline = self.config.acquire_timeout.map(|t| start + t);
        let mut expired = false;
        let mut state = self.state.lock();

        loop {
            if let Some(object) = state.idle.pop() {
                state.in_use += 1;
                return Ok(Some(Pooled::new(self, object)));
            }

            let live = state.in_use + state.idle.len();
            if self.config.max_size.map_or(true, |max| live < max) {
                // Reserve the slot, build outside the lock.
                state.in_use += 1;
                drop(state);
                let reservation = Reservation { pool: self, armed: true };
                let object = (self.factory)()?;
                reservation.disarm();

                let mut state = self.state.lock();
                state.created += 1;
                debug!(created = state.created, in_use = state.in_use, "pool allocated object");
                return Ok(Some(Pooled::new(self, object)));
            }

            if !blocking {
                return Ok(None);
            }
            if expired {
                return Err(Error::ResourceUnavailable {
                    waited: start.elapsed(),
                });
            }

            match deadline {
                Some(deadline) => {
                    expired = self.available.wait_until(&mut state, deadline).timed_out();
                }
                None => self.available.wait(&mut state),
            }
        }
    }

    fn release(&self, mut object: T) {
        let reset = panic::catch_unwind(AssertUnwindSafe(|| (self.passivate)(&mut object)))
            .unwrap_or_else(|_| Err(Error::Other("passivation panicked".to_string())));
        let mut state = self.state.lock();
        state.in_use -= 1;
        match reset {
            Ok(()) => state.idle.push(object),
            Err(e) => {
                state.discarded += 1;
                warn!(error = %e, discarded = state.discarded, "passivation failed, dropping pooled object");
            }
        }
        drop(state);
        self.available.notify_one();
    }

    fn discard_checked_out(&self) {
        let mut state = self.state.lock();
        state.in_use -= 1;
        state.discarded += 1;
        drop(state);
        self.available.notify_one();
    }

    fn unreserve(&self) {
        self.state.lock().in_use -= 1;
        self.available.notify_one();
    }

    /// Objects currently borrowed.
    pub fn in_use(&self) -> usize {
        self.state.lock().in_use
    }

    /// Objects waiting for reuse.
    pub fn idle(&self) -> usize {
        self.state.lock().idle.len()
    }

    /// Objects built by the factory so far.
    pub fn created(&self) -> usize {
        self.state.lock().created
    }

    /// Objects dropped after failed passivation or explicit discard.
    pub fn discarded(&self) -> usize {
        self.state.lock().discarded
    }

    /// The pool's configuration.
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }
}

impl<T> fmt::Debug for Pool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Pool")
            .field("config", &self.config)
            .field("in_use", &state.in_use)
            .field("idle", &state.idle.len())
            .field("created", &state.created)
            .field("discarded", &state.discarded)
            .finish()
    }
}

/// A slot counted as in use while its object is being built.
///
/// Dropping it armed (factory error or panic) frees the slot.
struct Reservation<'a, T> {
    pool: &'a Pool<T>,
    armed: bool,
}

impl<T> Reservation<'_, T> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl<T> Drop for Reservation<'_, T> {
    fn drop(&mut self) {
        if self.armed {
            self.pool.unreserve();
        }
    }
}

/// A borrowed pool object. Returned to the pool on drop.
pub struct Pooled<'a, T> {
    pool: &'a Pool<T>,
    object: Option<T>,
}

impl<'a, T> Pooled<'a, T> {
    fn new(pool: &'a Pool<T>, object: T) -> Self {
        Self {
            pool,
            object: Some(object),
        }
    }

    /// Drop the object instead of returning it (e.g. it is known to be broken).
    pub fn discard(mut self) {
        if self.object.take().is_some() {
            self.pool.discard_checked_out();
        }
    }
}

impl<T> Deref for Pooled<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        match &self.object {
            Some(object) => object,
            None => unreachable!("pooled object accessed after release"),
        }
    }
}

impl<T> DerefMut for Pooled<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        match &mut self.object {
            Some(object) => object,
            None => unreachable!("pooled object accessed after release"),
        }
    }
}

impl<T> Drop for Pooled<'_, T> {
    fn drop(&mut self) {
        if let Some(object) = self.object.take() {
            self.pool.release(object);
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Pooled<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pooled").field(&self.object).finish()
    }
}
