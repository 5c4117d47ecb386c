/// Shared Tool Context
///
/// Resources every handler may need are built once at startup and handed to
/// the registry, which passes them into each invocation: the secure random
/// source, the clock and the validation options.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

use crate::core::descriptor::ValidationOptions;

/// Source of the current instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock stuck at one instant, for reproducible output.
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Cryptographically strong generator shared by all callers.
///
/// `StdRng` is a CSPRNG seeded from the operating system. The lock is held
/// for a single draw only.
pub struct SharedRng {
    inner: Mutex<StdRng>,
}

impl SharedRng {
    /// Create a generator seeded from the operating system's entropy source.
    pub fn from_entropy() -> Self {
        Self {
            inner: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Uniform integer in `[origin, bound)`. Callers guarantee `origin < bound`.
    pub fn in_range(&self, origin: i64, bound: i64) -> i64 {
        let mut rng = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        rng.gen_range(origin..bound)
    }
}

/// Resources shared by every tool invocation.
///
/// Created once at startup and owned by the registry; handlers receive it by
/// reference on each call.
pub struct ToolContext {
    /// Secure random source for the random-number tool
    pub rng: SharedRng,
    /// Current-instant source for the date/time tool
    pub clock: Box<dyn Clock>,
    /// Options applied by the validation phase
    pub options: ValidationOptions,
    /// Emit an audit event for every invocation.
    pub audit: bool,
}

impl ToolContext {
    /// Build a context using the system clock and a freshly seeded generator.
    ///
    /// # Arguments
    /// * `options` - Validation settings for every tool
    /// * `audit` - Whether invocations are written to the audit log
    pub fn new(options: ValidationOptions, audit: bool) -> Self {
        Self {
            rng: SharedRng::from_entropy(),
            clock: Box::new(SystemClock),
            options,
            audit,
        }
    }

    /// Replace the clock, e.g. with a `FixedClock` for reproducible output.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }
}

impl Default for ToolContext {
    fn default() -> Self {
        Self::new(ValidationOptions::default(), true)
    }
}
