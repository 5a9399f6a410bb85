//! Wall clock used by the counters, lockouts and token expiry checks.

use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Source of the current time.
pub trait Clock: Send + Sync + std::fmt::Debug {
    fn now(&self) -> SystemTime;

    /// Seconds since the Unix epoch.
    fn unix_secs(&self) -> u64 {
        self.now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}

/// The operating system clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<SystemTime>,
}

impl ManualClock {
    pub fn new(start: SystemTime) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Start at the given number of seconds after the epoch.
    pub fn at_unix(secs: u64) -> Self {
        Self::new(UNIX_EPOCH + Duration::from_secs(secs))
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> SystemTime {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Longest window, lockout or session lifetime the configuration accepts.
pub const MAX_DURATION_SECS: u64 = 365 * 24 * 60 * 60;

/// `now + after`, clamped to [`MAX_DURATION_SECS`] so it cannot overflow.
pub fn deadline(now: SystemTime, after: Duration) -> SystemTime {
    let after = after.min(Duration::from_secs(MAX_DURATION_SECS));
    now.checked_add(after).unwrap_or(now)
}

/// Whole seconds from `now` until `until`, rounded up. Zero when already past.
pub fn secs_until_ceil(now: SystemTime, until: SystemTime) -> u64 {
    match until.duration_since(now) {
        Ok(d) => {
            let secs = d.as_secs();
            if d.subsec_nanos() > 0 { secs + 1 } else { secs }
        }
        Err(_) => 0,
    }
}
