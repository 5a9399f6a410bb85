//! Brute-force protection for the admin password login.
//!
//! # State machine (per fingerprint)
//! ```text
//! Fresh → (failure) → Counting → (failure × max_attempts) → Locked
//! Locked → (lockout elapses, window expired) → Fresh
//! Counting → (success) → Fresh
//! ```
//!
//! # Design Decisions
//! - Independent of the API limiter; the two stores never consult each other
//! - A success removes the record outright
//! - While locked the caller must not evaluate the password
//! - Each operation runs under the fingerprint's shard lock

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use dashmap::DashMap;

use crate::config::LoginThrottleConfig;
use crate::security::clock::{deadline, secs_until_ceil, Clock};

/// Failed attempts for one fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginAttemptRecord {
    pub count: u32,
    pub reset_time: SystemTime,
    pub blocked_until: Option<SystemTime>,
}

impl LoginAttemptRecord {
    fn fresh(now: SystemTime, window: Duration) -> Self {
        Self {
            count: 0,
            reset_time: deadline(now, window),
            blocked_until: None,
        }
    }

    fn is_locked(&self, now: SystemTime) -> bool {
        self.blocked_until.is_some_and(|until| now < until)
    }
}

/// Result of [`LoginThrottle::check`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginDecision {
    pub allowed: bool,
    pub retry_after_secs: Option<u64>,
}

impl LoginDecision {
    fn allow() -> Self {
        Self {
            allowed: true,
            retry_after_secs: None,
        }
    }

    fn deny(retry_after_secs: u64) -> Self {
        Self {
            allowed: false,
            retry_after_secs: Some(retry_after_secs.max(1)),
        }
    }
}

/// Per-fingerprint failure tracking with temporary lockouts.
pub struct LoginThrottle {
    attempts: DashMap<String, LoginAttemptRecord>,
    max_attempts: u32,
    window: Duration,
    lockout: Duration,
    clock: Arc<dyn Clock>,
}

impl LoginThrottle {
    pub fn new(config: &LoginThrottleConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            attempts: DashMap::new(),
            max_attempts: config.max_attempts,
            window: Duration::from_secs(config.window_secs),
            lockout: Duration::from_secs(config.lockout_secs),
            clock,
        }
    }

    /// Whether `fingerprint` may attempt a password check right now.
    pub fn check(&self, fingerprint: &str) -> LoginDecision {
        let now = self.clock.now();
        let mut entry = self
            .attempts
            .entry(fingerprint.to_string())
            .or_insert_with(|| LoginAttemptRecord::fresh(now, self.window));
        let record = entry.value_mut();

        if let Some(until) = record.blocked_until {
            if now < until {
                return LoginDecision::deny(secs_until_ceil(now, until));
            }
        }

        if now > record.reset_time {
            *record = LoginAttemptRecord::fresh(now, self.window);
            return LoginDecision::allow();
        }

        if record.count >= self.max_attempts {
            record.blocked_until = Some(deadline(now, self.lockout));
            tracing::warn!(
                fingerprint = %fingerprint,
                failures = record.count,
                lockout_secs = self.lockout.as_secs(),
                "Login fingerprint locked out"
            );
            return LoginDecision::deny(self.lockout.as_secs());
        }

        LoginDecision::allow()
    }

    /// Count a wrong password. Reaching the threshold locks immediately.
    pub fn record_failure(&self, fingerprint: &str) {
        let now = self.clock.now();
        let mut entry = self
            .attempts
            .entry(fingerprint.to_string())
            .or_insert_with(|| LoginAttemptRecord::fresh(now, self.window));
        let record = entry.value_mut();

        if now > record.reset_time && !record.is_locked(now) {
            *record = LoginAttemptRecord::fresh(now, self.window);
        }

        record.count += 1;
        if record.count >= self.max_attempts {
            record.blocked_until = Some(deadline(now, self.lockout));
            tracing::warn!(
                fingerprint = %fingerprint,
                failures = record.count,
                lockout_secs = self.lockout.as_secs(),
                "Login fingerprint locked out"
            );
        }
    }

    /// Forget the fingerprint after a correct password.
    pub fn record_success(&self, fingerprint: &str) {
        self.attempts.remove(fingerprint);
    }

    pub fn get(&self, fingerprint: &str) -> Option<LoginAttemptRecord> {
        self.attempts.get(fingerprint).map(|r| *r.value())
    }

    /// Drop records with an expired window and no active lockout.
    pub fn sweep(&self) -> usize {
        let now = self.clock.now();
        let before = self.attempts.len();
        self.attempts
            .retain(|_, record| record.is_locked(now) || now <= record.reset_time);
        before.saturating_sub(self.attempts.len())
    }

    pub fn len(&self) -> usize {
        self.attempts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attempts.is_empty()
    }
}
