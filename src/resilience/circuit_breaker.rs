//! Circuit breaker for upstream protection.
//!
//! # States
//! - Closed: normal operation, calls pass through and outcomes are recorded
//! - Open: upstream assumed down, calls fail fast
//! - Half-Open: a limited number of trial calls probe recovery
//!
//! # State Transitions
//! ```text
//! Closed → Open: failure ratio over the sliding window >= threshold
//!                (evaluated once minimum_calls outcomes are buffered)
//! Open → Half-Open: first permit check after open_duration elapses
//! Half-Open → Closed: half_open_trials consecutive trial successes
//! Half-Open → Open: any trial failure (open timer resets)
//! ```
//!
//! # Design Decisions
//! - One breaker per protected upstream endpoint, shared via the registry
//! - Fail fast in Open state; the rejected caller never waits
//! - The window is a fixed-capacity ring; the newest outcome overwrites the
//!   oldest once full
//! - State tag is atomic for lock-free permit checks on the Closed hot path

use dashmap::DashMap;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::config::BreakerConfig;
use crate::observability::metrics;

/// Breaker state.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed = 0,
    Open = 1,
    HalfOpen = 2,
}

impl From<u8> for CircuitState {
    fn from(val: u8) -> Self {
        match val {
            1 => CircuitState::Open,
            2 => CircuitState::HalfOpen,
            _ => CircuitState::Closed,
        }
    }
}

/// Fixed-capacity circular buffer of call outcomes.
#[derive(Debug)]
struct Window {
    /// true = success, false = failure.
    slots: Vec<bool>,
    head: usize,
    filled: usize,
    failures: usize,
}

impl Window {
    fn new(capacity: usize) -> Self {
        Self {
            slots: vec![true; capacity],
            head: 0,
            filled: 0,
            failures: 0,
        }
    }

    fn record(&mut self, success: bool) {
        if self.filled == self.slots.len() {
            // Overwriting the oldest outcome.
            if !self.slots[self.head] {
                self.failures -= 1;
            }
        } else {
            self.filled += 1;
        }
        self.slots[self.head] = success;
        if !success {
            self.failures += 1;
        }
        self.head = (self.head + 1) % self.slots.len();
    }

    fn failure_ratio(&self) -> f64 {
        if self.filled == 0 {
            return 0.0;
        }
        self.failures as f64 / self.filled as f64
    }

    fn reset(&mut self) {
        self.head = 0;
        self.filled = 0;
        self.failures = 0;
    }
}

#[derive(Debug)]
struct BreakerInner {
    window: Window,
    /// Set whenever the breaker opens; cleared on close.
    opened_at: Option<Instant>,
    /// Trial permits currently handed out in Half-Open.
    half_open_in_flight: u32,
    /// Consecutive trial successes in Half-Open.
    half_open_successes: u32,
}

/// Sliding-window circuit breaker, one per protected upstream endpoint.
#[derive(Debug)]
pub struct CircuitBreaker {
    /// Endpoint name for logging and metrics.
    name: String,
    /// Current state (atomic so Closed permits skip the lock).
    state: AtomicU8,
    failure_rate_threshold: f64,
    minimum_calls: usize,
    open_duration: Duration,
    half_open_trials: u32,
    inner: Mutex<BreakerInner>,
}

impl CircuitBreaker {
    /// Create a breaker in the Closed state.
    pub fn new(name: impl Into<String>, config: &BreakerConfig) -> Self {
        let name = name.into();
        tracing::info!(
            breaker = %name,
            window_size = config.window_size,
            failure_rate_threshold = config.failure_rate_threshold,
            open_duration_ms = config.open_duration_ms,
            "Circuit breaker initialized"
        );

        Self {
            name,
            state: AtomicU8::new(CircuitState::Closed as u8),
            failure_rate_threshold: config.failure_rate_threshold,
            minimum_calls: config.minimum_calls,
            open_duration: Duration::from_millis(config.open_duration_ms),
            half_open_trials: config.half_open_trials,
            inner: Mutex::new(BreakerInner {
                window: Window::new(config.window_size),
                opened_at: None,
                half_open_in_flight: 0,
                half_open_successes: 0,
            }),
        }
    }

    /// Endpoint name this breaker protects.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current state.
    pub fn state(&self) -> CircuitState {
        CircuitState::from(self.state.load(Ordering::Acquire))
    }

    /// Failure ratio over the currently buffered outcomes.
    pub fn failure_ratio(&self) -> f64 {
        self.lock().window.failure_ratio()
    }

    /// Number of outcomes currently buffered in the window.
    pub fn recorded_calls(&self) -> usize {
        self.lock().window.filled
    }

    /// The window stays consistent even if a holder panicked, so poisoning
    /// is ignored.
    fn lock(&self) -> MutexGuard<'_, BreakerInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Ask for permission to make one upstream call.
    ///
    /// Performs the Open → Half-Open transition when the open duration has
    /// elapsed; the caller that triggers it gets the first trial permit.
    pub fn try_acquire(&self) -> bool {
        match self.state() {
            CircuitState::Closed => true,
            _ => self.try_acquire_slow(),
        }
    }

    fn try_acquire_slow(&self) -> bool {
        let mut inner = self.lock();
        // Re-read under the lock; another caller may have transitioned.
        match self.state() {
            CircuitState::Closed => true,
            CircuitState::Open => match inner.opened_at {
                Some(at) if at.elapsed() >= self.open_duration => {
                    self.to_half_open(&mut inner);
                    inner.half_open_in_flight = 1;
                    true
                }
                Some(_) => {
                    metrics::record_breaker_rejection(&self.name);
                    false
                }
                None => {
                    tracing::warn!(breaker = %self.name, "Open state without timestamp, permitting call");
                    true
                }
            },
            CircuitState::HalfOpen => {
                if inner.half_open_in_flight < self.half_open_trials {
                    inner.half_open_in_flight += 1;
                    true
                } else {
                    metrics::record_breaker_rejection(&self.name);
                    false
                }
            }
        }
    }

    /// Record a successful call outcome.
    pub fn record_success(&self) {
        let mut inner = self.lock();
        match self.state() {
            CircuitState::Closed => {
                inner.window.record(true);
                self.evaluate(&mut inner);
            }
            CircuitState::HalfOpen => {
                inner.half_open_successes += 1;
                if inner.half_open_successes >= self.half_open_trials {
                    self.to_closed(&mut inner);
                } else {
                    inner.half_open_in_flight = inner.half_open_in_flight.saturating_sub(1);
                }
            }
            // Late completion from before a transition; nothing to count.
            CircuitState::Open => {}
        }
    }

    /// Record a failed call outcome.
    pub fn record_failure(&self) {
        let mut inner = self.lock();
        match self.state() {
            CircuitState::Closed => {
                inner.window.record(false);
                self.evaluate(&mut inner);
            }
            CircuitState::HalfOpen => {
                tracing::warn!(breaker = %self.name, "Trial call failed, reopening");
                self.to_open(&mut inner);
            }
            CircuitState::Open => {}
        }
    }

    /// Force the breaker open (operational override).
    pub fn force_open(&self) {
        let mut inner = self.lock();
        tracing::warn!(breaker = %self.name, "Circuit breaker forced open");
        self.to_open(&mut inner);
    }

    /// Reset to Closed with an empty window (operational override).
    pub fn reset(&self) {
        let mut inner = self.lock();
        tracing::warn!(breaker = %self.name, "Circuit breaker reset");
        self.to_closed(&mut inner);
    }

    fn evaluate(&self, inner: &mut BreakerInner) {
        if inner.window.filled < self.minimum_calls {
            return;
        }
        if inner.window.failure_ratio() >= self.failure_rate_threshold {
            self.to_open(inner);
        }
    }

    fn to_open(&self, inner: &mut BreakerInner) {
        self.state.store(CircuitState::Open as u8, Ordering::Release);
        inner.opened_at = Some(Instant::now());
        inner.half_open_in_flight = 0;
        inner.half_open_successes = 0;

        tracing::warn!(
            breaker = %self.name,
            failure_ratio = inner.window.failure_ratio(),
            open_duration_ms = self.open_duration.as_millis() as u64,
            "Circuit breaker opened"
        );
        metrics::record_breaker_state(&self.name, CircuitState::Open);
    }

    fn to_half_open(&self, inner: &mut BreakerInner) {
        self.state
            .store(CircuitState::HalfOpen as u8, Ordering::Release);
        inner.half_open_in_flight = 0;
        inner.half_open_successes = 0;

        tracing::info!(
            breaker = %self.name,
            half_open_trials = self.half_open_trials,
            "Circuit breaker half-open, probing recovery"
        );
        metrics::record_breaker_state(&self.name, CircuitState::HalfOpen);
    }

    fn to_closed(&self, inner: &mut BreakerInner) {
        self.state
            .store(CircuitState::Closed as u8, Ordering::Release);
        inner.window.reset();
        inner.opened_at = None;
        inner.half_open_in_flight = 0;
        inner.half_open_successes = 0;

        tracing::info!(breaker = %self.name, "Circuit breaker closed");
        metrics::record_breaker_state(&self.name, CircuitState::Closed);
    }
}

/// Get-or-create registry of breakers keyed by endpoint name.
///
/// All breakers share one configuration; each endpoint gets its own window.
#[derive(Debug)]
pub struct BreakerRegistry {
    config: BreakerConfig,
    breakers: DashMap<String, Arc<CircuitBreaker>>,
}

impl BreakerRegistry {
    pub fn new(config: BreakerConfig) -> Self {
        Self {
            config,
            breakers: DashMap::new(),
        }
    }

    /// Fetch the breaker for an endpoint, creating it on first use.
    pub fn breaker(&self, endpoint: &str) -> Arc<CircuitBreaker> {
        self.breakers
            .entry(endpoint.to_string())
            .or_insert_with(|| Arc::new(CircuitBreaker::new(endpoint, &self.config)))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    fn config(window: usize, threshold: f64, open_ms: u64, trials: u32) -> BreakerConfig {
        BreakerConfig {
            window_size: window,
            failure_rate_threshold: threshold,
            minimum_calls: window,
            open_duration_ms: open_ms,
            half_open_trials: trials,
        }
    }

    #[test]
    fn test_starts_closed_and_permits() {
        let cb = CircuitBreaker::new("test", &config(10, 0.5, 1000, 1));
        assert_eq!(cb.state(), CircuitState::Closed);
        assert!(cb.try_acquire());
        assert_eq!(cb.recorded_calls(), 0);
    }

    #[test]
    fn test_opens_at_threshold_with_full_window() {
        // Window 10, threshold 50%: five failures then five successes.
        let cb = CircuitBreaker::new("test", &config(10, 0.5, 60_000, 1));
        for _ in 0..5 {
            cb.record_failure();
        }
        // Below minimum_calls, even a 100% failure ratio does not open.
        assert_eq!(cb.state(), CircuitState::Closed);

        for _ in 0..4 {
            cb.record_success();
        }
        assert_eq!(cb.state(), CircuitState::Closed);

        // Tenth outcome fills the window at exactly the threshold.
        cb.record_success();
        assert_eq!(cb.state(), CircuitState::Open);
        assert!(!cb.try_acquire());
    }

    #[test]
    fn test_stays_closed_below_threshold() {
        let cb = CircuitBreaker::new("test", &config(4, 0.75, 1000, 1));
        cb.record_failure();
        cb.record_failure();
        cb.record_success();
        cb.record_success();

        assert_eq!(cb.failure_ratio(), 0.5);
        assert_eq!(cb.state(), CircuitState::Closed);
    }

    #[test]
    fn test_window_overwrites_oldest_outcome() {
        let cb = CircuitBreaker::new("test", &config(4, 0.9, 1000, 1));
        cb.record_failure();
        cb.record_failure();
        cb.record_success();
        cb.record_success();
        // Two more successes push both failures out of the window.
        cb.record_success();
        cb.record_success();

        assert_eq!(cb.recorded_calls(), 4);
        assert_eq!(cb.failure_ratio(), 0.0);
    }

    #[test]
    fn test_half_open_after_open_duration_then_closes() {
        let cb = CircuitBreaker::new("test", &config(2, 0.5, 50, 2));
        cb.record_failure();
        cb.record_failure();
        assert_eq!(cb.state(), CircuitState::Open);
        assert!(!cb.try_acquire());

        sleep(Duration::from_millis(70));

        // First permit after the wait transitions to Half-Open.
        assert!(cb.try_acquire());
        assert_eq!(cb.state(), CircuitState::HalfOpen);

        cb.record_success();
        assert_eq!(cb.state(), CircuitState::HalfOpen);
        assert!(cb.try_acquire());
        cb.record_success();
        assert_eq!(cb.state(), CircuitState::Closed);
        // The window was reset on close.
        assert_eq!(cb.recorded_calls(), 0);
    }

    #[test]
    fn test_half_open_limits_outstanding_trials() {
        let cb = CircuitBreaker::new("test", &config(2, 0.5, 10, 1));
        cb.record_failure();
        cb.record_failure();
        sleep(Duration::from_millis(30));

        assert!(cb.try_acquire());
        // Only one trial may be outstanding.
        assert!(!cb.try_acquire());
    }

    #[test]
    fn test_trial_failure_reopens_and_resets_timer() {
        let cb = CircuitBreaker::new("test", &config(2, 0.5, 50, 1));
        cb.record_failure();
        cb.record_failure();
        sleep(Duration::from_millis(70));

        assert!(cb.try_acquire());
        cb.record_failure();
        assert_eq!(cb.state(), CircuitState::Open);

        // Timer restarted: still rejecting well within the new window.
        sleep(Duration::from_millis(20));
        assert!(!cb.try_acquire());

        sleep(Duration::from_millis(60));
        assert!(cb.try_acquire());
        cb.record_success();
        assert_eq!(cb.state(), CircuitState::Closed);
    }

    #[test]
    fn test_force_open_and_reset() {
        let cb = CircuitBreaker::new("test", &config(4, 0.5, 60_000, 1));
        cb.force_open();
        assert_eq!(cb.state(), CircuitState::Open);
        assert!(!cb.try_acquire());

        cb.reset();
        assert_eq!(cb.state(), CircuitState::Closed);
        assert!(cb.try_acquire());
        assert_eq!(cb.recorded_calls(), 0);
    }

    #[test]
    fn test_registry_returns_same_instance_per_endpoint() {
        let registry = BreakerRegistry::new(config(4, 0.5, 1000, 1));
        let a = registry.breaker("product-api");
        let b = registry.breaker("product-api");
        let other = registry.breaker("inventory-api");

        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &other));
    }
}
