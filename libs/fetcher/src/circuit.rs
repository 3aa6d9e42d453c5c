use std::time::{SystemTime, UNIX_EPOCH};

/// Circuit breaker state, ported 1:1 from the original client's `CircuitState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

/// Tracks consecutive upstream failures and decides when to stop (and resume)
/// sending requests to a failing endpoint.
pub struct CircuitBreaker {
    state: CircuitState,
    failure_count: u32,
    failure_threshold: u32,
    recovery_timeout_secs: u64,
    last_failure_at: Option<u64>,
}

impl CircuitBreaker {
    pub fn new(failure_threshold: u32, recovery_timeout_secs: u64) -> Self {
        Self {
            state: CircuitState::Closed,
            failure_count: 0,
            failure_threshold,
            recovery_timeout_secs,
            last_failure_at: None,
        }
    }

    pub fn state(&self) -> CircuitState {
        self.state
    }

    pub fn failure_count(&self) -> u32 {
        self.failure_count
    }

    pub fn last_failure_at(&self) -> Option<u64> {
        self.last_failure_at
    }

    /// Returns true if a request should be blocked right now. Transitions
    /// OPEN → HALF_OPEN as a side effect once the recovery timeout elapses.
    pub fn should_block(&mut self) -> bool {
        match self.state {
            CircuitState::Open => {
                let elapsed = now_unix().saturating_sub(self.last_failure_at.unwrap_or(0));
                if elapsed >= self.recovery_timeout_secs {
                    self.state = CircuitState::HalfOpen;
                    false
                } else {
                    true
                }
            }
            CircuitState::Closed | CircuitState::HalfOpen => false,
        }
    }

    pub fn record_success(&mut self) {
        self.failure_count = 0;
        if self.state == CircuitState::HalfOpen {
            self.state = CircuitState::Closed;
        }
    }

    pub fn record_failure(&mut self) {
        self.failure_count += 1;
        self.last_failure_at = Some(now_unix());
        if self.state == CircuitState::HalfOpen {
            // Probe failed: back to OPEN immediately regardless of threshold.
            self.state = CircuitState::Open;
        } else if self.failure_count >= self.failure_threshold {
            self.state = CircuitState::Open;
        }
    }
}

fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
