//! Brute-force login throttling.
//!
//! Attempts are tracked per client address in a rolling window. Once an
//! address exhausts its attempts it is denied until the window expires; the
//! window resets in full on the first attempt after the cooldown.

use std::net::IpAddr;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

/// Outcome of gating a single login attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrottleDecision {
    /// The attempt may proceed to credential verification.
    Allowed,
    /// The address is locked out; retry after the indicated whole minutes.
    Blocked { retry_after_minutes: i64 },
}

#[derive(Debug)]
struct AttemptWindow {
    count: u32,
    window_started_at: DateTime<Utc>,
}

/// Per-address login attempt counter.
///
/// Every gated attempt consumes one slot, whether or not the credential
/// check that follows succeeds; the caller decides (per policy) whether to
/// call [`clear`](Self::clear) after a successful login.
#[derive(Debug)]
pub struct LoginThrottle {
    max_attempts: u32,
    cooldown: Duration,
    attempts: DashMap<IpAddr, AttemptWindow>,
}

impl LoginThrottle {
    /// Create a throttle allowing `max_attempts` per `lockout_minutes` window.
    pub fn new(max_attempts: u32, lockout_minutes: i64) -> Self {
        Self {
            max_attempts,
            cooldown: Duration::minutes(lockout_minutes),
            attempts: DashMap::new(),
        }
    }

    /// Gate a login attempt from `addr`, consuming one attempt slot.
    pub fn gate(&self, addr: IpAddr) -> ThrottleDecision {
        self.gate_at(addr, Utc::now())
    }

    /// Forget the window for `addr`.
    pub fn clear(&self, addr: IpAddr) {
        self.attempts.remove(&addr);
    }

    /// Drop windows whose cooldown has fully elapsed.
    pub fn sweep(&self, now: DateTime<Utc>) {
        self.attempts
            .retain(|_, window| now - window.window_started_at <= self.cooldown);
    }

    /// Number of addresses currently tracked.
    pub fn tracked_addresses(&self) -> usize {
        self.attempts.len()
    }

    fn gate_at(&self, addr: IpAddr, now: DateTime<Utc>) -> ThrottleDecision {
        // First sighting of an address is the cheap moment to drop windows
        // other addresses no longer need. Must happen before taking the
        // entry lock below.
        if !self.attempts.contains_key(&addr) {
            self.sweep(now);
        }

        // The entry guard holds the shard lock, making check-then-increment
        // atomic per address.
        let mut window = self.attempts.entry(addr).or_insert_with(|| AttemptWindow {
            count: 0,
            window_started_at: now,
        });

        if now - window.window_started_at > self.cooldown {
            window.count = 1;
            window.window_started_at = now;
            return ThrottleDecision::Allowed;
        }

        if window.count < self.max_attempts {
            window.count += 1;
            return ThrottleDecision::Allowed;
        }

        let remaining = self.cooldown - (now - window.window_started_at);
        let retry_after_minutes = (remaining.num_seconds() + 59) / 60;
        ThrottleDecision::Blocked {
            retry_after_minutes: retry_after_minutes.max(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(last: u8) -> IpAddr {
        IpAddr::from([192, 168, 0, last])
    }

    fn throttle() -> LoginThrottle {
        LoginThrottle::new(5, 15)
    }

    #[test]
    fn test_first_attempts_allowed() {
        let throttle = throttle();
        let now = Utc::now();

        for _ in 0..5 {
            assert_eq!(throttle.gate_at(addr(1), now), ThrottleDecision::Allowed);
        }
    }

    #[test]
    fn test_sixth_attempt_blocked() {
        let throttle = throttle();
        let now = Utc::now();

        for _ in 0..5 {
            throttle.gate_at(addr(1), now);
        }

        match throttle.gate_at(addr(1), now + Duration::minutes(3)) {
            ThrottleDecision::Blocked {
                retry_after_minutes,
            } => assert_eq!(retry_after_minutes, 12),
            ThrottleDecision::Allowed => panic!("sixth attempt within the window must be blocked"),
        }
    }

    #[test]
    fn test_retry_after_is_rounded_up() {
        let throttle = throttle();
        let now = Utc::now();

        for _ in 0..5 {
            throttle.gate_at(addr(1), now);
        }

        // 14m30s into the window leaves 30s, which reports as one minute.
        match throttle.gate_at(addr(1), now + Duration::seconds(14 * 60 + 30)) {
            ThrottleDecision::Blocked {
                retry_after_minutes,
            } => assert_eq!(retry_after_minutes, 1),
            ThrottleDecision::Allowed => panic!("attempt within the window must be blocked"),
        }
    }

    #[test]
    fn test_window_resets_after_cooldown() {
        let throttle = throttle();
        let now = Utc::now();

        for _ in 0..6 {
            throttle.gate_at(addr(1), now);
        }

        // 16 minutes after the window started, the address gets a fresh window.
        let later = now + Duration::minutes(16);
        assert_eq!(throttle.gate_at(addr(1), later), ThrottleDecision::Allowed);

        // And the reset is to count=1, so four more attempts still fit.
        for _ in 0..4 {
            assert_eq!(throttle.gate_at(addr(1), later), ThrottleDecision::Allowed);
        }
        assert!(matches!(
            throttle.gate_at(addr(1), later),
            ThrottleDecision::Blocked { .. }
        ));
    }

    #[test]
    fn test_addresses_are_independent() {
        let throttle = throttle();
        let now = Utc::now();

        for _ in 0..6 {
            throttle.gate_at(addr(1), now);
        }

        assert_eq!(throttle.gate_at(addr(2), now), ThrottleDecision::Allowed);
    }

    #[test]
    fn test_clear_forgets_address() {
        let throttle = throttle();
        let now = Utc::now();

        for _ in 0..6 {
            throttle.gate_at(addr(1), now);
        }

        throttle.clear(addr(1));
        assert_eq!(throttle.gate_at(addr(1), now), ThrottleDecision::Allowed);
    }

    #[test]
    fn test_sweep_on_new_address_drops_stale_windows() {
        let throttle = throttle();
        let now = Utc::now();

        throttle.gate_at(addr(1), now);
        assert_eq!(throttle.tracked_addresses(), 1);

        // A new address 20 minutes later sweeps the stale window out.
        throttle.gate_at(addr(2), now + Duration::minutes(20));
        assert_eq!(throttle.tracked_addresses(), 1);
    }
}
