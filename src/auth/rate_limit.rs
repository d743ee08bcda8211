use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

const MAX_FAILURES: u32 = 5;
const WINDOW: Duration = Duration::from_secs(15 * 60);

struct Window {
    started: Instant,
    failures: u32,
}

/// Fixed-window login throttle keyed by client IP. Shared across workers;
/// state is in-memory only and resets with the process.
#[derive(Clone)]
pub struct RateLimiter {
    state: Arc<Mutex<HashMap<IpAddr, Window>>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// True when the address has exhausted its failed attempts for the
    /// current window. Expired windows are dropped on the way through.
    pub fn is_blocked(&self, ip: IpAddr) -> bool {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        match state.get(&ip) {
            Some(w) if w.started.elapsed() < WINDOW => w.failures >= MAX_FAILURES,
            Some(_) => {
                state.remove(&ip);
                false
            }
            None => false,
        }
    }

    /// Count one failed login against the address.
    pub fn record_failure(&self, ip: IpAddr) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let w = state.entry(ip).or_insert(Window {
            started: Instant::now(),
            failures: 0,
        });
        if w.started.elapsed() >= WINDOW {
            w.started = Instant::now();
            w.failures = 0;
        }
        w.failures += 1;
    }

    /// Forget the address, on successful login.
    pub fn clear(&self, ip: IpAddr) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.remove(&ip);
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn ip(last: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(10, 0, 0, last))
    }

    #[test]
    fn blocks_after_max_failures() {
        let limiter = RateLimiter::new();
        for _ in 0..MAX_FAILURES {
            assert!(!limiter.is_blocked(ip(1)));
            limiter.record_failure(ip(1));
        }
        assert!(limiter.is_blocked(ip(1)));
        // A different address is unaffected.
        assert!(!limiter.is_blocked(ip(2)));
    }

    #[test]
    fn successful_login_clears_the_counter() {
        let limiter = RateLimiter::new();
        for _ in 0..MAX_FAILURES {
            limiter.record_failure(ip(3));
        }
        assert!(limiter.is_blocked(ip(3)));
        limiter.clear(ip(3));
        assert!(!limiter.is_blocked(ip(3)));
    }
}
