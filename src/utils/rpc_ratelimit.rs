/// Sliding-window request limiter for the Solana RPC endpoint
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};

pub struct RpcRateLimiter {
    inner: Mutex<Window>,
}

struct Window {
    /// Timestamps of requests inside the current window
    request_times: VecDeque<Instant>,
    max_requests: usize,
    window: Duration,
}

impl Window {
    fn check_and_record(&mut self, now: Instant) -> Duration {
        // Drop timestamps that have left the window
        while let Some(&front) = self.request_times.front() {
            if now.duration_since(front) >= self.window {
                self.request_times.pop_front();
            } else {
                break;
            }
        }

        if self.request_times.len() >= self.max_requests {
            if let Some(&oldest) = self.request_times.front() {
                return self.window - now.duration_since(oldest);
            }
        }

        self.request_times.push_back(now);
        Duration::ZERO
    }
}

impl RpcRateLimiter {
    /// `max_per_second` of 0 is treated as 1
    pub fn new(max_per_second: u32) -> Self {
        Self {
            inner: Mutex::new(Window {
                request_times: VecDeque::new(),
                max_requests: max_per_second.max(1) as usize,
                window: Duration::from_secs(1),
            }),
        }
    }

    /// How long the caller must wait before its request fits in the window.
    /// A zero result means the request was recorded.
    fn check_and_record(&self, now: Instant) -> Duration {
        match self.inner.lock() {
            Ok(mut window) => window.check_and_record(now),
            // A poisoned window only loses throttling, never correctness
            Err(poisoned) => poisoned.into_inner().check_and_record(now),
        }
    }

    /// Wait until one more request fits in the window, then record it
    pub async fn acquire(&self) {
        loop {
            let wait = self.check_and_record(Instant::now());
            if wait.is_zero() {
                return;
            }
            tracing::debug!("RPC rate limit: waiting {}ms", wait.as_millis());
            tokio::time::sleep(wait).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limiter_allows_requests_within_limit() {
        let limiter = RpcRateLimiter::new(10);
        let now = Instant::now();

        for _ in 0..10 {
            assert!(limiter.check_and_record(now).is_zero());
        }
    }

    #[test]
    fn test_rate_limiter_blocks_over_limit() {
        let limiter = RpcRateLimiter::new(10);
        let now = Instant::now();

        for _ in 0..10 {
            limiter.check_and_record(now);
        }

        let wait = limiter.check_and_record(now);
        assert!(wait > Duration::ZERO);
        assert!(wait <= Duration::from_secs(1));
    }

    #[test]
    fn test_rate_limiter_frees_slots_after_window() {
        let limiter = RpcRateLimiter::new(2);
        let start = Instant::now();

        limiter.check_and_record(start);
        limiter.check_and_record(start);
        assert!(!limiter.check_and_record(start).is_zero());

        let later = start + Duration::from_secs(1);
        assert!(limiter.check_and_record(later).is_zero());
    }

    #[tokio::test]
    async fn test_acquire_returns_immediately_under_limit() {
        let limiter = RpcRateLimiter::new(5);
        let started = Instant::now();
        for _ in 0..5 {
            limiter.acquire().await;
        }
        assert!(started.elapsed() < Duration::from_millis(500));
    }
}
