//! In-memory, thread-safe limiter for authentication attempts.
//! Each attempt is counted before verification and only forgotten on
//! success, so a client IP is blocked once it has spent its attempts within
//! a window, no matter how many requests it sends at once.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct RateLimiter {
    // Map of IP -> (unforgiven attempts, first attempt timestamp)
    inner: Arc<Mutex<HashMap<IpAddr, (u32, Instant)>>>,
    pub max_attempts: u32,
    pub window: Duration,
}

impl RateLimiter {
    pub fn new(max_attempts: u32, window: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            max_attempts,
            window,
        }
    }

    /// Reserve an attempt for the IP. Returns false, reserving nothing, if the
    /// IP has used up its attempts for the current window.
    pub async fn check_and_increment(&self, ip: IpAddr) -> bool {
        let mut map = self.inner.lock().await;
        let now = Instant::now();
        let entry = map.entry(ip).or_insert((0, now));
        // If window expired, reset
        if now.duration_since(entry.1) > self.window {
            *entry = (1, now);
            return true;
        }
        if entry.0 < self.max_attempts {
            entry.0 += 1;
            true
        } else {
            false
        }
    }

    /// Give back a reserved attempt that was neither a success nor a failure.
    pub async fn release(&self, ip: IpAddr) {
        let mut map = self.inner.lock().await;
        if let Some(entry) = map.get_mut(&ip) {
            entry.0 = entry.0.saturating_sub(1);
            if entry.0 == 0 {
                map.remove(&ip);
            }
        }
    }

    /// Forget the IP's attempts, e.g. after a successful authentication.
    pub async fn reset(&self, ip: IpAddr) {
        self.inner.lock().await.remove(&ip);
    }

    /// Clear expired entries to prevent unbounded growth.
    pub async fn cleanup(&self) {
        let mut map = self.inner.lock().await;
        let now = Instant::now();
        map.retain(|_, &mut (_, ts)| now.duration_since(ts) <= self.window);
    }

    pub async fn tracked(&self) -> usize {
        self.inner.lock().await.len()
    }
}
