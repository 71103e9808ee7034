//! Client-side rate limiting for search requests
//!
//! A token bucket per key (the client uses the index name) keeps a burst of
//! keystrokes from exhausting the search plan's request quota.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

/// Rate limiter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Maximum requests per window
    pub max_requests: u32,
    /// Time window duration
    pub window: Duration,
    /// Burst allowance (extra requests allowed in short bursts)
    pub burst: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self::per_second(50)
    }
}

impl RateLimitConfig {
    /// Per-second rate limit
    #[must_use]
    pub fn per_second(max: u32) -> Self {
        Self {
            max_requests: max,
            window: Duration::from_secs(1),
            burst: max / 2,
        }
    }

    /// Per-minute rate limit
    #[must_use]
    pub fn per_minute(max: u32) -> Self {
        Self {
            max_requests: max,
            window: Duration::from_secs(60),
            burst: max / 4,
        }
    }

    fn capacity(&self) -> f64 {
        f64::from(self.max_requests + self.burst)
    }

    fn refill_rate(&self) -> f64 {
        f64::from(self.max_requests) / self.window.as_secs_f64()
    }
}

#[derive(Debug)]
struct TokenBucket {
    tokens: f64,
    last_update: Instant,
}

impl TokenBucket {
    fn new(config: &RateLimitConfig) -> Self {
        Self {
            tokens: config.capacity(),
            last_update: Instant::now(),
        }
    }

    fn refill(&mut self, config: &RateLimitConfig) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_update).as_secs_f64();
        self.tokens = (self.tokens + elapsed * config.refill_rate()).min(config.capacity());
        self.last_update = now;
    }
}

/// Rate limiter with one bucket per key
pub struct RateLimiter {
    buckets: Arc<RwLock<HashMap<String, TokenBucket>>>,
    config: RateLimitConfig,
}

impl RateLimiter {
    /// Create a new rate limiter
    #[must_use]
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            buckets: Arc::new(RwLock::new(HashMap::new())),
            config,
        }
    }

    fn with_bucket<R>(&self, key: &str, f: impl FnOnce(&mut TokenBucket, &RateLimitConfig) -> R) -> R {
        // A poisoned lock still guards valid counters
        let mut buckets = self.buckets.write().unwrap_or_else(|e| e.into_inner());
        let bucket = buckets
            .entry(key.to_string())
            .or_insert_with(|| TokenBucket::new(&self.config));
        bucket.refill(&self.config);
        f(bucket, &self.config)
    }

    /// Try to take one token for the given key
    #[must_use]
    pub fn try_acquire(&self, key: &str) -> bool {
        self.with_bucket(key, |bucket, _| {
            if bucket.tokens >= 1.0 {
                bucket.tokens -= 1.0;
                true
            } else {
                false
            }
        })
    }

    /// Time until a token is available for the key
    #[must_use]
    pub fn time_until_available(&self, key: &str) -> Duration {
        self.with_bucket(key, |bucket, config| {
            if bucket.tokens >= 1.0 {
                Duration::ZERO
            } else {
                Duration::from_secs_f64((1.0 - bucket.tokens) / config.refill_rate())
            }
        })
    }

    /// Get rate limit status for a key
    #[must_use]
    pub fn status(&self, key: &str) -> RateLimitStatus {
        self.with_bucket(key, |bucket, config| RateLimitStatus {
            available: bucket.tokens as u32,
            max: config.max_requests + config.burst,
        })
    }

    /// Reset rate limit for a key
    pub fn reset(&self, key: &str) {
        let mut buckets = self.buckets.write().unwrap_or_else(|e| e.into_inner());
        buckets.remove(key);
    }
}

/// Rate limit status
#[derive(Debug, Clone, Serialize)]
pub struct RateLimitStatus {
    /// Available tokens
    pub available: u32,
    /// Maximum tokens
    pub max: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strict(max_requests: u32) -> RateLimitConfig {
        RateLimitConfig {
            max_requests,
            window: Duration::from_secs(60),
            burst: 0,
        }
    }

    #[test]
    fn test_rate_limiter_basic() {
        let limiter = RateLimiter::new(strict(3));

        assert!(limiter.try_acquire("product_recalls"));
        assert!(limiter.try_acquire("product_recalls"));
        assert!(limiter.try_acquire("product_recalls"));
        assert!(!limiter.try_acquire("product_recalls"));
        assert!(limiter.time_until_available("product_recalls") > Duration::ZERO);
    }

    #[test]
    fn test_rate_limiter_with_burst() {
        let limiter = RateLimiter::new(RateLimitConfig {
            max_requests: 2,
            window: Duration::from_secs(60),
            burst: 2,
        });

        for _ in 0..4 {
            assert!(limiter.try_acquire("idx"));
        }
        assert!(!limiter.try_acquire("idx"));
    }

    #[test]
    fn test_rate_limiter_different_keys() {
        let limiter = RateLimiter::new(strict(1));

        assert!(limiter.try_acquire("recalls_en"));
        assert!(!limiter.try_acquire("recalls_en"));
        assert!(limiter.try_acquire("recalls_fr"));
    }

    #[test]
    fn test_rate_limiter_reset() {
        let limiter = RateLimiter::new(strict(1));

        assert!(limiter.try_acquire("idx"));
        assert!(!limiter.try_acquire("idx"));

        limiter.reset("idx");
        assert!(limiter.try_acquire("idx"));
    }

    #[test]
    fn test_status() {
        let limiter = RateLimiter::new(RateLimitConfig {
            max_requests: 10,
            window: Duration::from_secs(60),
            burst: 5,
        });

        let status = limiter.status("idx");
        assert_eq!(status.max, 15);
        assert_eq!(status.available, 15);
    }
}
