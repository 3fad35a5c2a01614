//! Soft-TTL response cache.
//!
//! Bodies of successful, decodable responses are kept per request URL. A fresh
//! entry is served without touching the network; an expired one is only handed
//! back as [`Lookup::Stale`] so the caller can refetch and still fall back to it
//! when the store is unreachable. Entries older than [`STALE_FACTOR`] TTLs are
//! dropped, and the map never grows past its capacity.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use tokio::sync::Mutex;

/// Time source for cache freshness decisions.
pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    offset_ms: AtomicU64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset_ms: AtomicU64::new(0),
        }
    }

    pub fn advance(&self, by: Duration) {
        let ms = u64::try_from(by.as_millis()).unwrap_or(u64::MAX);
        self.offset_ms.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + Duration::from_millis(self.offset_ms.load(Ordering::SeqCst))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    Fresh(Bytes),
    Stale(Bytes),
    Miss,
}

#[derive(Debug)]
struct Entry {
    body: Bytes,
    stored_at: Instant,
}

/// How many TTLs an expired entry stays around as a stale-if-error fallback.
pub const STALE_FACTOR: u32 = 4;

pub const DEFAULT_CAPACITY: usize = 1024;

#[derive(Debug)]
pub struct ResponseCache {
    ttl: Duration,
    capacity: usize,
    clock: Arc<dyn Clock>,
    entries: Mutex<HashMap<String, Entry>>,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            capacity: DEFAULT_CAPACITY,
            clock,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Caps the number of kept entries (at least one).
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    fn stale_window(&self) -> Duration {
        self.ttl.saturating_mul(STALE_FACTOR)
    }

    pub async fn lookup(&self, key: &str) -> Lookup {
        if !self.is_enabled() {
            return Lookup::Miss;
        }
        let now = self.clock.now();
        let mut entries = self.entries.lock().await;
        let Some(entry) = entries.get(key) else {
            return Lookup::Miss;
        };
        let age = now.saturating_duration_since(entry.stored_at);
        if age < self.ttl {
            Lookup::Fresh(entry.body.clone())
        } else if age < self.stale_window() {
            Lookup::Stale(entry.body.clone())
        } else {
            entries.remove(key);
            Lookup::Miss
        }
    }

    pub async fn store(&self, key: &str, body: Bytes) {
        if !self.is_enabled() {
            return;
        }
        let now = self.clock.now();
        let window = self.stale_window();
        let mut entries = self.entries.lock().await;
        if !entries.contains_key(key) && entries.len() >= self.capacity {
            entries.retain(|_, e| now.saturating_duration_since(e.stored_at) < window);
            if entries.len() >= self.capacity {
                let oldest = entries
                    .iter()
                    .min_by_key(|(_, e)| e.stored_at)
                    .map(|(k, _)| k.clone());
                if let Some(oldest) = oldest {
                    entries.remove(&oldest);
                }
            }
        }
        entries.insert(
            key.to_string(),
            Entry {
                body,
                stored_at: now,
            },
        );
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache(ttl_secs: u64) -> (ResponseCache, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let cache = ResponseCache::with_clock(Duration::from_secs(ttl_secs), clock.clone());
        (cache, clock)
    }

    #[tokio::test]
    async fn serves_fresh_then_stale_after_ttl() {
        let (cache, clock) = cache(600);
        assert_eq!(cache.lookup("k").await, Lookup::Miss);

        cache.store("k", Bytes::from_static(b"{}")).await;
        clock.advance(Duration::from_secs(599));
        assert_eq!(cache.lookup("k").await, Lookup::Fresh(Bytes::from_static(b"{}")));

        clock.advance(Duration::from_secs(1));
        assert_eq!(cache.lookup("k").await, Lookup::Stale(Bytes::from_static(b"{}")));
    }

    #[tokio::test]
    async fn restoring_resets_age() {
        let (cache, clock) = cache(10);
        cache.store("k", Bytes::from_static(b"1")).await;
        clock.advance(Duration::from_secs(11));
        cache.store("k", Bytes::from_static(b"2")).await;
        assert_eq!(cache.lookup("k").await, Lookup::Fresh(Bytes::from_static(b"2")));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn zero_ttl_disables_cache() {
        let (cache, _clock) = cache(0);
        assert!(!cache.is_enabled());
        cache.store("k", Bytes::from_static(b"x")).await;
        assert_eq!(cache.lookup("k").await, Lookup::Miss);
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn entries_past_the_stale_window_are_dropped() {
        let (cache, clock) = cache(10);
        cache.store("k", Bytes::from_static(b"x")).await;
        clock.advance(Duration::from_secs(39));
        assert_eq!(cache.lookup("k").await, Lookup::Stale(Bytes::from_static(b"x")));

        clock.advance(Duration::from_secs(1));
        assert_eq!(cache.lookup("k").await, Lookup::Miss);
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn size_stays_within_capacity() {
        let (cache, clock) = cache(60);
        let cache = cache.with_capacity(8);
        for i in 0..50 {
            cache.store(&format!("junk-{i}"), Bytes::from_static(b"null")).await;
            clock.advance(Duration::from_millis(10));
        }
        assert_eq!(cache.len().await, 8);
        // Oldest keys went first.
        assert_eq!(cache.lookup("junk-0").await, Lookup::Miss);
        assert!(matches!(cache.lookup("junk-49").await, Lookup::Fresh(_)));
    }

    #[tokio::test]
    async fn full_cache_sweeps_dead_entries_before_evicting_live_ones() {
        let (cache, clock) = cache(10);
        let cache = cache.with_capacity(2);
        cache.store("old", Bytes::from_static(b"1")).await;
        clock.advance(Duration::from_secs(35));
        cache.store("live", Bytes::from_static(b"2")).await;
        clock.advance(Duration::from_secs(5));
        cache.store("new", Bytes::from_static(b"3")).await;

        assert_eq!(cache.len().await, 2);
        assert!(matches!(cache.lookup("live").await, Lookup::Stale(_) | Lookup::Fresh(_)));
        assert_eq!(cache.lookup("old").await, Lookup::Miss);
    }

    #[tokio::test]
    async fn keys_are_independent() {
        let (cache, _clock) = cache(60);
        cache.store("a", Bytes::from_static(b"a")).await;
        assert_eq!(cache.lookup("b").await, Lookup::Miss);
    }
}
