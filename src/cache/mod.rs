//! Prediction-time caches, owned by a single service object built at startup
//! and shared by every request.
//!
//! * **Team stats**: `(date, home, away)` → composed four factors. Past stats
//!   never change, so entries never expire; the map is bounded and evicts the
//!   least recently used entry when full.
//! * **Injuries**: `team` → injury impact, fresh for one hour after the fetch.
//!   `invalidate_injuries` drops everything for an operator-triggered refresh
//!   and bumps a generation counter; a fetch that started before the refresh
//!   returns its result but does not store it.
//!
//! Each lookup takes the lock to check, releases it while computing on a
//! miss, and re-takes it to store the finished value. Two concurrent misses
//! for the same key both compute and the last write wins; readers only ever
//! see complete entries.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::Result;
use crate::features::FourFactors;
use crate::roster::InjuryImpact;

pub const INJURY_TTL_SECS: i64 = 60 * 60;

/// Source of "now" for TTL checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StatsKey {
    pub date: NaiveDate,
    pub home: String,
    pub away: String,
}

impl StatsKey {
    pub fn new(date: NaiveDate, home: &str, away: &str) -> Self {
        StatsKey {
            date,
            home: home.to_string(),
            away: away.to_string(),
        }
    }
}

/// Bounded map with least-recently-used eviction. Eviction scans for the
/// oldest stamp, which is fine at the few-thousand-entry sizes used here.
struct Lru<K, V> {
    entries: HashMap<K, (V, u64)>,
    capacity: usize,
    tick: u64,
}

impl<K: Eq + Hash + Clone, V: Clone> Lru<K, V> {
    fn new(capacity: usize) -> Self {
        Lru {
            entries: HashMap::new(),
            capacity: capacity.max(1),
            tick: 0,
        }
    }

    fn get(&mut self, key: &K) -> Option<V> {
        self.tick += 1;
        let tick = self.tick;
        self.entries.get_mut(key).map(|(value, stamp)| {
            *stamp = tick;
            value.clone()
        })
    }

    fn put(&mut self, key: K, value: V) {
        self.tick += 1;
        if !self.entries.contains_key(&key) && self.entries.len() >= self.capacity {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|(_, (_, stamp))| *stamp)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                self.entries.remove(&oldest);
            }
        }
        self.entries.insert(key, (value, self.tick));
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

struct InjuryEntry {
    impact: InjuryImpact,
    fetched_at: DateTime<Utc>,
}

#[derive(Default)]
struct InjuryTable {
    entries: HashMap<String, InjuryEntry>,
    generation: u64,
}

#[derive(Clone)]
pub struct PredictionCache {
    stats: Arc<Mutex<Lru<StatsKey, FourFactors>>>,
    injuries: Arc<Mutex<InjuryTable>>,
    injury_ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl PredictionCache {
    pub fn new(stats_capacity: usize) -> Self {
        Self::with_clock(stats_capacity, Arc::new(SystemClock))
    }

    pub fn with_clock(stats_capacity: usize, clock: Arc<dyn Clock>) -> Self {
        PredictionCache {
            stats: Arc::new(Mutex::new(Lru::new(stats_capacity))),
            injuries: Arc::new(Mutex::new(InjuryTable::default())),
            injury_ttl: Duration::seconds(INJURY_TTL_SECS),
            clock,
        }
    }

    /// Cached four factors for `key`, computing and storing them on a miss.
    pub fn team_stats<F>(&self, key: &StatsKey, compute: F) -> Result<FourFactors>
    where
        F: FnOnce() -> Result<FourFactors>,
    {
        if let Some(hit) = self.stats.lock().get(key) {
            debug!("Stats cache hit: {} {} vs {}", key.date, key.home, key.away);
            return Ok(hit);
        }
        debug!("Stats cache miss: {} {} vs {}", key.date, key.home, key.away);
        let factors = compute()?;
        self.stats.lock().put(key.clone(), factors);
        Ok(factors)
    }

    /// Cached injury impact for `team`; refetched once the entry is an hour old.
    pub fn injuries<F>(&self, team: &str, fetch: F) -> Result<InjuryImpact>
    where
        F: FnOnce() -> Result<InjuryImpact>,
    {
        let now = self.clock.now();
        let generation = {
            let table = self.injuries.lock();
            if let Some(entry) = table.entries.get(team) {
                if now - entry.fetched_at < self.injury_ttl {
                    return Ok(entry.impact.clone());
                }
            }
            table.generation
        };
        let impact = fetch()?;
        info!(
            "Refreshed injuries for {} ({} inactive)",
            team,
            impact.inactive.len()
        );
        let mut table = self.injuries.lock();
        if table.generation == generation {
            table.entries.insert(
                team.to_string(),
                InjuryEntry {
                    impact: impact.clone(),
                    fetched_at: now,
                },
            );
        } else {
            debug!("Injury cache cleared during fetch for {}, not storing", team);
        }
        Ok(impact)
    }

    /// Drop every cached injury entry.
    pub fn invalidate_injuries(&self) {
        let mut table = self.injuries.lock();
        let dropped = table.entries.len();
        table.entries.clear();
        table.generation += 1;
        info!("Injury cache cleared ({} entries)", dropped);
    }

    pub fn stats_len(&self) -> usize {
        self.stats.lock().len()
    }

    pub fn injuries_len(&self) -> usize {
        self.injuries.lock().entries.len()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::Clock;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use parking_lot::Mutex;

    pub struct ManualClock(Mutex<DateTime<Utc>>);

    impl Default for ManualClock {
        fn default() -> Self {
            Self::new()
        }
    }

    impl ManualClock {
        pub fn new() -> Self {
            let start = Utc.with_ymd_and_hms(2025, 4, 14, 12, 0, 0).unwrap();
            ManualClock(Mutex::new(start))
        }

        pub fn advance(&self, by: Duration) {
            *self.0.lock() += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock()
        }
    }
}
