//! Generation-tagged resolution cache with single-flight computation.
//!
//! Entries remember the configuration generation they were computed under.
//! A lookup under a newer generation treats the entry as absent and
//! recomputes; nothing is purged eagerly. At most one computation runs per
//! key and generation, concurrent requesters block until it finishes and
//! share its result.

use crate::types::ResolutionResult;
use parking_lot::{Condvar, Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;

/// A cached resolution and the generation it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub result: ResolutionResult,
    pub generation: u64,
}

enum FlightState {
    Running,
    Finished(ResolutionResult),
    /// The computing caller unwound before producing a result.
    Abandoned,
}

/// A computation in progress for one key.
struct InFlight {
    generation: u64,
    state: Mutex<FlightState>,
    done: Condvar,
}

impl InFlight {
    fn new(generation: u64) -> Self {
        Self {
            generation,
            state: Mutex::new(FlightState::Running),
            done: Condvar::new(),
        }
    }

    fn complete(&self, state: FlightState) {
        *self.state.lock() = state;
        self.done.notify_all();
    }

    /// Block until the computation ends. `None` if it was abandoned.
    fn wait(&self) -> Option<ResolutionResult> {
        let mut state = self.state.lock();
        loop {
            match &*state {
                FlightState::Finished(result) => return Some(result.clone()),
                FlightState::Abandoned => return None,
                FlightState::Running => {}
            }
            self.done.wait(&mut state);
        }
    }
}

enum Slot {
    Ready(CacheEntry),
    Pending(Arc<InFlight>),
}

/// What a lookup found in the map.
enum Lookup {
    Hit(ResolutionResult),
    Wait(Arc<InFlight>),
    /// Cache holds a newer generation than the caller's snapshot.
    Superseded,
    Miss,
}

/// Memoizes block identifier -> [`ResolutionResult`].
#[derive(Default)]
pub struct TextureCache {
    slots: RwLock<HashMap<String, Slot>>,
}

impl TextureCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached result for `key` under `generation`, computing it at most once.
    ///
    /// `compute` runs on the calling thread without any cache lock held.
    pub fn get_or_compute<F>(&self, key: &str, generation: u64, compute: F) -> ResolutionResult
    where
        F: FnOnce() -> ResolutionResult,
    {
        let mut compute = Some(compute);

        loop {
            let found = lookup(&self.slots.read(), key, generation);
            let flight = match found {
                Lookup::Hit(result) => return result,
                Lookup::Wait(flight) => match flight.wait() {
                    Some(result) => return result,
                    None => continue,
                },
                Lookup::Superseded => return run(&mut compute),
                Lookup::Miss => {
                    let mut slots = self.slots.write();
                    match lookup(&slots, key, generation) {
                        Lookup::Hit(result) => return result,
                        Lookup::Wait(flight) => {
                            drop(slots);
                            match flight.wait() {
                                Some(result) => return result,
                                None => continue,
                            }
                        }
                        Lookup::Superseded => {
                            drop(slots);
                            return run(&mut compute);
                        }
                        Lookup::Miss => {
                            let flight = Arc::new(InFlight::new(generation));
                            slots.insert(key.to_string(), Slot::Pending(Arc::clone(&flight)));
                            flight
                        }
                    }
                }
            };

            let mut guard = FlightGuard {
                cache: self,
                key,
                flight,
                finished: false,
            };
            let result = run(&mut compute);
            guard.finish(result.clone());
            return result;
        }
    }

    /// Cached entry for `key`, regardless of generation.
    pub fn peek(&self, key: &str) -> Option<CacheEntry> {
        match self.slots.read().get(key) {
            Some(Slot::Ready(entry)) => Some(entry.clone()),
            _ => None,
        }
    }

    /// Discard all entries. Computations still in flight deliver their
    /// result to their waiters but do not repopulate the cache.
    pub fn clear(&self) {
        self.slots.write().clear();
    }

    /// Number of keys held, including stale and in-flight ones.
    pub fn len(&self) -> usize {
        self.slots.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.read().is_empty()
    }
}

fn lookup(slots: &HashMap<String, Slot>, key: &str, generation: u64) -> Lookup {
    match slots.get(key) {
        Some(Slot::Ready(entry)) if entry.generation == generation => {
            Lookup::Hit(entry.result.clone())
        }
        Some(Slot::Pending(flight)) if flight.generation == generation => {
            Lookup::Wait(Arc::clone(flight))
        }
        Some(Slot::Ready(CacheEntry { generation: cached, .. })) if *cached > generation => {
            Lookup::Superseded
        }
        Some(Slot::Pending(flight)) if flight.generation > generation => Lookup::Superseded,
        _ => Lookup::Miss,
    }
}

fn run<F: FnOnce() -> ResolutionResult>(compute: &mut Option<F>) -> ResolutionResult {
    // Each call path above runs `compute` at most once before returning
    match compute.take() {
        Some(f) => f(),
        None => unreachable!("compute invoked twice"),
    }
}

/// Publishes the result of a computation, or releases waiters if the computing
/// caller unwinds.
struct FlightGuard<'a> {
    cache: &'a TextureCache,
    key: &'a str,
    flight: Arc<InFlight>,
    finished: bool,
}

impl FlightGuard<'_> {
    fn finish(&mut self, result: ResolutionResult) {
        {
            let mut slots = self.cache.slots.write();
            // A clear() or a newer generation may have replaced our slot
            if let Some(Slot::Pending(current)) = slots.get(self.key) {
                if Arc::ptr_eq(current, &self.flight) {
                    slots.insert(
                        self.key.to_string(),
                        Slot::Ready(CacheEntry {
                            result: result.clone(),
                            generation: self.flight.generation,
                        }),
                    );
                }
            }
        }
        self.flight.complete(FlightState::Finished(result));
        self.finished = true;
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        {
            let mut slots = self.cache.slots.write();
            if let Some(Slot::Pending(current)) = slots.get(self.key) {
                if Arc::ptr_eq(current, &self.flight) {
                    slots.remove(self.key);
                }
            }
        }
        self.flight.complete(FlightState::Abandoned);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;
    use std::thread;
    use std::time::Duration;

    fn resolved(pack: &str) -> ResolutionResult {
        ResolutionResult::Resolved {
            pack: pack.to_string(),
            path: PathBuf::from(format!("textures/{}/stone.png", pack)),
            size: 16,
        }
    }

    #[test]
    fn test_hit_skips_compute() {
        let cache = TextureCache::new();
        assert_eq!(cache.get_or_compute("stone", 1, || resolved("A")), resolved("A"));
        let result = cache.get_or_compute("stone", 1, || panic!("should be cached"));
        assert_eq!(result, resolved("A"));
        assert_eq!(
            cache.peek("stone"),
            Some(CacheEntry { result: resolved("A"), generation: 1 })
        );
    }

    #[test]
    fn test_stale_generation_recomputes() {
        let cache = TextureCache::new();
        cache.get_or_compute("stone", 1, || resolved("A"));
        let result = cache.get_or_compute("stone", 2, || resolved("B"));
        assert_eq!(result, resolved("B"));
        assert_eq!(cache.peek("stone").unwrap().generation, 2);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_older_generation_does_not_overwrite() {
        let cache = TextureCache::new();
        cache.get_or_compute("stone", 2, || resolved("B"));
        let result = cache.get_or_compute("stone", 1, || resolved("A"));
        assert_eq!(result, resolved("A"));
        assert_eq!(cache.peek("stone").unwrap().result, resolved("B"));
    }

    #[test]
    fn test_absence_is_cached() {
        let cache = TextureCache::new();
        cache.get_or_compute("glass", 1, || ResolutionResult::NotFound);
        let result = cache.get_or_compute("glass", 1, || panic!("should be cached"));
        assert_eq!(result, ResolutionResult::NotFound);
    }

    #[test]
    fn test_clear() {
        let cache = TextureCache::new();
        cache.get_or_compute("stone", 1, || resolved("A"));
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.get_or_compute("stone", 1, || resolved("B")), resolved("B"));
    }

    #[test]
    fn test_single_flight() {
        const THREADS: usize = 16;
        let cache = Arc::new(TextureCache::new());
        let computations = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(Barrier::new(THREADS));

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let computations = Arc::clone(&computations);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    cache.get_or_compute("stone", 1, || {
                        computations.fetch_add(1, Ordering::SeqCst);
                        thread::sleep(Duration::from_millis(50));
                        resolved("A")
                    })
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), resolved("A"));
        }
        assert_eq!(computations.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_panicking_compute_releases_key() {
        let cache = Arc::new(TextureCache::new());

        let panicking = {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                cache.get_or_compute("stone", 1, || panic!("lookup exploded"));
            })
        };
        assert!(panicking.join().is_err());

        assert!(cache.is_empty());
        assert_eq!(cache.get_or_compute("stone", 1, || resolved("A")), resolved("A"));
    }

    #[test]
    fn test_waiter_recomputes_after_panic() {
        let cache = Arc::new(TextureCache::new());
        let computations = Arc::new(AtomicUsize::new(0));
        let started = Arc::new(Barrier::new(2));

        let panicking = {
            let cache = Arc::clone(&cache);
            let computations = Arc::clone(&computations);
            let started = Arc::clone(&started);
            thread::spawn(move || {
                cache.get_or_compute("stone", 1, || {
                    computations.fetch_add(1, Ordering::SeqCst);
                    started.wait();
                    // Give the waiter time to block on this computation
                    thread::sleep(Duration::from_millis(100));
                    panic!("lookup exploded")
                });
            })
        };

        started.wait();
        let result = cache.get_or_compute("stone", 1, || {
            computations.fetch_add(1, Ordering::SeqCst);
            resolved("B")
        });

        assert!(panicking.join().is_err());
        assert_eq!(result, resolved("B"));
        assert_eq!(computations.load(Ordering::SeqCst), 2);
        assert_eq!(cache.peek("stone").unwrap().result, resolved("B"));
    }
}
