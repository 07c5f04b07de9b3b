//! Fixed set of lazily filled slots handed out to blocking callers

use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::{Mutex, MutexGuard};

/// A fixed number of lanes, each guarded by its own lock.
///
/// [`acquire`](Self::acquire) starts at a rotating offset and takes the first
/// free lane, so concurrent callers spread over distinct lanes. Only when
/// every lane is busy does it wait, on the lane it started from. Slots start
/// empty; the caller fills a slot the first time it lands on it.
pub(crate) struct LanePool<T> {
    lanes: Vec<Mutex<Option<T>>>,
    next: AtomicUsize,
}

impl<T> LanePool<T> {
    pub(crate) fn new(size: usize) -> Self {
        Self {
            lanes: (0..size).map(|_| Mutex::new(None)).collect(),
            next: AtomicUsize::new(0),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }

    /// Lock a lane, returning its index alongside the guard.
    ///
    /// Blocks the calling thread when all lanes are in use. Returns `None`
    /// only for an empty pool.
    pub(crate) fn acquire(&self) -> Option<(usize, MutexGuard<'_, Option<T>>)> {
        if self.lanes.is_empty() {
            return None;
        }
        let start = self.next.fetch_add(1, Ordering::Relaxed) % self.lanes.len();
        for offset in 0..self.lanes.len() {
            let index = (start + offset) % self.lanes.len();
            if let Some(guard) = self.lanes[index].try_lock() {
                return Some((index, guard));
            }
        }
        Some((start, self.lanes[start].lock()))
    }

    /// Take every filled slot out of the pool, waiting for lanes in use.
    pub(crate) fn drain(&self) -> Vec<T> {
        self.lanes.iter().filter_map(|lane| lane.lock().take()).collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Barrier};
    use std::thread;
    use std::time::Duration;

    use super::*;

    /// Run `workers` threads that each hold a lane for a while, returning the
    /// lanes they got and the highest number of lanes held at once.
    fn hold_lanes(pool: Arc<LanePool<u32>>, workers: usize) -> (Vec<usize>, usize) {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let start = Arc::new(Barrier::new(workers));

        let handles: Vec<_> = (0..workers)
            .map(|_| {
                let pool = Arc::clone(&pool);
                let in_flight = Arc::clone(&in_flight);
                let peak = Arc::clone(&peak);
                let start = Arc::clone(&start);
                thread::spawn(move || {
                    start.wait();
                    let (index, mut lane) = pool.acquire().unwrap();
                    lane.get_or_insert(0);
                    let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    thread::sleep(Duration::from_millis(100));
                    in_flight.fetch_sub(1, Ordering::SeqCst);
                    if let Some(uses) = lane.as_mut() {
                        *uses += 1;
                    }
                    index
                })
            })
            .collect();

        let mut lanes: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        lanes.sort_unstable();
        (lanes, peak.load(Ordering::SeqCst))
    }

    #[test]
    fn concurrent_callers_get_distinct_lanes() {
        let pool = Arc::new(LanePool::new(3));
        let (lanes, peak) = hold_lanes(Arc::clone(&pool), 3);

        assert_eq!(lanes, vec![0, 1, 2]);
        assert_eq!(peak, 3);
        assert_eq!(pool.drain(), vec![1, 1, 1]);
    }

    #[test]
    fn single_lane_serializes_callers() {
        let pool = Arc::new(LanePool::new(1));
        let (lanes, peak) = hold_lanes(Arc::clone(&pool), 3);

        assert_eq!(lanes, vec![0, 0, 0]);
        assert_eq!(peak, 1);
        assert_eq!(pool.drain(), vec![3]);
    }

    #[test]
    fn callers_beyond_pool_size_wait_for_a_lane() {
        let pool = Arc::new(LanePool::new(2));
        let (lanes, peak) = hold_lanes(Arc::clone(&pool), 5);

        assert_eq!(lanes.len(), 5);
        assert!(peak <= 2);
        assert_eq!(pool.drain().iter().sum::<u32>(), 5);
    }

    #[test]
    fn empty_pool_hands_out_nothing() {
        let pool: LanePool<u32> = LanePool::new(0);
        assert!(pool.is_empty());
        assert!(pool.acquire().is_none());
        assert!(pool.drain().is_empty());
    }

    #[test]
    fn drained_slots_start_empty_again() {
        let pool = LanePool::new(2);
        {
            let (_, mut lane) = pool.acquire().unwrap();
            *lane = Some("session");
        }
        assert_eq!(pool.drain(), vec!["session"]);
        let (_, lane) = pool.acquire().unwrap();
        assert!(lane.is_none());
    }
}
