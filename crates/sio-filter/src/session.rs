use std::sync::atomic::{AtomicU32, Ordering};

/// Counts loads within one interactive session.
///
/// A session starts with [`reset`](Self::reset); the first
/// [`increment`](Self::increment) afterwards returns 1, so handlers can tell
/// the first file of a batch from the following ones.
#[derive(Debug, Default)]
pub struct SessionCounter {
    count: AtomicU32,
}

impl SessionCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new session.
    pub fn reset(&self) {
        self.count.store(0, Ordering::SeqCst);
    }

    /// Bump the counter and return the new value.
    pub fn increment(&self) -> u32 {
        self.count.fetch_add(1, Ordering::SeqCst).wrapping_add(1)
    }

    /// Current value without bumping it.
    pub fn current(&self) -> u32 {
        self.count.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_from_one_after_reset() {
        let counter = SessionCounter::new();
        counter.increment();
        counter.increment();

        counter.reset();
        assert_eq!(counter.current(), 0);
        let values: Vec<u32> = (0..4).map(|_| counter.increment()).collect();
        assert_eq!(values, vec![1, 2, 3, 4]);
    }

    #[test]
    fn concurrent_increments_are_unique() {
        let counter = std::sync::Arc::new(SessionCounter::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let counter = counter.clone();
                std::thread::spawn(move || (0..100).map(|_| counter.increment()).collect::<Vec<_>>())
            })
            .collect();

        let mut all: Vec<u32> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        all.sort_unstable();
        assert_eq!(all, (1..=400).collect::<Vec<_>>());
    }
}
