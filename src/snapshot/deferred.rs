//! Compute-once cell for lazily produced values

use parking_lot::Mutex;
use std::fmt;
use std::sync::OnceLock;

type Producer<T> = Box<dyn FnOnce() -> T + Send>;

/// A value produced on first access and cached afterwards
///
/// The producer runs at most once even with concurrent readers: late readers
/// block until the first forcing completes, then all see the same value.
pub(crate) struct Deferred<T> {
    value: OnceLock<T>,
    producer: Mutex<Option<Producer<T>>>,
}

impl<T> Deferred<T> {
    /// Create a cell that runs `producer` on first access
    pub(crate) fn new(producer: impl FnOnce() -> T + Send + 'static) -> Self {
        Deferred {
            value: OnceLock::new(),
            producer: Mutex::new(Some(Box::new(producer))),
        }
    }

    /// Create a cell that is already forced
    pub(crate) fn ready(value: T) -> Self {
        Deferred {
            value: OnceLock::from(value),
            producer: Mutex::new(None),
        }
    }

    /// Get the value, running the producer if this is the first access
    pub(crate) fn get(&self) -> &T {
        self.value.get_or_init(|| {
            let producer = self
                .producer
                .lock()
                .take()
                .expect("deferred producer panicked during an earlier forcing");
            producer()
        })
    }

    /// Whether the value has been produced yet
    pub(crate) fn is_forced(&self) -> bool {
        self.value.get().is_some()
    }
}

impl<T: fmt::Debug> fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value.get() {
            Some(value) => value.fmt(f),
            None => f.write_str("<unforced>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_producer_runs_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let cell = Deferred::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            42
        });

        assert!(!cell.is_forced());
        assert_eq!(*cell.get(), 42);
        assert_eq!(*cell.get(), 42);
        assert!(cell.is_forced());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_concurrent_readers_share_one_forcing() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let cell = Arc::new(Deferred::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            thread::sleep(std::time::Duration::from_millis(20));
            vec![1, 2, 3]
        }));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cell = Arc::clone(&cell);
                thread::spawn(move || cell.get().clone())
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), vec![1, 2, 3]);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_ready_cell_is_forced() {
        let cell = Deferred::ready("done");
        assert!(cell.is_forced());
        assert_eq!(*cell.get(), "done");
        assert_eq!(format!("{:?}", cell), "\"done\"");
    }

    #[test]
    fn test_debug_does_not_force() {
        let cell: Deferred<u8> = Deferred::new(|| 1);
        assert_eq!(format!("{:?}", cell), "<unforced>");
        assert!(!cell.is_forced());
    }
}
