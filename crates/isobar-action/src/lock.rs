//! A re-entrant critical section.
//!
//! Building a stage runs its builder, which usually builds the stage's
//! successor through the same registry before returning. The registry's
//! critical section must therefore admit the thread that already holds it.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};

/// Mutual exclusion between threads, re-entrant within one thread.
#[derive(Debug, Default)]
pub(crate) struct ReentrantLock {
    /// Owning thread and its acquisition depth.
    owner: Mutex<Option<(ThreadId, usize)>>,
    released: Condvar,
}

/// Holds one level of a [`ReentrantLock`] until dropped.
#[derive(Debug)]
pub(crate) struct ReentrantGuard<'a> {
    lock: &'a ReentrantLock,
}

impl ReentrantLock {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Block until the calling thread owns the section.
    pub(crate) fn lock(&self) -> ReentrantGuard<'_> {
        let me = thread::current().id();
        let mut state = self.state();
        loop {
            match *state {
                Some((owner, depth)) if owner == me => {
                    *state = Some((owner, depth + 1));
                    break;
                }
                Some(_) => {}
                None => {
                    *state = Some((me, 1));
                    break;
                }
            }
            state = self
                .released
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        ReentrantGuard { lock: self }
    }

    /// Acquisition depth held by the calling thread (0 if it holds none).
    pub(crate) fn depth(&self) -> usize {
        let me = thread::current().id();
        match *self.state() {
            Some((owner, depth)) if owner == me => depth,
            _ => 0,
        }
    }

    fn state(&self) -> MutexGuard<'_, Option<(ThreadId, usize)>> {
        self.owner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for ReentrantGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.lock.state();
        if let Some((owner, depth)) = *state {
            if depth > 1 {
                *state = Some((owner, depth - 1));
            } else {
                *state = None;
                self.lock.released.notify_one();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn same_thread_reenters() {
        let lock = ReentrantLock::new();
        let outer = lock.lock();
        {
            let _inner = lock.lock();
            assert_eq!(lock.depth(), 2);
        }
        assert_eq!(lock.depth(), 1);
        drop(outer);
        assert_eq!(lock.depth(), 0);
    }

    #[test]
    fn other_thread_waits_for_full_release() {
        let lock = Arc::new(ReentrantLock::new());
        let entered = Arc::new(AtomicBool::new(false));

        let outer = lock.lock();
        let inner = lock.lock();

        let handle = {
            let lock = lock.clone();
            let entered = entered.clone();
            thread::spawn(move || {
                let _guard = lock.lock();
                entered.store(true, Ordering::SeqCst);
            })
        };

        drop(inner);
        thread::sleep(Duration::from_millis(20));
        assert!(!entered.load(Ordering::SeqCst));

        drop(outer);
        handle.join().unwrap();
        assert!(entered.load(Ordering::SeqCst));
    }
}
