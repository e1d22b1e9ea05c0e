//! Pool of reusable scratch objects shared by the scan workers.
//!
//! The [`Recycler`] tracks every instance it created in one of two lock-free maps:
//! checked out (handed to a worker) or available (reset and waiting for the next
//! [`Recycler::acquire`]). An instance id is in at most one map at any time, which is what
//! lets [`Recycler::release`] detect a double release or a handle from another pool
//! instead of silently handing one instance to two workers.
//!
//! # Lifecycle
//!
//! ```text
//!  acquire()            release()              force_close()
//!  ─────────► checked out ─────────► available ─────────────► closed
//!   (new or                (reset)               (close on every
//!    reused)                                      pooled instance)
//! ```
//!
//! # Examples
//!
//! ```rust
//! use jvmscope::{Recyclable, Recycler};
//!
//! #[derive(Default)]
//! struct Scratch(Vec<u8>);
//!
//! impl Recyclable for Scratch {
//!     fn reset(&mut self) { self.0.clear(); }
//!     fn close(&mut self) { self.0 = Vec::new(); }
//! }
//!
//! let recycler = Recycler::new(|| Ok(Scratch::default()));
//! let handle = recycler.acquire()?;
//! handle.lock().0.extend_from_slice(b"work");
//! recycler.release(handle.clone())?;
//!
//! // A second release of the same instance is rejected
//! assert!(recycler.release(handle).is_err());
//! # Ok::<(), jvmscope::Error>(())
//! ```

use std::{
    fmt,
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc, Mutex, MutexGuard,
    },
};

use crossbeam_skiplist::SkipMap;

use crate::{Error, Result};

/// An object that can be pooled by a [`Recycler`]
pub trait Recyclable: Send + 'static {
    /// Clear per-use state; called on every release
    fn reset(&mut self);

    /// Release held resources; called once when the recycler closes
    fn close(&mut self);
}

/// Handle to an instance checked out of a [`Recycler`].
///
/// Cloning the handle does not create a new instance; it exists so that misuse (releasing
/// the same instance twice) is expressible and can be rejected.
pub struct Recycled<T> {
    owner: Arc<()>,
    id: u64,
    instance: Arc<Mutex<T>>,
}

impl<T> Recycled<T> {
    /// Identifier of the instance within its pool
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Lock the instance for use
    pub fn lock(&self) -> MutexGuard<'_, T> {
        lock!(self.instance)
    }
}

impl<T> Clone for Recycled<T> {
    fn clone(&self) -> Self {
        Recycled {
            owner: self.owner.clone(),
            id: self.id,
            instance: self.instance.clone(),
        }
    }
}

impl<T> fmt::Debug for Recycled<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Recycled")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

type Factory<T> = Box<dyn Fn() -> Result<T> + Send + Sync>;

/// Lock-free multi-producer, multi-consumer object pool.
pub struct Recycler<T: Recyclable> {
    identity: Arc<()>,
    factory: Factory<T>,
    next_id: AtomicU64,
    checked_out: SkipMap<u64, Arc<Mutex<T>>>,
    available: SkipMap<u64, Arc<Mutex<T>>>,
    closed: AtomicBool,
}

impl<T: Recyclable> Recycler<T> {
    /// Create an empty pool that builds new instances with `factory`
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> Result<T> + Send + Sync + 'static,
    {
        Recycler {
            identity: Arc::new(()),
            factory: Box::new(factory),
            next_id: AtomicU64::new(0),
            checked_out: SkipMap::new(),
            available: SkipMap::new(),
            closed: AtomicBool::new(false),
        }
    }

    /// Take an available instance, or create one if none is available. Never blocks.
    ///
    /// # Errors
    /// Returns the factory's error if a new instance could not be created, and
    /// [`crate::Error::ConcurrencyInvariant`] if the recycler was closed.
    pub fn acquire(&self) -> Result<Recycled<T>> {
        if self.is_closed() {
            return Err(Error::ConcurrencyInvariant(
                "acquire from a closed recycler".to_string(),
            ));
        }

        let (id, instance) = match self.available.pop_front() {
            Some(entry) => (*entry.key(), entry.value().clone()),
            None => {
                let instance = Arc::new(Mutex::new((self.factory)()?));
                (self.next_id.fetch_add(1, Ordering::Relaxed), instance)
            }
        };
        self.checked_out.insert(id, instance.clone());

        // force_close may have drained checked_out before the insert
        if self.is_closed() {
            if self.checked_out.remove(&id).is_some() {
                lock!(instance).close();
            }
            return Err(Error::ConcurrencyInvariant(
                "acquire from a closed recycler".to_string(),
            ));
        }

        Ok(Recycled {
            owner: self.identity.clone(),
            id,
            instance,
        })
    }

    /// Reset a checked-out instance and make it available again.
    ///
    /// # Errors
    /// Returns [`crate::Error::ConcurrencyInvariant`] if the handle belongs to another pool,
    /// if the instance is not checked out (double release), or if the recycler was closed.
    pub fn release(&self, handle: Recycled<T>) -> Result<()> {
        if !Arc::ptr_eq(&handle.owner, &self.identity) {
            tracing::warn!("recycler rejected instance {} of another pool", handle.id);
            return Err(Error::ConcurrencyInvariant(format!(
                "instance {} belongs to another recycler",
                handle.id
            )));
        }

        if self.checked_out.remove(&handle.id).is_none() {
            let reason = if self.is_closed() {
                format!("release of instance {} after close", handle.id)
            } else {
                format!("instance {} is not checked out", handle.id)
            };
            tracing::warn!("recycler rejected release: {}", reason);
            return Err(Error::ConcurrencyInvariant(reason));
        }

        lock!(handle.instance).reset();
        if self.is_closed() {
            lock!(handle.instance).close();
            return Ok(());
        }
        self.available.insert(handle.id, handle.instance.clone());

        // force_close may have drained available before the insert
        if self.is_closed() && self.available.remove(&handle.id).is_some() {
            lock!(handle.instance).close();
        }
        Ok(())
    }

    /// Close the recycler: reclaim every checked-out instance, then close all pooled
    /// instances. Later releases and acquisitions are rejected.
    ///
    /// Returns the number of instances that were still checked out.
    pub fn force_close(&self) -> usize {
        self.closed.store(true, Ordering::Release);

        let mut reclaimed = 0;
        while let Some(entry) = self.checked_out.pop_front() {
            reclaimed += 1;
            lock!(entry.value()).close();
        }
        while let Some(entry) = self.available.pop_front() {
            lock!(entry.value()).close();
        }

        if reclaimed > 0 {
            tracing::debug!(
                "recycler reclaimed {} checked-out instances on close",
                reclaimed
            );
        }
        reclaimed
    }

    /// Returns `true` once [`Recycler::force_close`] was called
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Number of instances waiting in the pool
    #[must_use]
    pub fn available_count(&self) -> usize {
        self.available.len()
    }

    /// Number of instances handed out and not yet released
    #[must_use]
    pub fn checked_out_count(&self) -> usize {
        self.checked_out.len()
    }

    /// Number of instances created over the pool's lifetime
    #[must_use]
    pub fn created(&self) -> u64 {
        self.next_id.load(Ordering::Relaxed)
    }
}

impl<T: Recyclable> Drop for Recycler<T> {
    fn drop(&mut self) {
        if !self.is_closed() {
            self.force_close();
        }
    }
}

impl<T: Recyclable> fmt::Debug for Recycler<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Recycler")
            .field("available", &self.available.len())
            .field("checked_out", &self.checked_out.len())
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        sync::atomic::AtomicUsize,
        thread,
    };

    #[derive(Default)]
    struct Counter {
        uses: usize,
        resets: usize,
        closed: bool,
    }

    impl Recyclable for Counter {
        fn reset(&mut self) {
            self.resets += 1;
        }

        fn close(&mut self) {
            self.closed = true;
        }
    }

    fn recycler() -> Recycler<Counter> {
        Recycler::new(|| Ok(Counter::default()))
    }

    #[test]
    fn release_makes_instance_reusable() {
        let pool = recycler();

        let first = pool.acquire().unwrap();
        first.lock().uses += 1;
        let id = first.id();
        pool.release(first).unwrap();
        assert_eq!(pool.available_count(), 1);

        let again = pool.acquire().unwrap();
        assert_eq!(again.id(), id);
        assert_eq!(again.lock().uses, 1);
        assert_eq!(again.lock().resets, 1);
        assert_eq!(pool.created(), 1);
    }

    #[test]
    fn double_release_is_rejected() {
        let pool = recycler();
        let handle = pool.acquire().unwrap();

        pool.release(handle.clone()).unwrap();
        assert!(matches!(
            pool.release(handle),
            Err(Error::ConcurrencyInvariant(_))
        ));
        assert_eq!(pool.available_count(), 1);
    }

    #[test]
    fn foreign_release_is_rejected() {
        let a = recycler();
        let b = recycler();

        let handle = a.acquire().unwrap();
        assert!(matches!(
            b.release(handle.clone()),
            Err(Error::ConcurrencyInvariant(_))
        ));
        assert_eq!(a.checked_out_count(), 1);
        a.release(handle).unwrap();
    }

    #[test]
    fn factory_failure_leaves_pool_intact() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let pool = Recycler::new(move || {
            if counter.fetch_add(1, Ordering::SeqCst) == 1 {
                Err(Error::Error("factory exhausted".into()))
            } else {
                Ok(Counter::default())
            }
        });

        let first = pool.acquire().unwrap();
        assert!(pool.acquire().is_err());
        assert_eq!(pool.checked_out_count(), 1);
        pool.release(first).unwrap();
        assert!(pool.acquire().is_ok());
    }

    #[test]
    fn force_close_reclaims_checked_out() {
        let pool = recycler();
        let out = pool.acquire().unwrap();
        let back = pool.acquire().unwrap();
        pool.release(back.clone()).unwrap();

        assert_eq!(pool.force_close(), 1);
        assert!(pool.is_closed());
        assert!(out.lock().closed);
        assert!(back.lock().closed);
        assert_eq!(pool.checked_out_count(), 0);
        assert_eq!(pool.available_count(), 0);

        assert!(pool.release(out).is_err());
        assert!(pool.acquire().is_err());
    }

    struct Tracked {
        closes: Arc<AtomicUsize>,
    }

    impl Recyclable for Tracked {
        fn reset(&mut self) {}

        fn close(&mut self) {
            self.closes.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn close_racing_with_workers_closes_every_instance_once() {
        for _ in 0..20 {
            let closes = Arc::new(AtomicUsize::new(0));
            let counter = closes.clone();
            let pool = Arc::new(Recycler::new(move || {
                Ok(Tracked {
                    closes: counter.clone(),
                })
            }));

            let workers: Vec<_> = (0..4)
                .map(|_| {
                    let pool = pool.clone();
                    thread::spawn(move || {
                        for _ in 0..200 {
                            let Ok(item) = pool.acquire() else {
                                return;
                            };
                            if pool.release(item).is_err() {
                                return;
                            }
                        }
                    })
                })
                .collect();

            thread::yield_now();
            pool.force_close();
            for worker in workers {
                worker.join().unwrap();
            }

            assert_eq!(pool.checked_out_count(), 0);
            assert_eq!(pool.available_count(), 0);
            assert_eq!(closes.load(Ordering::SeqCst) as u64, pool.created());
        }
    }

    #[test]
    fn concurrent_acquire_release() {
        let pool = Arc::new(recycler());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let pool = pool.clone();
                thread::spawn(move || {
                    for _ in 0..100 {
                        let item = pool.acquire().unwrap();
                        item.lock().uses += 1;
                        pool.release(item).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(pool.checked_out_count(), 0);
        assert!(pool.created() <= 8);
        assert_eq!(pool.available_count() as u64, pool.created());
    }
}
