//! In-flight call tracking.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::OnceCell;
use tracing::debug;

use crate::error::Result;

/// One load in progress. Waiters block on the cell, not on the map lock.
type Call<T> = Arc<OnceCell<Result<T>>>;

type Calls<T> = Mutex<HashMap<String, Call<T>>>;

fn lock<T>(calls: &Calls<T>) -> MutexGuard<'_, HashMap<String, Call<T>>> {
    calls.lock().unwrap_or_else(PoisonError::into_inner)
}

// == Call Guard ==
/// Drops a finished call from the map when its caller goes away, whether
/// `run` returned or its future was cancelled.
///
/// An unfinished call is left in place: a remaining or later caller picks up
/// the load through the cell.
struct CallGuard<'a, T> {
    calls: &'a Calls<T>,
    key: &'a str,
    call: Call<T>,
}

impl<T> Drop for CallGuard<'_, T> {
    fn drop(&mut self) {
        if !self.call.initialized() {
            return;
        }
        let mut calls = lock(self.calls);
        if calls
            .get(self.key)
            .is_some_and(|current| Arc::ptr_eq(current, &self.call))
        {
            calls.remove(self.key);
        }
    }
}

// == Flight ==
/// Per-key duplicate suppression for concurrent loads.
///
/// The map lock is held only to look up, insert or remove a call and never
/// across an await; the load itself runs outside it, so unrelated keys never
/// queue behind one slow load.
#[derive(Debug)]
pub struct Flight<T> {
    calls: Calls<T>,
}

impl<T> Default for Flight<T> {
    fn default() -> Self {
        Self {
            calls: Mutex::new(HashMap::new()),
        }
    }
}

impl<T: Clone> Flight<T> {
    pub fn new() -> Self {
        Self::default()
    }

    // == Run ==
    /// Runs `load` for `key` unless a load for `key` is already in flight, in
    /// which case this waits for it and returns its result.
    ///
    /// Every caller sharing a call observes the same value or the same error.
    /// Failed loads are not retried here.
    pub async fn run<F, Fut>(&self, key: &str, load: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let call = Arc::clone(lock(&self.calls).entry(key.to_string()).or_default());
        let guard = CallGuard {
            calls: &self.calls,
            key,
            call,
        };

        let mut leader = false;
        let result = guard
            .call
            .get_or_init(|| {
                leader = true;
                load()
            })
            .await
            .clone();

        if !leader {
            debug!("Joined in-flight load for key '{}'", key);
        }
        drop(guard);

        result
    }

    // == In Flight ==
    /// Number of keys with a load currently in progress.
    pub fn in_flight(&self) -> usize {
        lock(&self.calls).len()
    }
}
