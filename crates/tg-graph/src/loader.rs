//! Lazy Loader Runtime.
//!
//! `load()` is idempotent: on first call it runs the closure; on subsequent
//! calls it returns the recorded outcome (success or failure), and this
//! must stay safe under concurrent calls from multiple workers.
//!
//! `once_cell::sync::OnceCell` is the workspace's chosen initialize-once
//! primitive. The loader body is captured once at construction - when the
//! resolver installs the loader on a freshly inserted struct/interface/
//! instantiated-generic placeholder - and run at most once from inside
//! `OnceCell::get_or_init`, which blocks concurrent callers on the winning
//! thread's attempt rather than letting each run its own copy.

use std::fmt;
use std::sync::Mutex;

use once_cell::sync::OnceCell;

#[derive(Clone, Debug)]
pub struct LoadError(pub String);

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for LoadError {}

impl LoadError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

type Body<T> = dyn FnMut(u32) -> Result<T, LoadError> + Send;

/// One descriptor's one-shot heavy payload.
///
/// `T` is typically an `Arc<...Body>` so the cached value can be cheaply
/// handed back to every caller without re-cloning the payload itself.
pub struct Loader<T> {
    cell: OnceCell<Result<T, LoadError>>,
    body: Mutex<Option<Box<Body<T>>>>,
}

impl<T: Clone> Loader<T> {
    /// Installs `body` as this descriptor's lazy initializer. Not run yet -
    /// only `load` triggers it, and only once.
    pub fn new(body: impl FnMut(u32) -> Result<T, LoadError> + Send + 'static) -> Self {
        Self {
            cell: OnceCell::new(),
            body: Mutex::new(Some(Box::new(body))),
        }
    }

    /// Runs the installed body at most once across all callers, retrying a
    /// transient failure up to `max_retries` times before caching the final
    /// outcome.
    pub fn load(&self, max_retries: u32) -> Result<T, LoadError> {
        self.cell
            .get_or_init(|| {
                let mut guard = self.body.lock().expect("loader body lock poisoned");
                let mut body = guard
                    .take()
                    .expect("loader body already consumed outside get_or_init");
                drop(guard);

                let mut last = LoadError::new("loader body never invoked");
                for attempt in 0..=max_retries {
                    match body(attempt) {
                        Ok(value) => return Ok(value),
                        Err(err) => {
                            tracing::warn!(attempt, %err, "lazy loader attempt failed");
                            last = err;
                        }
                    }
                }
                tracing::error!(%last, retries = max_retries, "lazy loader exhausted retries");
                Err(last)
            })
            .clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }

    pub fn peek(&self) -> Option<&Result<T, LoadError>> {
        self.cell.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[test]
    fn runs_body_exactly_once_on_success() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = calls.clone();
        let loader: Loader<u32> = Loader::new(move |_| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
            Ok(7)
        });
        let a = loader.load(3);
        let b = loader.load(3);
        assert_eq!(a.unwrap(), 7);
        assert_eq!(b.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn retries_before_caching_final_failure() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = calls.clone();
        let loader: Loader<u32> = Loader::new(move |_| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
            Err(LoadError::new("transient"))
        });
        let result = loader.load(2);
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        let second = loader.load(2);
        assert!(second.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn succeeds_after_transient_failures_within_budget() {
        let loader: Loader<u32> = Loader::new(|attempt| {
            if attempt < 2 {
                Err(LoadError::new("transient"))
            } else {
                Ok(42)
            }
        });
        assert_eq!(loader.load(3).unwrap(), 42);
    }
}
