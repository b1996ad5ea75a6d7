//! Serialised access to the process environment.
//!
//! Configuration loading reads several variables as one snapshot while the
//! configuration tests rewrite them; both sides take the same mutex.

use std::env;
use std::sync::{Mutex, MutexGuard, PoisonError};

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn lock() -> MutexGuard<'static, ()> {
    ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Read `key`, treating unset, empty and non-Unicode values alike.
#[must_use]
pub fn non_empty_var(key: &str) -> Option<String> {
    let _guard = lock();
    env::var(key).ok().filter(|value| !value.is_empty())
}

/// Run `op` while the environment mutex is held.
///
/// Used for figment extraction, which reads every recognised variable.
pub fn with_lock<T, F>(op: F) -> T
where
    F: FnOnce() -> T,
{
    let _guard = lock();
    op()
}

#[cfg(test)]
pub(crate) use scoped::ScopedEnv;
