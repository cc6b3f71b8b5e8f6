//! Named lock helpers mapping poisoned locks to structured errors.

use crate::errors::{error_codes, InjectorError};
use std::sync::{Condvar, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

pub(crate) fn lock_mutex<'a, T>(
    mutex: &'a Mutex<T>,
    context: &'static str,
) -> Result<MutexGuard<'a, T>, InjectorError> {
    mutex.lock().map_err(|_| poisoned(context))
}

pub(crate) fn lock_read<'a, T>(
    lock: &'a RwLock<T>,
    context: &'static str,
) -> Result<RwLockReadGuard<'a, T>, InjectorError> {
    lock.read().map_err(|_| poisoned(context))
}

pub(crate) fn lock_write<'a, T>(
    lock: &'a RwLock<T>,
    context: &'static str,
) -> Result<RwLockWriteGuard<'a, T>, InjectorError> {
    lock.write().map_err(|_| poisoned(context))
}

pub(crate) fn wait_on<'a, T>(
    condvar: &Condvar,
    guard: MutexGuard<'a, T>,
    context: &'static str,
) -> Result<MutexGuard<'a, T>, InjectorError> {
    condvar.wait(guard).map_err(|_| poisoned(context))
}

fn poisoned(context: &'static str) -> InjectorError {
    InjectorError::instantiation(
        error_codes::LOCK_POISONED,
        format!("lock poisoned in {}", context),
    )
}
