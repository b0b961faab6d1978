use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::debug;

static INPUT_DEVICE: Mutex<()> = Mutex::new(());

/// Exclusive use of the system pointer and keyboard.
///
/// Synthetic input goes into one system-wide queue, so two sequences typing at
/// the same time would interleave their keystrokes. Whoever holds the lease owns
/// the devices; dropping it (on any path, including unwinding) releases them.
pub struct InputLease {
    _guard: MutexGuard<'static, ()>,
}

impl InputLease {
    /// Block until the input devices are free
    pub fn acquire() -> Self {
        let guard = INPUT_DEVICE
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        debug!(target: "input", "Input lease acquired");
        Self { _guard: guard }
    }

    #[cfg(test)]
    fn try_acquire() -> Option<Self> {
        use std::sync::TryLockError;

        match INPUT_DEVICE.try_lock() {
            Ok(guard) => Some(Self { _guard: guard }),
            Err(TryLockError::Poisoned(poisoned)) => Some(Self {
                _guard: poisoned.into_inner(),
            }),
            Err(TryLockError::WouldBlock) => None,
        }
    }
}

impl Drop for InputLease {
    fn drop(&mut self) {
        debug!(target: "input", "Input lease released");
    }
}
