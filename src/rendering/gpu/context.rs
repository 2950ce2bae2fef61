use std::fmt::{Debug, Formatter};
use std::sync::{Arc, Mutex, PoisonError};

use crate::rendering::gpu::GpuDevice;

/// There is exactly one graphics context per process, whatever device is behind it.
static CONTEXT_LOCK: Mutex<()> = Mutex::new(());

/// Releases the context from the current thread when dropped, also while unwinding.
struct CurrentGuard<'a>(&'a dyn GpuDevice);

impl Drop for CurrentGuard<'_> {
    fn drop(&mut self) {
        self.0.release_current();
    }
}

/// Shared access to a [`GpuDevice`]. Cloning is cheap and clones may be moved to loader threads.
#[derive(Clone)]
pub struct GpuContext {
    device: Arc<dyn GpuDevice>,
}

impl Debug for GpuContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "GpuContext")
    }
}

impl GpuContext {
    pub fn new(device: Arc<dyn GpuDevice>) -> Self {
        Self { device }
    }

    /// Runs `f` while holding the process wide context lock, with the context bound to the calling
    /// thread. Must not be nested, the lock is not reentrant.
    pub fn with_device<R>(&self, f: impl FnOnce(&dyn GpuDevice) -> R) -> R {
        let _lock = CONTEXT_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        self.device.make_current();
        let _current = CurrentGuard(self.device.as_ref());
        f(self.device.as_ref())
    }
}
