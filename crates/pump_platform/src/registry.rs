use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::host::WindowId;

/// Maps live window handles to the state of the manager that owns them.
///
/// The window procedure only receives a handle, so this is how it finds its way back to the
/// owning instance. Each call is one critical section; the lock is never held while user code
/// runs, so windows pumped on different threads only contend for the lookup itself.
#[derive(Debug)]
pub struct HandleRegistry<T> {
    windows: Mutex<HashMap<WindowId, Arc<T>>>,
}

impl<T> Default for HandleRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> HandleRegistry<T> {
    pub fn new() -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Insert the entry for a freshly created window.
    ///
    /// A handle is expected to be absent; if the OS recycled a handle whose entry was never
    /// removed, the new owner replaces the stale one.
    pub fn register(&self, window: WindowId, instance: Arc<T>) {
        if self.windows.lock().insert(window, instance).is_some() {
            log::warn!("window {window} was already registered; replacing stale entry");
        }
    }

    /// Look up the owner of `window`. `None` is a normal answer (foreign or already-removed
    /// handles).
    pub fn resolve(&self, window: WindowId) -> Option<Arc<T>> {
        self.windows.lock().get(&window).cloned()
    }

    /// Remove the entry for `window`, if any.
    pub fn unregister(&self, window: WindowId) -> Option<Arc<T>> {
        self.windows.lock().remove(&window)
    }

    pub fn contains(&self, window: WindowId) -> bool {
        self.windows.lock().contains_key(&window)
    }

    pub fn len(&self) -> usize {
        self.windows.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.lock().is_empty()
    }
}
