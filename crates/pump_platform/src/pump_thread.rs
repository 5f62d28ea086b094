use std::sync::{Arc, mpsc};
use std::thread::{self, JoinHandle};

use crate::error::{PumpError, Result};
use crate::host::WindowId;
use crate::manager::WindowManager;
use crate::traits::MessageWindowBackend;

const THREAD_NAME: &str = "message-pump";

/// A message loop running on its own thread.
///
/// Dropping the handle stops the loop and waits for the thread, so the window is gone and its
/// registry entry removed by the time the drop returns.
pub struct PumpThread<B: MessageWindowBackend> {
    manager: Arc<WindowManager<B>>,
    handle: Option<JoinHandle<Result<()>>>,
}

impl<B: MessageWindowBackend> PumpThread<B> {
    /// Start `manager` on a new thread and wait until its loop is running.
    pub(crate) fn spawn(manager: Arc<WindowManager<B>>) -> Result<Self> {
        let (ready_tx, ready_rx) = mpsc::channel::<()>();
        let loop_manager = Arc::clone(&manager);

        let handle = thread::Builder::new()
            .name(THREAD_NAME.to_string())
            .spawn(move || {
                loop_manager.run(move || {
                    let _ = ready_tx.send(());
                })
            })
            .map_err(|e| PumpError::Spawn(e.to_string()))?;

        if ready_rx.recv().is_ok() {
            return Ok(Self {
                manager,
                handle: Some(handle),
            });
        }

        // The sender was dropped before the window existed: `start` failed or panicked.
        match handle.join() {
            Ok(Ok(())) => Err(PumpError::Spawn(
                "message loop exited before it was running".to_string(),
            )),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(PumpError::Spawn("message loop thread panicked".to_string())),
        }
    }

    pub fn manager(&self) -> &Arc<WindowManager<B>> {
        &self.manager
    }

    #[inline]
    pub fn window_handle(&self) -> WindowId {
        self.manager.window_handle()
    }

    /// Request the loop to end without waiting for it.
    pub fn stop(&self) {
        self.manager.stop();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Stop the loop and wait for its thread, returning what `start` returned.
    pub fn join(mut self) -> Result<()> {
        self.stop_and_join()
    }

    fn stop_and_join(&mut self) -> Result<()> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };
        self.manager.stop();
        handle
            .join()
            .map_err(|_| PumpError::Spawn("message loop thread panicked".to_string()))?
    }
}

impl<B: MessageWindowBackend> Drop for PumpThread<B> {
    fn drop(&mut self) {
        if let Err(e) = self.stop_and_join() {
            log::warn!("message loop ended with an error: {e}");
        }
    }
}
