use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::config::WindowConfig;
use crate::error::{PumpError, Result};
use crate::host::{MessageCallback, WindowId, WindowMessage};
use crate::pump_thread::PumpThread;
use crate::traits::MessageWindowBackend;

/// Lifecycle of a [`WindowManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// No native window.
    Idle,
    /// `start` is creating the window.
    Starting,
    /// The loop is dispatching on the thread that called `start`.
    Running,
    /// Stop signal posted; the loop is draining its queue.
    StopRequested,
}

/// Per-instance state reachable from the window procedure through the handle registry.
pub struct WindowState {
    window: AtomicUsize,
    stop_requested: AtomicBool,
    stop_message: u32,
    callback: Arc<dyn MessageCallback>,
    phase: Mutex<Phase>,
    phase_changed: Condvar,
}

impl WindowState {
    fn new(callback: Arc<dyn MessageCallback>, stop_message: u32) -> Self {
        Self {
            window: AtomicUsize::new(0),
            stop_requested: AtomicBool::new(false),
            stop_message,
            callback,
            phase: Mutex::new(Phase::Idle),
            phase_changed: Condvar::new(),
        }
    }

    #[inline]
    pub fn window(&self) -> WindowId {
        WindowId::from_raw(self.window.load(Ordering::SeqCst))
    }

    #[inline]
    pub fn stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::SeqCst)
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        *self.phase.lock()
    }

    fn set_window(&self, window: WindowId) {
        self.window.store(window.raw(), Ordering::SeqCst);
    }

    fn set_phase(&self, phase: Phase) {
        *self.phase.lock() = phase;
        self.phase_changed.notify_all();
    }

    fn wait_for(&self, timeout: Duration, done: impl Fn(Phase) -> bool) -> bool {
        let mut phase = self.phase.lock();
        // No representable deadline: wait without one.
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            while !done(*phase) {
                self.phase_changed.wait(&mut phase);
            }
            return true;
        };
        while !done(*phase) {
            if self.phase_changed.wait_until(&mut phase, deadline).timed_out() {
                return done(*phase);
            }
        }
        true
    }
}

impl fmt::Debug for WindowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindowState")
            .field("window", &self.window())
            .field("stop_requested", &self.stop_requested())
            .field("stop_message", &self.stop_message)
            .field("phase", &self.phase())
            .finish_non_exhaustive()
    }
}

/// Owns one message-only window and pumps its messages into a [`MessageCallback`].
///
/// [`start`](Self::start) blocks the calling thread for as long as the loop runs; that thread
/// becomes the window's thread. [`stop`](Self::stop) may be called from any thread and only
/// posts the private stop signal: teardown is complete once `start` has returned.
pub struct WindowManager<B: MessageWindowBackend> {
    state: Arc<WindowState>,
    config: WindowConfig,
    _backend: PhantomData<fn() -> B>,
}

impl<B: MessageWindowBackend> WindowManager<B> {
    pub fn new(callback: Arc<dyn MessageCallback>) -> Self {
        Self::build(callback, WindowConfig::default())
    }

    pub fn with_config(callback: Arc<dyn MessageCallback>, config: WindowConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(callback, config))
    }

    fn build(callback: Arc<dyn MessageCallback>, config: WindowConfig) -> Self {
        Self {
            state: Arc::new(WindowState::new(callback, config.stop_message)),
            config,
            _backend: PhantomData,
        }
    }

    /// Create the window and run its message loop on the calling thread.
    ///
    /// Returns after [`stop`](Self::stop) has been processed by the loop, with the window
    /// destroyed and its registry entry gone.
    pub fn start(&self) -> Result<()> {
        self.run(|| {})
    }

    /// `start`, calling `on_running` once the window is registered and before the loop blocks.
    pub(crate) fn run(&self, on_running: impl FnOnce()) -> Result<()> {
        {
            let mut phase = self.state.phase.lock();
            if *phase != Phase::Idle {
                return Err(PumpError::State {
                    operation: "start",
                    phase: *phase,
                });
            }
            self.state.stop_requested.store(false, Ordering::SeqCst);
            *phase = Phase::Starting;
        }

        let window = match B::create_message_window(&self.config) {
            Ok(window) => window,
            Err(e) => {
                self.state.set_phase(Phase::Idle);
                return Err(e);
            }
        };

        let _guard = LoopGuard::<B> {
            state: &self.state,
            window,
            _backend: PhantomData,
        };

        self.state.set_window(window);
        B::registry().register(window, Arc::clone(&self.state));
        log::debug!("message-only window {window} created");

        let stop_pending = {
            let mut phase = self.state.phase.lock();
            let pending = self.state.stop_requested();
            *phase = if pending {
                Phase::StopRequested
            } else {
                Phase::Running
            };
            self.state.phase_changed.notify_all();
            pending
        };
        if stop_pending {
            self.post_stop(window);
        }

        on_running();
        B::run_message_loop()
    }

    /// Request the loop to end. Returns immediately; a no-op when idle.
    ///
    /// Called from inside the callback, the signal is handled on the next loop iteration.
    pub fn stop(&self) {
        let mut phase = self.state.phase.lock();
        match *phase {
            Phase::Idle => {}
            // Posted by `run` as soon as the window exists.
            Phase::Starting => self.state.stop_requested.store(true, Ordering::SeqCst),
            Phase::Running | Phase::StopRequested => {
                self.state.stop_requested.store(true, Ordering::SeqCst);
                *phase = Phase::StopRequested;
                self.state.phase_changed.notify_all();

                // `LoopGuard` destroys the window under this lock, so the handle is still live.
                let window = self.state.window();
                if window.is_valid() {
                    self.post_stop(window);
                }
            }
        }
    }

    fn post_stop(&self, window: WindowId) {
        if let Err(e) = B::post_message(window, self.state.stop_message, 0, 0) {
            log::warn!("failed to post stop signal to window {window}: {e}");
        }
    }

    /// Current window handle, [`WindowId::INVALID`] when no loop is running.
    #[inline]
    pub fn window_handle(&self) -> WindowId {
        self.state.window()
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn is_running(&self) -> bool {
        matches!(self.phase(), Phase::Running | Phase::StopRequested)
    }

    #[inline]
    pub fn stop_message(&self) -> u32 {
        self.state.stop_message
    }

    pub fn config(&self) -> &WindowConfig {
        &self.config
    }

    /// Block until the loop is running (or `timeout` elapses). Returns whether it is running.
    pub fn wait_until_running(&self, timeout: Duration) -> bool {
        self.state.wait_for(timeout, |phase| {
            matches!(phase, Phase::Running | Phase::StopRequested)
        })
    }

    /// Block until the instance is back to [`Phase::Idle`] (or `timeout` elapses).
    pub fn wait_until_idle(&self, timeout: Duration) -> bool {
        self.state.wait_for(timeout, |phase| phase == Phase::Idle)
    }

    /// Run the loop on a dedicated thread; see [`PumpThread`].
    pub fn spawn(self: Arc<Self>) -> Result<PumpThread<B>> {
        PumpThread::spawn(self)
    }
}

impl<B: MessageWindowBackend> fmt::Debug for WindowManager<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindowManager")
            .field("state", &self.state)
            .field("config", &self.config)
            .finish()
    }
}

/// Tears the window down on the loop thread however the loop ended.
struct LoopGuard<'a, B: MessageWindowBackend> {
    state: &'a Arc<WindowState>,
    window: WindowId,
    _backend: PhantomData<fn() -> B>,
}

impl<B: MessageWindowBackend> Drop for LoopGuard<'_, B> {
    fn drop(&mut self) {
        if B::registry().unregister(self.window).is_some() {
            log::debug!(
                "window {} left its loop without a stop signal",
                self.window
            );
        }

        // Serialized with `stop`, which posts to the handle under the same lock.
        let mut phase = self.state.phase.lock();
        self.state.set_window(WindowId::INVALID);
        if let Err(e) = B::destroy_window(self.window) {
            log::warn!("failed to destroy window {}: {e}", self.window);
        }
        *phase = Phase::Idle;
        self.state.phase_changed.notify_all();
        drop(phase);

        log::debug!("message-only window {} destroyed", self.window);
    }
}

/// Window procedure body shared by every backend.
///
/// The backend's native entry point calls this for each message addressed to one of its
/// windows; the owning instance is found through the backend's handle registry.
pub fn dispatch<B: MessageWindowBackend>(
    window: WindowId,
    message: u32,
    wparam: usize,
    lparam: isize,
) -> isize {
    let Some(state) = B::registry().resolve(window) else {
        log::debug!("message {message:#06x} for window {window} not routed: no registered owner");
        return B::def_window_proc(window, message, wparam, lparam);
    };

    if message == state.stop_message && state.stop_requested() {
        // End the loop before dropping the entry so nothing else reaches this instance.
        B::quit_message_loop(0);
        B::registry().unregister(window);
        state.set_window(WindowId::INVALID);
        log::debug!("window {window} processed its stop signal");
        return B::def_window_proc(window, message, wparam, lparam);
    }

    state
        .callback
        .on_message_received(&WindowMessage::new(window, message, wparam, lparam))
}
