use crate::config::WindowConfig;
use crate::error::Result;
use crate::host::WindowId;
use crate::manager::WindowState;
use crate::registry::HandleRegistry;

/// Native primitives a message pump needs from the platform.
///
/// Everything is an associated function: the OS has no notion of the backend as an object, and
/// the window procedure installed by [`create_message_window`](Self::create_message_window)
/// must be a free function that finds its instance through [`registry`](Self::registry).
///
/// Windows are thread-affine: a window belongs to the thread that created it, only that thread's
/// [`run_message_loop`](Self::run_message_loop) dispatches its messages, and only that thread may
/// destroy it. Posting and sending are allowed from any thread.
pub trait MessageWindowBackend: 'static {
    /// Handle registry shared by every window of this backend.
    fn registry() -> &'static HandleRegistry<WindowState>;

    /// Create a message-only window on the calling thread whose window procedure forwards to
    /// [`crate::manager::dispatch`].
    fn create_message_window(config: &WindowConfig) -> Result<WindowId>;

    /// Destroy a window created on the calling thread.
    fn destroy_window(window: WindowId) -> Result<()>;

    /// Retrieve and dispatch messages for the calling thread until a quit request is observed.
    fn run_message_loop() -> Result<()>;

    /// Ask the calling thread's message loop to end once its queue is drained.
    fn quit_message_loop(exit_code: i32);

    /// Queue a message for `window` and return immediately.
    fn post_message(window: WindowId, message: u32, wparam: usize, lparam: isize) -> Result<()>;

    /// Deliver a message to `window` and wait for the window procedure's result.
    fn send_message(window: WindowId, message: u32, wparam: usize, lparam: isize) -> isize;

    /// Default processing for messages the pump does not route.
    fn def_window_proc(window: WindowId, message: u32, wparam: usize, lparam: isize) -> isize;
}
