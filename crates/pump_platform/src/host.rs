use serde::{Deserialize, Serialize};

/// Opaque window identifier.
///
/// This is used to avoid leaking platform window handles (e.g. Win32 `HWND`) across crate
/// boundaries and threads. Platform backends can convert to/from raw handles as needed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowId(usize);

impl WindowId {
    pub const INVALID: WindowId = WindowId(0);

    #[inline]
    pub const fn from_raw(raw: usize) -> Self {
        Self(raw)
    }

    #[inline]
    pub fn raw(self) -> usize {
        self.0
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl std::fmt::Display for WindowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// One window message as delivered to the window procedure.
///
/// Plain value: copied around, never mutated once built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowMessage {
    window: WindowId,
    message: u32,
    wparam: usize,
    lparam: isize,
}

impl WindowMessage {
    #[inline]
    pub const fn new(window: WindowId, message: u32, wparam: usize, lparam: isize) -> Self {
        Self {
            window,
            message,
            wparam,
            lparam,
        }
    }

    /// Target window of the message.
    #[inline]
    pub fn window(&self) -> WindowId {
        self.window
    }

    /// Message number (`WM_*`).
    #[inline]
    pub fn message(&self) -> u32 {
        self.message
    }

    #[inline]
    pub fn wparam(&self) -> usize {
        self.wparam
    }

    #[inline]
    pub fn lparam(&self) -> isize {
        self.lparam
    }
}

/// Receiver for every message routed to a message-only window.
///
/// Called synchronously on the thread running the message loop. The returned value becomes the
/// window procedure's result for that message (usually `0`). Implementations must return
/// promptly: while a call is in progress the loop does not retrieve further messages.
pub trait MessageCallback: Send + Sync {
    fn on_message_received(&self, message: &WindowMessage) -> isize;
}

impl<F> MessageCallback for F
where
    F: Fn(&WindowMessage) -> isize + Send + Sync,
{
    #[inline]
    fn on_message_received(&self, message: &WindowMessage) -> isize {
        self(message)
    }
}
