//! Receive window messages without a visible window.
//!
//! A [`MessageOnlyWindow`] owns a hidden, message-only window and runs its message loop on the
//! thread that starts it, handing every message to the subscribed handlers. On Windows the real
//! Win32 queue is used; elsewhere the in-process [`LoopbackBackend`] stands in for it.

mod message_only_window;

pub use message_only_window::{HandlerId, MessageOnlyWindow};
pub use pump_platform::{
    APP_MESSAGE_BASE, APP_MESSAGE_LAST, DEFAULT_STOP_MESSAGE, HandleRegistry, LoopbackBackend,
    MessageCallback, MessageWindowBackend, Phase, PumpError, PumpThread, Result, WindowConfig,
    WindowId, WindowManager, WindowMessage,
};

#[cfg(windows)]
pub use pump_platform_windows::Win32Backend;

/// Backend used when none is named explicitly.
#[cfg(windows)]
pub type DefaultBackend = pump_platform_windows::Win32Backend;

#[cfg(not(windows))]
pub type DefaultBackend = pump_platform::LoopbackBackend;
