//! Platform-neutral core of the message pump: handles, messages, the callback contract, the
//! handle registry, and the window manager that runs a message-only window's loop on top of a
//! [`MessageWindowBackend`].

pub mod config;
pub mod error;
pub mod host;
pub mod loopback;
pub mod manager;
pub mod pump_thread;
pub mod registry;
pub mod traits;

pub use config::*;
pub use error::{PumpError, Result};
pub use host::*;
pub use loopback::LoopbackBackend;
pub use manager::{Phase, WindowManager, WindowState, dispatch};
pub use pump_thread::PumpThread;
pub use registry::HandleRegistry;
pub use traits::*;
