use std::sync::OnceLock;

use pump_platform::{
    APP_MESSAGE_BASE, HandleRegistry, MessageWindowBackend, PumpError, WindowConfig, WindowId,
    WindowState, dispatch,
};

use crate::win_api;
use crate::win32::{HWND, LPARAM, LRESULT, WM_APP, WPARAM};

const _: () = assert!(APP_MESSAGE_BASE == WM_APP);

static REGISTRY: OnceLock<HandleRegistry<WindowState>> = OnceLock::new();

/// Message-only windows on the real Win32 message queue.
#[derive(Debug, Clone, Copy, Default)]
pub struct Win32Backend;

fn os_error(operation: &'static str, error: &windows::core::Error) -> PumpError {
    PumpError::Os {
        operation,
        code: error.code().0,
    }
}

fn creation_error(operation: &'static str, error: &windows::core::Error) -> PumpError {
    PumpError::ResourceCreation {
        operation,
        code: error.code().0,
    }
}

impl MessageWindowBackend for Win32Backend {
    fn registry() -> &'static HandleRegistry<WindowState> {
        REGISTRY.get_or_init(HandleRegistry::new)
    }

    fn create_message_window(config: &WindowConfig) -> pump_platform::Result<WindowId> {
        let instance =
            win_api::get_module_handle().map_err(|e| creation_error("GetModuleHandleW", &e))?;

        win_api::register_window_class(instance, &config.class_name, window_proc)
            .map_err(|e| creation_error("RegisterClassW", &e))?;

        let hwnd =
            win_api::create_message_only_window(instance, &config.class_name, &config.window_name)
                .map_err(|e| creation_error("CreateWindowExW", &e))?;

        Ok(crate::window_id(hwnd))
    }

    fn destroy_window(window: WindowId) -> pump_platform::Result<()> {
        win_api::destroy_window(crate::hwnd(window)).map_err(|e| os_error("DestroyWindow", &e))
    }

    fn run_message_loop() -> pump_platform::Result<()> {
        let exit_code = win_api::run_message_loop().map_err(|e| os_error("GetMessageW", &e))?;
        log::debug!("message loop received WM_QUIT ({exit_code})");
        Ok(())
    }

    fn quit_message_loop(exit_code: i32) {
        win_api::quit_message_loop(exit_code);
    }

    fn post_message(
        window: WindowId,
        message: u32,
        wparam: usize,
        lparam: isize,
    ) -> pump_platform::Result<()> {
        win_api::post_message(crate::hwnd(window), message, wparam, lparam)
            .map_err(|e| os_error("PostMessageW", &e))
    }

    fn send_message(window: WindowId, message: u32, wparam: usize, lparam: isize) -> isize {
        win_api::send_message(crate::hwnd(window), message, wparam, lparam).0
    }

    fn def_window_proc(window: WindowId, message: u32, wparam: usize, lparam: isize) -> isize {
        win_api::def_window_proc(crate::hwnd(window), message, WPARAM(wparam), LPARAM(lparam)).0
    }
}

/// The window procedure registered for every message-only window class.
///
/// A panic in the callback cannot unwind through this frame and aborts the process.
unsafe extern "system" fn window_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    LRESULT(dispatch::<Win32Backend>(
        crate::window_id(hwnd),
        msg,
        wparam.0,
        lparam.0,
    ))
}
