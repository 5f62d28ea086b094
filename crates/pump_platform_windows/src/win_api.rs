use std::{ffi::OsStr, iter::once, os::windows::ffi::OsStrExt};

use windows::Win32::Foundation::*;
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::WindowsAndMessaging::*;
use windows::core::PCWSTR;

pub type WindowProc = unsafe extern "system" fn(HWND, u32, WPARAM, LPARAM) -> LRESULT;

#[inline]
pub fn get_module_handle() -> windows::core::Result<HMODULE> {
    unsafe { GetModuleHandleW(None) }
}

#[inline]
pub fn def_window_proc(hwnd: HWND, msg: u32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) }
}

/// Register `class_name` with `window_proc` as its window procedure.
///
/// Registering a class that already exists in this process is not an error: every message-only
/// window of a given class shares the same procedure.
pub fn register_window_class(
    instance: HMODULE,
    class_name: &str,
    window_proc: WindowProc,
) -> windows::core::Result<()> {
    let class_name = to_wide_chars(class_name);

    let window_class = WNDCLASSW {
        lpfnWndProc: Some(window_proc),
        hInstance: instance.into(),
        lpszClassName: PCWSTR(class_name.as_ptr()),
        ..Default::default()
    };

    if unsafe { RegisterClassW(&window_class) } != 0 {
        return Ok(());
    }

    let error = unsafe { GetLastError() };
    if error == ERROR_CLASS_ALREADY_EXISTS {
        return Ok(());
    }
    Err(windows::core::Error::from_hresult(error.to_hresult()))
}

/// Create a message-only window (parent `HWND_MESSAGE`): no geometry, never shown, never sent
/// paint or input messages.
pub fn create_message_only_window(
    instance: HMODULE,
    class_name: &str,
    window_name: &str,
) -> windows::core::Result<HWND> {
    let class_name = to_wide_chars(class_name);
    let window_name = to_wide_chars(window_name);

    unsafe {
        CreateWindowExW(
            WINDOW_EX_STYLE::default(),
            PCWSTR(class_name.as_ptr()),
            PCWSTR(window_name.as_ptr()),
            WINDOW_STYLE::default(),
            0,
            0,
            0,
            0,
            Some(HWND_MESSAGE),
            None,
            Some(instance.into()),
            None,
        )
    }
}

/// 销毁窗口
#[inline]
pub fn destroy_window(hwnd: HWND) -> windows::core::Result<()> {
    unsafe {
        DestroyWindow(hwnd)?;
    }
    Ok(())
}

/// 退出消息循环
#[inline]
pub fn quit_message_loop(exit_code: i32) {
    unsafe {
        PostQuitMessage(exit_code);
    }
}

/// Retrieve and dispatch messages for the calling thread until `WM_QUIT`.
///
/// Returns the exit code passed to `PostQuitMessage`.
pub fn run_message_loop() -> windows::core::Result<usize> {
    let mut msg = MSG::default();
    loop {
        let ret = unsafe { GetMessageW(&mut msg, None, 0, 0) };
        match ret.0 {
            -1 => {
                let error = unsafe { GetLastError() };
                return Err(windows::core::Error::from_hresult(error.to_hresult()));
            }
            0 => return Ok(msg.wParam.0),
            _ => unsafe {
                let _ = TranslateMessage(&msg);
                DispatchMessageW(&msg);
            },
        }
    }
}

/// 发送自定义消息到窗口
#[inline]
pub fn post_message(
    hwnd: HWND,
    msg: u32,
    wparam: usize,
    lparam: isize,
) -> windows::core::Result<()> {
    unsafe {
        PostMessageW(Some(hwnd), msg, WPARAM(wparam), LPARAM(lparam))?;
    }
    Ok(())
}

/// 发送同步消息到窗口
#[inline]
pub fn send_message(hwnd: HWND, msg: u32, wparam: usize, lparam: isize) -> LRESULT {
    unsafe { SendMessageW(hwnd, msg, Some(WPARAM(wparam)), Some(LPARAM(lparam))) }
}

#[inline]
pub fn is_window(hwnd: HWND) -> bool {
    unsafe { IsWindow(Some(hwnd)).as_bool() }
}

/// Convert a Rust string to a NUL-terminated UTF-16 buffer for Win32 APIs.
#[inline]
pub fn to_wide_chars(s: &str) -> Vec<u16> {
    OsStr::new(s).encode_wide().chain(once(0)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_chars_are_nul_terminated() {
        assert_eq!(to_wide_chars("ab"), vec![0x61, 0x62, 0]);
        assert_eq!(to_wide_chars(""), vec![0]);
    }

    #[test]
    fn registering_a_class_twice_is_fine() {
        unsafe extern "system" fn test_proc(
            hwnd: HWND,
            msg: u32,
            wparam: WPARAM,
            lparam: LPARAM,
        ) -> LRESULT {
            def_window_proc(hwnd, msg, wparam, lparam)
        }

        let instance = get_module_handle().unwrap();
        register_window_class(instance, "win-api-twice", test_proc).unwrap();
        register_window_class(instance, "win-api-twice", test_proc).unwrap();
    }
}
