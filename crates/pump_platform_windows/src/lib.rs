#![cfg(target_os = "windows")]

mod backend;
pub mod win32;
pub mod win_api;

pub use backend::Win32Backend;

use std::ffi::c_void;

use pump_platform::WindowId;
use windows::Win32::Foundation::HWND;

#[inline]
pub fn window_id(hwnd: HWND) -> WindowId {
    WindowId::from_raw(hwnd.0 as usize)
}

#[inline]
pub fn hwnd(window: WindowId) -> HWND {
    HWND(window.raw() as *mut c_void)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_id_round_trips_hwnd() {
        let window = WindowId::from_raw(0x0004_0a2c);
        assert_eq!(window_id(hwnd(window)), window);
        assert!(!window_id(HWND(std::ptr::null_mut())).is_valid());
    }
}
