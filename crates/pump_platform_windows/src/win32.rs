pub use windows::core::{Error, Result};

pub use windows::Win32::Foundation::{HWND, LPARAM, LRESULT, WPARAM};

pub use windows::Win32::UI::WindowsAndMessaging::{
    HWND_MESSAGE, WM_APP, WM_CREATE, WM_DESTROY, WM_NCCREATE, WM_NCDESTROY, WM_QUIT,
};
