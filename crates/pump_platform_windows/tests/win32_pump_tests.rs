#![cfg(windows)]

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use pump_platform::{
    MessageWindowBackend, Phase, PumpError, WindowConfig, WindowId, WindowManager, WindowMessage,
};
use pump_platform_windows::win32::WM_APP;
use pump_platform_windows::{Win32Backend, win_api};

const TIMEOUT: Duration = Duration::from_secs(5);

fn recording_manager(class_name: &str) -> (Arc<WindowManager<Win32Backend>>, Arc<Mutex<Vec<WindowMessage>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let config = WindowConfig {
        class_name: class_name.to_string(),
        ..Default::default()
    };
    let manager = WindowManager::with_config(
        Arc::new(move |message: &WindowMessage| {
            sink.lock().push(*message);
            if message.message() == 100 { 42 } else { 0 }
        }),
        config,
    )
    .unwrap();
    (Arc::new(manager), seen)
}

#[test]
fn app_messages_reach_callback_until_stopped() {
    let (manager, seen) = recording_manager("win32-pump-app-messages");
    let pump = Arc::clone(&manager).spawn().unwrap();
    let window = pump.window_handle();
    assert!(win_api::is_window(pump_platform_windows::hwnd(window)));

    for offset in 0..3 {
        Win32Backend::send_message(window, WM_APP + offset, 0, 0);
    }
    assert!(manager.is_running());

    pump.join().unwrap();

    assert_eq!(manager.phase(), Phase::Idle);
    assert_eq!(manager.window_handle(), WindowId::INVALID);
    assert!(!Win32Backend::registry().contains(window));

    let app_messages = seen
        .lock()
        .iter()
        .filter(|m| (WM_APP..=WM_APP + 2).contains(&m.message()))
        .count();
    assert_eq!(app_messages, 3);
}

#[test]
fn send_from_other_thread_returns_callback_result() {
    let (manager, seen) = recording_manager("win32-pump-send");
    let pump = Arc::clone(&manager).spawn().unwrap();
    let window = pump.window_handle();

    let result = thread::spawn(move || Win32Backend::send_message(window, 100, 5, 0))
        .join()
        .unwrap();

    assert_eq!(result, 42);
    assert!(seen.lock().contains(&WindowMessage::new(window, 100, 5, 0)));

    let before_stop = seen.lock().len();
    pump.join().unwrap();
    assert!(manager.wait_until_idle(TIMEOUT));
    assert_eq!(seen.lock().len(), before_stop);
}

#[test]
fn second_start_is_a_state_error() {
    let (manager, _) = recording_manager("win32-pump-double-start");
    let pump = Arc::clone(&manager).spawn().unwrap();

    let second = {
        let manager = Arc::clone(&manager);
        thread::spawn(move || manager.start()).join().unwrap()
    };
    assert!(matches!(second, Err(PumpError::State { .. })));
    assert!(manager.is_running());

    pump.join().unwrap();
}

#[test]
fn class_registration_failure_carries_os_error() {
    // RegisterClassW rejects class names longer than 256 characters.
    let (manager, seen) = recording_manager(&"x".repeat(300));

    let err = manager.start().unwrap_err();

    assert!(matches!(
        err,
        PumpError::ResourceCreation {
            operation: "RegisterClassW",
            ..
        }
    ));
    assert!(err.os_code().is_some());
    assert_eq!(manager.phase(), Phase::Idle);
    assert_eq!(manager.window_handle(), WindowId::INVALID);
    assert!(seen.lock().is_empty());
}
