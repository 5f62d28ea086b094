use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use message_pump::{
    APP_MESSAGE_BASE, DEFAULT_STOP_MESSAGE, LoopbackBackend, MessageOnlyWindow,
    MessageWindowBackend, Phase, PumpError, WindowConfig, WindowId, WindowMessage,
};
use parking_lot::Mutex;

const TIMEOUT: Duration = Duration::from_secs(5);

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn sending_messages() -> Result<()> {
    init_logging();

    let pump = Arc::new(MessageOnlyWindow::<LoopbackBackend>::default());
    let messages = Arc::new(Mutex::new(Vec::<WindowMessage>::new()));
    let (arrived_tx, arrived_rx) = mpsc::channel();
    let arrived_tx = Mutex::new(arrived_tx);

    let sink = Arc::clone(&messages);
    pump.on_message_received(move |message| {
        sink.lock().push(*message);
        let _ = arrived_tx.lock().send(());
        0
    });

    let loop_stopped = Arc::new(AtomicBool::new(false));
    let loop_pump = Arc::clone(&pump);
    let stopped = Arc::clone(&loop_stopped);
    let loop_thread = thread::spawn(move || {
        let result = loop_pump.start_message_loop();
        stopped.store(true, Ordering::SeqCst);
        result
    });
    assert!(pump.manager().wait_until_running(TIMEOUT));

    let window = pump.window_handle();
    LoopbackBackend::send_message(window, APP_MESSAGE_BASE, 0, 0);
    arrived_rx
        .recv_timeout(TIMEOUT)
        .context("a message hasn't arrived")?;

    LoopbackBackend::send_message(window, APP_MESSAGE_BASE + 1, 0, 0);
    LoopbackBackend::send_message(window, APP_MESSAGE_BASE + 2, 0, 0);
    assert!(
        !loop_stopped.load(Ordering::SeqCst),
        "the loop must keep running until stop_message_loop()"
    );

    pump.stop_message_loop();
    loop_thread.join().expect("loop thread panicked")?;
    assert!(loop_stopped.load(Ordering::SeqCst));

    let app_messages = messages
        .lock()
        .iter()
        .filter(|m| (APP_MESSAGE_BASE..=APP_MESSAGE_BASE + 2).contains(&m.message()))
        .count();
    assert_eq!(app_messages, 3);
    Ok(())
}

#[test]
fn synthetic_message_round_trip() -> Result<()> {
    init_logging();

    let window = MessageOnlyWindow::<LoopbackBackend>::default();
    let observed = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&observed);
    window.on_message_received(move |message| {
        *sink.lock() = Some((
            message.window(),
            message.message(),
            message.wparam(),
            message.lparam(),
        ));
        -17
    });

    let pump = window.spawn()?;
    let handle = pump.window_handle();
    let result = thread::spawn(move || LoopbackBackend::send_message(handle, 100, 5, 0))
        .join()
        .expect("sender panicked");

    assert_eq!(result, -17);
    assert_eq!(*observed.lock(), Some((handle, 100, 5, 0)));

    pump.join()?;
    Ok(())
}

#[test]
fn stop_returns_promptly_and_silences_handlers() -> Result<()> {
    init_logging();

    let window = MessageOnlyWindow::<LoopbackBackend>::default();
    let calls = Arc::new(Mutex::new(0usize));
    let sink = Arc::clone(&calls);
    window.on_message_received(move |_| {
        *sink.lock() += 1;
        0
    });

    let pump = window.spawn()?;
    let handle = pump.window_handle();
    LoopbackBackend::post_message(handle, APP_MESSAGE_BASE + 7, 0, 0)?;

    window.stop_message_loop();
    assert!(window.manager().wait_until_idle(TIMEOUT));
    let calls_at_stop = *calls.lock();

    assert!(LoopbackBackend::post_message(handle, APP_MESSAGE_BASE + 8, 0, 0).is_err());
    assert_eq!(LoopbackBackend::send_message(handle, APP_MESSAGE_BASE + 9, 0, 0), 0);
    assert_eq!(*calls.lock(), calls_at_stop);
    assert_eq!(window.window_handle(), WindowId::INVALID);
    assert!(!LoopbackBackend::registry().contains(handle));

    pump.join()?;
    Ok(())
}

#[test]
fn concurrent_start_is_rejected() -> Result<()> {
    init_logging();

    let window = Arc::new(MessageOnlyWindow::<LoopbackBackend>::default());
    let pump = window.spawn()?;

    let second = {
        let window = Arc::clone(&window);
        thread::spawn(move || window.start_message_loop())
            .join()
            .expect("second start panicked")
    };

    assert_eq!(
        second,
        Err(PumpError::State {
            operation: "start",
            phase: Phase::Running,
        })
    );
    assert!(window.is_running());
    pump.join()?;
    Ok(())
}

#[test]
fn custom_stop_code_from_config() -> Result<()> {
    init_logging();

    let stop_code = APP_MESSAGE_BASE + 1;
    let window = MessageOnlyWindow::<LoopbackBackend>::with_config(WindowConfig::from_json(
        &format!(r#"{{ "class_name": "custom-stop", "stop_message": {stop_code} }}"#),
    )?)?;
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    window.on_message_received(move |message| {
        sink.lock().push(message.message());
        0
    });

    let pump = window.spawn()?;
    let handle = pump.window_handle();

    // Ordinary messages until a stop is requested, including the default stop code.
    LoopbackBackend::send_message(handle, stop_code, 0, 0);
    LoopbackBackend::send_message(handle, DEFAULT_STOP_MESSAGE, 0, 0);
    assert!(window.is_running());

    pump.join()?;
    assert_eq!(*seen.lock(), vec![stop_code, DEFAULT_STOP_MESSAGE]);
    Ok(())
}
