//! In-process stand-in for the Win32 message queue.
//!
//! Mirrors the parts of the Win32 model the pump relies on, so the same manager code runs on hosts
//! without Win32 (and under test):
//! - every thread has its own queue, and a window belongs to the thread that created it;
//! - sent messages are delivered before posted ones, and a cross-thread send blocks until the
//!   owning thread has dispatched it;
//! - a quit request is only observed once the queue is empty;
//! - creation and destruction notify the window procedure (`WM_NCCREATE`/`WM_CREATE`,
//!   `WM_DESTROY`/`WM_NCDESTROY`) and destruction discards the window's pending messages.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock, mpsc};

use parking_lot::{Condvar, Mutex};

use crate::config::WindowConfig;
use crate::error::{PumpError, Result};
use crate::host::WindowId;
use crate::manager::{self, WindowState};
use crate::registry::HandleRegistry;
use crate::traits::MessageWindowBackend;

pub const WM_CREATE: u32 = 0x0001;
pub const WM_DESTROY: u32 = 0x0002;
pub const WM_NCCREATE: u32 = 0x0081;
pub const WM_NCDESTROY: u32 = 0x0082;

const E_ACCESSDENIED: i32 = 0x8007_0005_u32 as i32;
const ERROR_INVALID_WINDOW_HANDLE: i32 = 0x8007_0578_u32 as i32;

const FIRST_WINDOW: usize = 0x0001_0000;
const WINDOW_STRIDE: usize = 4;

struct Envelope {
    window: WindowId,
    message: u32,
    wparam: usize,
    lparam: isize,
    reply: Option<mpsc::SyncSender<isize>>,
}

#[derive(Default)]
struct QueueState {
    sent: VecDeque<Envelope>,
    posted: VecDeque<Envelope>,
    quit: Option<i32>,
}

impl QueueState {
    fn next(&mut self) -> Option<Envelope> {
        if let Some(envelope) = self.sent.pop_front() {
            return Some(envelope);
        }
        self.posted.pop_front()
    }

    fn discard(&mut self, window: WindowId) {
        self.sent.retain(|envelope| envelope.window != window);
        self.posted.retain(|envelope| envelope.window != window);
    }
}

#[derive(Default)]
struct ThreadQueue {
    state: Mutex<QueueState>,
    ready: Condvar,
}

impl ThreadQueue {
    fn push(&self, envelope: Envelope) {
        let mut state = self.state.lock();
        if envelope.reply.is_some() {
            state.sent.push_back(envelope);
        } else {
            state.posted.push_back(envelope);
        }
        self.ready.notify_one();
    }
}

thread_local! {
    static THREAD_QUEUE: Arc<ThreadQueue> = Arc::new(ThreadQueue::default());
}

fn current_queue() -> Arc<ThreadQueue> {
    THREAD_QUEUE.with(Arc::clone)
}

#[derive(Default)]
struct Loopback {
    windows: Mutex<HashMap<WindowId, Arc<ThreadQueue>>>,
    rejected_classes: Mutex<HashMap<String, i32>>,
    registry: HandleRegistry<WindowState>,
}

static LOOPBACK: OnceLock<Loopback> = OnceLock::new();
static NEXT_WINDOW: AtomicUsize = AtomicUsize::new(FIRST_WINDOW);

fn loopback() -> &'static Loopback {
    LOOPBACK.get_or_init(Loopback::default)
}

fn owner_queue(window: WindowId) -> Option<Arc<ThreadQueue>> {
    loopback().windows.lock().get(&window).cloned()
}

/// Message-only windows backed by in-process per-thread queues.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoopbackBackend;

impl LoopbackBackend {
    /// Make window creation fail for `class_name` with `code`, as a failed class registration
    /// would on Win32.
    pub fn reject_class(class_name: &str, code: i32) {
        loopback()
            .rejected_classes
            .lock()
            .insert(class_name.to_string(), code);
    }

    pub fn accept_class(class_name: &str) {
        loopback().rejected_classes.lock().remove(class_name);
    }

    /// Whether `window` currently exists (`IsWindow`).
    pub fn is_window(window: WindowId) -> bool {
        loopback().windows.lock().contains_key(&window)
    }
}

impl MessageWindowBackend for LoopbackBackend {
    fn registry() -> &'static HandleRegistry<WindowState> {
        &loopback().registry
    }

    fn create_message_window(config: &WindowConfig) -> Result<WindowId> {
        if let Some(&code) = loopback().rejected_classes.lock().get(&config.class_name) {
            return Err(PumpError::ResourceCreation {
                operation: "RegisterClassW",
                code,
            });
        }

        let window = WindowId::from_raw(NEXT_WINDOW.fetch_add(WINDOW_STRIDE, Ordering::Relaxed));
        loopback().windows.lock().insert(window, current_queue());

        manager::dispatch::<Self>(window, WM_NCCREATE, 0, 0);
        manager::dispatch::<Self>(window, WM_CREATE, 0, 0);
        Ok(window)
    }

    fn destroy_window(window: WindowId) -> Result<()> {
        let queue = current_queue();
        match owner_queue(window) {
            None => {
                return Err(PumpError::Os {
                    operation: "DestroyWindow",
                    code: ERROR_INVALID_WINDOW_HANDLE,
                });
            }
            Some(owner) if !Arc::ptr_eq(&owner, &queue) => {
                return Err(PumpError::Os {
                    operation: "DestroyWindow",
                    code: E_ACCESSDENIED,
                });
            }
            Some(_) => {}
        }

        manager::dispatch::<Self>(window, WM_DESTROY, 0, 0);
        manager::dispatch::<Self>(window, WM_NCDESTROY, 0, 0);

        loopback().windows.lock().remove(&window);
        // Dropping pending replies unblocks their senders.
        queue.state.lock().discard(window);
        Ok(())
    }

    fn run_message_loop() -> Result<()> {
        let queue = current_queue();
        loop {
            let envelope = {
                let mut state = queue.state.lock();
                loop {
                    if let Some(envelope) = state.next() {
                        break envelope;
                    }
                    if let Some(exit_code) = state.quit.take() {
                        log::debug!("loopback message loop quit ({exit_code})");
                        return Ok(());
                    }
                    queue.ready.wait(&mut state);
                }
            };

            let result = manager::dispatch::<Self>(
                envelope.window,
                envelope.message,
                envelope.wparam,
                envelope.lparam,
            );
            if let Some(reply) = envelope.reply {
                let _ = reply.send(result);
            }
        }
    }

    fn quit_message_loop(exit_code: i32) {
        let queue = current_queue();
        queue.state.lock().quit = Some(exit_code);
        queue.ready.notify_one();
    }

    fn post_message(window: WindowId, message: u32, wparam: usize, lparam: isize) -> Result<()> {
        let Some(queue) = owner_queue(window) else {
            return Err(PumpError::Os {
                operation: "PostMessageW",
                code: ERROR_INVALID_WINDOW_HANDLE,
            });
        };
        queue.push(Envelope {
            window,
            message,
            wparam,
            lparam,
            reply: None,
        });
        Ok(())
    }

    fn send_message(window: WindowId, message: u32, wparam: usize, lparam: isize) -> isize {
        let Some(queue) = owner_queue(window) else {
            return 0;
        };

        if Arc::ptr_eq(&queue, &current_queue()) {
            return manager::dispatch::<Self>(window, message, wparam, lparam);
        }

        let (reply, result) = mpsc::sync_channel(1);
        queue.push(Envelope {
            window,
            message,
            wparam,
            lparam,
            reply: Some(reply),
        });
        result.recv().unwrap_or(0)
    }

    fn def_window_proc(_window: WindowId, _message: u32, _wparam: usize, _lparam: isize) -> isize {
        0
    }
}
