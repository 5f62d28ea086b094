use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use pump_platform::{
    MessageCallback, MessageWindowBackend, PumpThread, Result, WindowConfig, WindowId,
    WindowManager, WindowMessage,
};

use crate::DefaultBackend;

type Handler = Arc<dyn Fn(&WindowMessage) -> isize + Send + Sync>;

/// Identifies a handler added with [`MessageOnlyWindow::on_message_received`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

/// Fan-out sink: every handler sees every message, the last one decides the result.
#[derive(Default)]
struct MessageReceived {
    handlers: RwLock<Vec<(HandlerId, Handler)>>,
    next_id: AtomicU64,
}

impl MessageReceived {
    fn add(&self, handler: Handler) -> HandlerId {
        let id = HandlerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.handlers.write().push((id, handler));
        id
    }

    fn remove(&self, id: HandlerId) -> bool {
        let mut handlers = self.handlers.write();
        let before = handlers.len();
        handlers.retain(|(handler_id, _)| *handler_id != id);
        handlers.len() != before
    }
}

impl MessageCallback for MessageReceived {
    fn on_message_received(&self, message: &WindowMessage) -> isize {
        // Snapshot so handlers can subscribe or unsubscribe while being called.
        let handlers: Vec<Handler> = self
            .handlers
            .read()
            .iter()
            .map(|(_, handler)| Arc::clone(handler))
            .collect();

        handlers
            .iter()
            .fold(0, |_, handler| handler(message))
    }
}

/// Receive window messages without a visible window.
///
/// Subscribe with [`on_message_received`](Self::on_message_received), then run the loop either
/// on the current thread with [`start_message_loop`](Self::start_message_loop) or on a dedicated
/// one with [`spawn`](Self::spawn). Handlers run on the loop thread; the value returned by the
/// last handler is the message result (`0` when nobody is subscribed).
///
/// Dropping the window stops its loop.
pub struct MessageOnlyWindow<B: MessageWindowBackend = DefaultBackend> {
    event: Arc<MessageReceived>,
    manager: Arc<WindowManager<B>>,
}

impl MessageOnlyWindow<DefaultBackend> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<B: MessageWindowBackend> Default for MessageOnlyWindow<B> {
    fn default() -> Self {
        let event = Arc::new(MessageReceived::default());
        let manager = Arc::new(WindowManager::new(event.clone()));
        Self { event, manager }
    }
}

impl<B: MessageWindowBackend> MessageOnlyWindow<B> {
    pub fn with_config(config: WindowConfig) -> Result<Self> {
        let event = Arc::new(MessageReceived::default());
        let manager = Arc::new(WindowManager::with_config(event.clone(), config)?);
        Ok(Self { event, manager })
    }

    /// Subscribe to every message delivered to the window.
    pub fn on_message_received<F>(&self, handler: F) -> HandlerId
    where
        F: Fn(&WindowMessage) -> isize + Send + Sync + 'static,
    {
        self.event.add(Arc::new(handler))
    }

    pub fn remove_handler(&self, id: HandlerId) -> bool {
        self.event.remove(id)
    }

    pub fn handler_count(&self) -> usize {
        self.event.handlers.read().len()
    }

    /// Run the message loop on the calling thread until [`stop_message_loop`] is processed.
    ///
    /// [`stop_message_loop`]: Self::stop_message_loop
    pub fn start_message_loop(&self) -> Result<()> {
        self.manager.start()
    }

    /// Ask the loop thread to stop; the loop ends asynchronously.
    pub fn stop_message_loop(&self) {
        self.manager.stop();
    }

    /// Run the message loop on a new thread.
    pub fn spawn(&self) -> Result<PumpThread<B>> {
        Arc::clone(&self.manager).spawn()
    }

    #[inline]
    pub fn window_handle(&self) -> WindowId {
        self.manager.window_handle()
    }

    pub fn is_running(&self) -> bool {
        self.manager.is_running()
    }

    pub fn manager(&self) -> &Arc<WindowManager<B>> {
        &self.manager
    }
}

impl<B: MessageWindowBackend> Drop for MessageOnlyWindow<B> {
    fn drop(&mut self) {
        if self.manager.is_running() {
            log::debug!(
                "message-only window {} dropped while running; stopping its loop",
                self.window_handle()
            );
        }
        self.manager.stop();
    }
}

impl<B: MessageWindowBackend> fmt::Debug for MessageOnlyWindow<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageOnlyWindow")
            .field("handlers", &self.handler_count())
            .field("manager", &self.manager)
            .finish()
    }
}
