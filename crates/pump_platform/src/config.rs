use serde::{Deserialize, Serialize};

use crate::error::{PumpError, Result};

/// First application-defined message number (`WM_APP`).
pub const APP_MESSAGE_BASE: u32 = 0x8000;
/// Last application-defined message number.
pub const APP_MESSAGE_LAST: u32 = 0xBFFF;
/// Private message used to wake the loop thread and end the loop.
pub const DEFAULT_STOP_MESSAGE: u32 = APP_MESSAGE_BASE + 242;

pub const DEFAULT_CLASS_NAME: &str = "MessagePumpMessageOnly";

/// Creation parameters for a message-only window.
///
/// Message-only windows have no geometry, so only naming and the reserved stop code are
/// configurable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Window class registered for the message-only window.
    pub class_name: String,
    pub window_name: String,
    /// Reserved stop code; must lie in the application range.
    pub stop_message: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            class_name: DEFAULT_CLASS_NAME.to_string(),
            window_name: String::new(),
            stop_message: DEFAULT_STOP_MESSAGE,
        }
    }
}

impl WindowConfig {
    pub fn validate(&self) -> Result<()> {
        if self.class_name.is_empty() {
            return Err(PumpError::Config("class_name must not be empty".to_string()));
        }
        if self.class_name.contains('\0') || self.window_name.contains('\0') {
            return Err(PumpError::Config(
                "window names must not contain NUL characters".to_string(),
            ));
        }
        if !(APP_MESSAGE_BASE..=APP_MESSAGE_LAST).contains(&self.stop_message) {
            return Err(PumpError::Config(format!(
                "stop_message {:#06x} is outside the application range {APP_MESSAGE_BASE:#06x}..={APP_MESSAGE_LAST:#06x}",
                self.stop_message
            )));
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| PumpError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}
