use thiserror::Error;

use crate::manager::Phase;

/// Errors surfaced by the message pump.
///
/// Native failures carry the OS error as an `HRESULT` (Win32 errors are wrapped as
/// `0x8007xxxx`, the same way `windows::core::Error` reports them).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PumpError {
    /// The message-only window (or its class) could not be created.
    #[error("Resource creation failed: {operation} (os error {code:#010x})")]
    ResourceCreation { operation: &'static str, code: i32 },

    /// The operation is not valid in the manager's current phase.
    #[error("Invalid state: cannot {operation} while {phase:?}")]
    State { operation: &'static str, phase: Phase },

    /// Any other native call that failed.
    #[error("Windows API error: {operation} (os error {code:#010x})")]
    Os { operation: &'static str, code: i32 },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Message loop thread error: {0}")]
    Spawn(String),
}

impl PumpError {
    /// OS error code carried by native failures.
    pub fn os_code(&self) -> Option<i32> {
        match self {
            PumpError::ResourceCreation { code, .. } | PumpError::Os { code, .. } => Some(*code),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, PumpError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_os_code() {
        let err = PumpError::ResourceCreation {
            operation: "CreateWindowExW",
            code: 0x8007_0578_u32 as i32,
        };
        assert_eq!(
            err.to_string(),
            "Resource creation failed: CreateWindowExW (os error 0x80070578)"
        );
        assert_eq!(err.os_code(), Some(0x8007_0578_u32 as i32));
    }

    #[test]
    fn state_error_names_phase() {
        let err = PumpError::State {
            operation: "start",
            phase: Phase::Running,
        };
        assert_eq!(err.to_string(), "Invalid state: cannot start while Running");
        assert_eq!(err.os_code(), None);
    }
}
