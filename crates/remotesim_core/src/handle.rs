use std::fmt;

use crate::error::{CoreError, Result};

/// Opaque object or collection handle assigned by the simulator server.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct RawHandle(pub i32);

impl fmt::Display for RawHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle of a wrapper's server handle.
///
/// Replaces the sentinel convention (-1 unset, -2 removed) with an explicit
/// tagged state:
/// - `Unresolved`: name known, handle not resolved yet
/// - `Live`: resolved; remote calls are allowed
/// - `Removed`: `remove()` succeeded; terminal, the handle must never reach
///   the server again
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum HandleState {
    #[default]
    Unresolved,
    Live(RawHandle),
    Removed,
}

impl HandleState {
    /// The live handle, if any.
    pub const fn live(self) -> Option<RawHandle> {
        match self {
            HandleState::Live(handle) => Some(handle),
            _ => None,
        }
    }

    pub const fn is_removed(self) -> bool {
        matches!(self, HandleState::Removed)
    }

    /// The live handle, or the designated error for the current state.
    ///
    /// `op`/`target` name the operation being attempted, for diagnostics.
    pub fn require_live(self, op: &str, target: &str) -> Result<RawHandle> {
        match self {
            HandleState::Live(handle) => Ok(handle),
            HandleState::Removed => Err(CoreError::removed(op, target)),
            HandleState::Unresolved => Err(CoreError::unresolved(op, target)),
        }
    }
}

/// Reference frame for positions and orientations.
///
/// Replaces runtime inspection of a None/integer/wrapper parameter with an
/// explicit variant; wrappers expose conversions from live objects.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum Frame {
    /// Absolute scene frame.
    #[default]
    Absolute,
    /// Relative to another scene object.
    Relative(RawHandle),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn live_handle_is_returned() {
        let state = HandleState::Live(RawHandle(7));
        assert_eq!(state.require_live("use", "Cuboid").unwrap(), RawHandle(7));
        assert_eq!(state.live(), Some(RawHandle(7)));
    }

    #[test]
    fn removed_state_is_terminal_and_designated() {
        let state = HandleState::Removed;
        let err = state.require_live("retrieve position of", "Cuboid").unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidState);
        assert!(err.message.contains("removed"));
        assert!(state.is_removed());
        assert_eq!(state.live(), None);
    }

    #[test]
    fn unresolved_state_rejects_remote_use() {
        let err = HandleState::Unresolved
            .require_live("remove", "Cuboid")
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidState);
        assert!(err.message.contains("never resolved"));
    }
}
