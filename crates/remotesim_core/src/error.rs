use std::borrow::Cow;
use std::fmt;
use thiserror::Error;

/// Convenient result alias for remotesim_core.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Log/handling importance. Maps cleanly onto tracing levels in the wrapper.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd)]
pub enum Severity {
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

/// Where an error came from (helps triage and routing).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Domain {
    Connection,
    Scene,
    Collection,
    Simulation,
    Data,
    Other,
}

/// Stable error "kind" for matching/branching.
///
/// The remote-call taxonomy:
/// - `NotConnected`: no live connection; raised before attempting the call
/// - `Server`: the call completed but the server returned a non-success code
/// - `Simulation`: the operation is refused while a simulation runs (or a
///   simulation-control call failed)
/// - `InvalidState` / `InvalidArgument`: bad local wrapper state or input
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ErrorKind {
    InvalidArgument,
    InvalidState,
    NotConnected,
    Server,
    Simulation,
    Io,
    Other,
}

/// Optional structured payload for rich context without forcing allocation.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Payload {
    None,

    /// Generic key/value context (usually no heap alloc if using &str).
    Context {
        key: &'static str,
        value: Cow<'static, str>,
    },

    /// Non-success status code returned by the remote API server.
    Status(u16),
}

/// The one error type that crosses module boundaries in this workspace.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
#[error("{severity:?}: {message}")]
pub struct CoreError {
    pub domain: Domain,
    pub kind: ErrorKind,
    pub severity: Severity,
    pub message: Cow<'static, str>,
    pub payload: Payload,
}

impl CoreError {
    /// Fully-specified constructor (rarely needed at call sites).
    pub fn new(
        domain: Domain,
        kind: ErrorKind,
        severity: Severity,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            domain,
            kind,
            severity,
            message: message.into(),
            payload: Payload::None,
        }
    }

    // ---------------- Fluent entry points ----------------

    #[inline]
    pub fn info() -> Builder {
        Builder::new(Severity::Info)
    }
    #[inline]
    pub fn warn() -> Builder {
        Builder::new(Severity::Warn)
    }
    #[inline]
    pub fn error() -> Builder {
        Builder::new(Severity::Error)
    }
    #[inline]
    pub fn fatal() -> Builder {
        Builder::new(Severity::Fatal)
    }

    // ---------------- Remote-call taxonomy ----------------
    //
    // `op` is a short verb phrase including its preposition ("retrieve
    // position of", "remove"), `target` the object/collection/session name.

    /// The session has no live connection; the call was never attempted.
    pub fn not_connected(op: &str, target: &str) -> Self {
        CoreError::error()
            .domain(Domain::Connection)
            .kind(ErrorKind::NotConnected)
            .msgf(format_args!(
                "could not {op} {target}: not connected to remote API server"
            ))
            .build()
    }

    /// The remote call completed but the server reported a non-success code.
    pub fn server(domain: Domain, op: &str, target: &str, code: u16) -> Self {
        CoreError::error()
            .domain(domain)
            .kind(ErrorKind::Server)
            .msgf(format_args!("could not {op} {target}"))
            .payload(Payload::Status(code))
            .build()
    }

    /// Handle-dependent operation on an object already removed from the scene.
    pub fn removed(op: &str, target: &str) -> Self {
        CoreError::warn()
            .domain(Domain::Scene)
            .kind(ErrorKind::InvalidState)
            .msgf(format_args!(
                "could not {op} {target}: object removed from scene"
            ))
            .build()
    }

    /// Handle-dependent operation on an object whose handle was never resolved.
    pub fn unresolved(op: &str, target: &str) -> Self {
        CoreError::warn()
            .domain(Domain::Scene)
            .kind(ErrorKind::InvalidState)
            .msgf(format_args!(
                "could not {op} {target}: object handle never resolved"
            ))
            .build()
    }

    /// Mutation refused because the simulation is running and the caller did
    /// not override the guard.
    pub fn sim_running(op: &str, target: &str) -> Self {
        CoreError::warn()
            .domain(Domain::Simulation)
            .kind(ErrorKind::Simulation)
            .msgf(format_args!(
                "could not {op} {target}: simulation is running"
            ))
            .build()
    }
}

/// Fluent builder (takes self, returns Self).
///
/// Defaults:
/// - domain = Other
/// - kind = Other
/// - message = ""
/// - payload = None
#[derive(Debug, Clone)]
pub struct Builder {
    domain: Domain,
    kind: ErrorKind,
    severity: Severity,
    message: Cow<'static, str>,
    payload: Payload,
}

impl Builder {
    #[inline]
    fn new(severity: Severity) -> Self {
        Self {
            domain: Domain::Other,
            kind: ErrorKind::Other,
            severity,
            message: Cow::Borrowed(""),
            payload: Payload::None,
        }
    }

    /// Set/override the domain (defaults to Domain::Other).
    #[inline]
    pub fn domain(mut self, d: Domain) -> Self {
        self.domain = d;
        self
    }

    /// Set/override the kind (defaults to ErrorKind::Other).
    #[inline]
    pub fn kind(mut self, k: ErrorKind) -> Self {
        self.kind = k;
        self
    }

    /// Set/override the message (defaults to "").
    #[inline]
    pub fn msg(mut self, m: impl Into<Cow<'static, str>>) -> Self {
        self.message = m.into();
        self
    }

    /// Formatting-friendly message setter.
    /// Note: still allocates once because we store as Cow<'static, str>.
    #[inline]
    pub fn msgf(mut self, args: fmt::Arguments<'_>) -> Self {
        self.message = Cow::Owned(args.to_string());
        self
    }

    /// Only one payload: this replaces any previous payload (default is None).
    #[inline]
    pub fn payload(mut self, p: Payload) -> Self {
        self.payload = p;
        self
    }

    #[inline]
    pub fn build(self) -> CoreError {
        CoreError {
            domain: self.domain,
            kind: self.kind,
            severity: self.severity,
            message: self.message,
            payload: self.payload,
        }
    }
}

impl From<Builder> for CoreError {
    fn from(b: Builder) -> Self {
        b.build()
    }
}

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::error()
            .domain(Domain::Other)
            .kind(ErrorKind::Io)
            .msg("io error")
            .payload(Payload::Context {
                key: "io",
                value: e.to_string().into(),
            })
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_error_carries_status_payload() {
        let e = CoreError::server(Domain::Scene, "retrieve position of", "Pioneer", 8);
        assert_eq!(e.kind, ErrorKind::Server);
        assert_eq!(e.domain, Domain::Scene);
        assert_eq!(e.payload, Payload::Status(8));
        assert!(e.message.contains("retrieve position of Pioneer"));
    }

    #[test]
    fn taxonomy_constructors_set_expected_kinds() {
        assert_eq!(
            CoreError::not_connected("remove", "Cuboid").kind,
            ErrorKind::NotConnected
        );
        assert_eq!(
            CoreError::removed("remove", "Cuboid").kind,
            ErrorKind::InvalidState
        );
        assert_eq!(
            CoreError::sim_running("set position of", "Cuboid").kind,
            ErrorKind::Simulation
        );
    }
}
