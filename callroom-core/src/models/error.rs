use thiserror::Error;

use super::device::MediaKind;

/// Errors that can occur while driving the capture session.
///
/// None of these are fatal to a call: the orchestrator turns them into a
/// status change on the affected control.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("device not available")]
    DeviceNotAvailable,

    #[error("device busy: {0}")]
    DeviceBusy(String),

    #[error("authorization request for {0} already pending")]
    AuthorizationPending(MediaKind),

    #[error("input rejected by capture backend: {0}")]
    InputRejected(String),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("session already started")]
    SessionAlreadyStarted,

    #[error("session torn down")]
    SessionTornDown,

    #[error("session worker stopped")]
    WorkerStopped,

    #[error("notification monitor already attached")]
    MonitorAlreadyAttached,

    #[error("unknown error: {0}")]
    Unknown(String),
}
