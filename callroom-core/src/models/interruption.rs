use serde::{Deserialize, Serialize};

/// Normalized cause of a system-driven camera stop or recovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InterruptionReason {
    RuntimeError,
    ThermalCritical,
    UsedByAnotherClient,
    MultipleForegroundApps,
    BackgroundedApp,
    InterruptionEnded,
    SessionStoppedUnexpectedly,
}

impl InterruptionReason {
    /// Whether this reason means the camera can come back.
    pub fn is_recovery(self) -> bool {
        matches!(self, Self::InterruptionEnded)
    }
}

/// Device thermal level, polled from the platform when it reports a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThermalState {
    Nominal,
    Fair,
    Serious,
    Critical,
}

impl ThermalState {
    /// `Serious` and `Critical` force the camera off.
    pub fn is_critical(self) -> bool {
        self >= Self::Serious
    }
}

/// Raw interruption reason attached to a platform "session interrupted"
/// notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformInterruption {
    VideoDeviceNotAvailableInBackground,
    AudioDeviceInUseByAnotherClient,
    VideoDeviceInUseByAnotherClient,
    VideoDeviceNotAvailableWithMultipleForegroundApps,
    VideoDeviceNotAvailableDueToSystemPressure,
    Unknown,
}

impl From<PlatformInterruption> for InterruptionReason {
    fn from(reason: PlatformInterruption) -> Self {
        match reason {
            PlatformInterruption::VideoDeviceNotAvailableInBackground => Self::BackgroundedApp,
            PlatformInterruption::AudioDeviceInUseByAnotherClient
            | PlatformInterruption::VideoDeviceInUseByAnotherClient => Self::UsedByAnotherClient,
            PlatformInterruption::VideoDeviceNotAvailableWithMultipleForegroundApps => {
                Self::MultipleForegroundApps
            }
            PlatformInterruption::VideoDeviceNotAvailableDueToSystemPressure => Self::ThermalCritical,
            PlatformInterruption::Unknown => Self::SessionStoppedUnexpectedly,
        }
    }
}

/// A notification as emitted by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SystemNotification {
    RuntimeError { message: String },
    SessionInterrupted { reason: PlatformInterruption },
    InterruptionEnded,
    /// The thermal state changed; the new level must be polled.
    ThermalStateChanged,
    RunningStateChanged { running: bool },
}

/// Normalized event delivered by the `InterruptionMonitor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptionEvent {
    Interrupted(InterruptionReason),
    ThermalStateChanged(ThermalState),
    RunningStateChanged(bool),
}

impl InterruptionEvent {
    /// The reason this event carries, if it names one.
    pub fn reason(&self) -> Option<InterruptionReason> {
        match *self {
            Self::Interrupted(reason) => Some(reason),
            Self::ThermalStateChanged(state) if state.is_critical() => {
                Some(InterruptionReason::ThermalCritical)
            }
            Self::ThermalStateChanged(_) => None,
            Self::RunningStateChanged(true) => None,
            Self::RunningStateChanged(false) => Some(InterruptionReason::SessionStoppedUnexpectedly),
        }
    }
}
