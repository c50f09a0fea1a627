use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::authorization::AuthorizationStatus;
use super::device::DevicePosition;
use super::interruption::{InterruptionReason, ThermalState};
use crate::traits::status_sink::StatusSink;

/// A call-screen control the core can enable, disable or highlight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Control {
    Video,
    Microphone,
    FlipCamera,
}

/// What the user last asked the camera to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CameraIntent {
    #[default]
    On,
    DisabledByUser,
}

/// Why the camera is off, as shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DisabledReason {
    AwaitingAuthorization,
    NotAuthorized,
    NoCameraAvailable,
    StartingCamera,
    CameraDisabledByUser,
    RuntimeError,
    ThermalCritical,
    UsedByAnotherClient,
    MultipleForegroundApps,
    BackgroundedApp,
    SessionStoppedUnexpectedly,
}

impl DisabledReason {
    pub fn text(self) -> &'static str {
        match self {
            Self::AwaitingAuthorization => "Waiting for camera permission",
            Self::NotAuthorized => "Camera access is not authorized. Enable it in Settings.",
            Self::NoCameraAvailable => "No camera available",
            Self::StartingCamera => "Starting camera",
            Self::CameraDisabledByUser => "Camera is off",
            Self::RuntimeError => "The camera stopped because of a system error",
            Self::ThermalCritical => "The camera is paused because the device is too warm",
            Self::UsedByAnotherClient => "The camera is in use by another app",
            Self::MultipleForegroundApps => "The camera is unavailable while other apps are on screen",
            Self::BackgroundedApp => "The camera is unavailable in the background",
            Self::SessionStoppedUnexpectedly => "The camera stopped unexpectedly",
        }
    }

    /// Disabled reason for an interruption that is still in effect.
    /// `InterruptionEnded` is a recovery and has none.
    pub fn for_interruption(reason: InterruptionReason) -> Option<Self> {
        match reason {
            InterruptionReason::RuntimeError => Some(Self::RuntimeError),
            InterruptionReason::ThermalCritical => Some(Self::ThermalCritical),
            InterruptionReason::UsedByAnotherClient => Some(Self::UsedByAnotherClient),
            InterruptionReason::MultipleForegroundApps => Some(Self::MultipleForegroundApps),
            InterruptionReason::BackgroundedApp => Some(Self::BackgroundedApp),
            InterruptionReason::SessionStoppedUnexpectedly => Some(Self::SessionStoppedUnexpectedly),
            InterruptionReason::InterruptionEnded => None,
        }
    }
}

/// Read-only view of the capture session, taken on the worker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    /// Position of the video input currently in the session.
    pub active_video: Option<DevicePosition>,
    /// Every camera position the session holds an input for, active or parked.
    pub video_positions: BTreeSet<DevicePosition>,
    pub audio_active: bool,
    pub audio_parked: bool,
    pub running: bool,
}

impl SessionSnapshot {
    /// A flip needs an active camera and inputs for both facing positions.
    pub fn can_flip(&self) -> bool {
        self.active_video.is_some()
            && self.video_positions.contains(&DevicePosition::Front)
            && self.video_positions.contains(&DevicePosition::Back)
    }

    pub fn has_audio_input(&self) -> bool {
        self.audio_active || self.audio_parked
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
struct StampedReason {
    reason: InterruptionReason,
    sequence: u64,
}

/// Interruptions currently in effect.
///
/// Session interruptions and thermal pressure arrive on different
/// notification kinds with no ordering between them, so each has its own
/// slot and a recovery of one kind only clears its own slot. A
/// system-pressure interruption counts as thermal for recovery purposes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActiveInterruptions {
    session: Option<StampedReason>,
    thermal: Option<StampedReason>,
    sequence: u64,
}

impl ActiveInterruptions {
    /// Record a session interruption. `InterruptionEnded` clears instead.
    pub fn interrupt(&mut self, reason: InterruptionReason) {
        if reason.is_recovery() {
            self.end_session_interruption();
            return;
        }
        self.session = Some(self.stamp(reason));
    }

    /// The session is back (interruption ended or running again).
    pub fn end_session_interruption(&mut self) {
        self.session = None;
    }

    /// Apply a polled thermal level.
    pub fn thermal(&mut self, state: ThermalState) {
        if state.is_critical() {
            if self.thermal.is_none() {
                self.thermal = Some(self.stamp(InterruptionReason::ThermalCritical));
            }
            return;
        }
        self.thermal = None;
        if matches!(self.session, Some(s) if s.reason == InterruptionReason::ThermalCritical) {
            self.session = None;
        }
    }

    /// The most recent interruption still in effect.
    pub fn current(&self) -> Option<InterruptionReason> {
        match (self.session, self.thermal) {
            (Some(s), Some(t)) => Some(if s.sequence > t.sequence { s.reason } else { t.reason }),
            (Some(s), None) => Some(s.reason),
            (None, Some(t)) => Some(t.reason),
            (None, None) => None,
        }
    }

    fn stamp(&mut self, reason: InterruptionReason) -> StampedReason {
        self.sequence += 1;
        StampedReason {
            reason,
            sequence: self.sequence,
        }
    }
}

/// Everything the derived status is computed from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusInputs {
    pub camera_authorization: AuthorizationStatus,
    pub microphone_authorization: AuthorizationStatus,
    pub camera_intent: CameraIntent,
    pub interruptions: ActiveInterruptions,
    pub session: SessionSnapshot,
}

impl Default for StatusInputs {
    fn default() -> Self {
        Self {
            camera_authorization: AuthorizationStatus::Undetermined,
            microphone_authorization: AuthorizationStatus::Undetermined,
            camera_intent: CameraIntent::On,
            interruptions: ActiveInterruptions::default(),
            session: SessionSnapshot::default(),
        }
    }
}

/// UI-facing summary of the call screen.
///
/// Never mutated field by field: every transition recomputes it from
/// `StatusInputs` and the result replaces the previous value as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DerivedStatus {
    pub camera_authorization: AuthorizationStatus,
    pub microphone_authorization: AuthorizationStatus,
    pub camera_on: bool,
    pub microphone_on: bool,
    pub flip_available: bool,
    pub disabled_reason: Option<DisabledReason>,
}

impl DerivedStatus {
    /// Status before anything is known: both undetermined, everything off.
    pub fn initial() -> Self {
        Self::derive(&StatusInputs::default())
    }

    pub fn derive(inputs: &StatusInputs) -> Self {
        let camera_granted = inputs.camera_authorization.is_granted();
        let interruption = inputs.interruptions.current();

        let camera_on = camera_granted
            && inputs.camera_intent == CameraIntent::On
            && inputs.session.active_video.is_some()
            && interruption.is_none();

        let disabled_reason = if camera_on {
            None
        } else {
            Some(match inputs.camera_authorization {
                AuthorizationStatus::Undetermined => DisabledReason::AwaitingAuthorization,
                AuthorizationStatus::Denied => DisabledReason::NotAuthorized,
                AuthorizationStatus::NotFound => DisabledReason::NoCameraAvailable,
                AuthorizationStatus::Authorized => {
                    match interruption.and_then(DisabledReason::for_interruption) {
                        Some(reason) => reason,
                        None if inputs.camera_intent == CameraIntent::DisabledByUser => {
                            DisabledReason::CameraDisabledByUser
                        }
                        None => DisabledReason::StartingCamera,
                    }
                }
            })
        };

        Self {
            camera_authorization: inputs.camera_authorization,
            microphone_authorization: inputs.microphone_authorization,
            camera_on,
            microphone_on: inputs.microphone_authorization.is_granted() && inputs.session.audio_active,
            flip_available: camera_granted && inputs.session.can_flip(),
            disabled_reason,
        }
    }

    pub fn disabled_reason_text(&self) -> &'static str {
        self.disabled_reason.map(DisabledReason::text).unwrap_or("")
    }

    fn video_control_disabled(&self) -> bool {
        !self.camera_authorization.is_granted()
    }

    fn microphone_control_disabled(&self) -> bool {
        !self.microphone_authorization.is_granted()
    }

    /// Every sink call needed to bring a fresh UI in line with this status.
    pub fn full_sync(&self) -> Vec<StatusChange> {
        vec![
            StatusChange::DisabledReasonText(self.disabled_reason_text().to_string()),
            StatusChange::OverlayHidden(self.camera_on),
            StatusChange::ControlDisabled { control: Control::Video, disabled: self.video_control_disabled() },
            StatusChange::ControlActive { control: Control::Video, active: self.camera_on },
            StatusChange::ControlDisabled {
                control: Control::Microphone,
                disabled: self.microphone_control_disabled(),
            },
            StatusChange::ControlActive { control: Control::Microphone, active: self.microphone_on },
            StatusChange::ControlDisabled { control: Control::FlipCamera, disabled: !self.flip_available },
        ]
    }

    /// Sink calls for the fields that differ from `previous`, one per field.
    ///
    /// The reason text goes first so a listener never sees a new camera
    /// state next to a stale explanation.
    pub fn changes_since(&self, previous: &DerivedStatus) -> Vec<StatusChange> {
        let mut changes = Vec::new();
        if self.disabled_reason != previous.disabled_reason {
            changes.push(StatusChange::DisabledReasonText(self.disabled_reason_text().to_string()));
        }
        if self.camera_on != previous.camera_on {
            changes.push(StatusChange::OverlayHidden(self.camera_on));
        }
        if self.video_control_disabled() != previous.video_control_disabled() {
            changes.push(StatusChange::ControlDisabled {
                control: Control::Video,
                disabled: self.video_control_disabled(),
            });
        }
        if self.camera_on != previous.camera_on {
            changes.push(StatusChange::ControlActive { control: Control::Video, active: self.camera_on });
        }
        if self.microphone_control_disabled() != previous.microphone_control_disabled() {
            changes.push(StatusChange::ControlDisabled {
                control: Control::Microphone,
                disabled: self.microphone_control_disabled(),
            });
        }
        if self.microphone_on != previous.microphone_on {
            changes.push(StatusChange::ControlActive { control: Control::Microphone, active: self.microphone_on });
        }
        if self.flip_available != previous.flip_available {
            changes.push(StatusChange::ControlDisabled {
                control: Control::FlipCamera,
                disabled: !self.flip_available,
            });
        }
        changes
    }
}

/// One `StatusSink` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusChange {
    ControlDisabled { control: Control, disabled: bool },
    ControlActive { control: Control, active: bool },
    DisabledReasonText(String),
    OverlayHidden(bool),
}

impl StatusChange {
    pub fn apply(&self, sink: &dyn StatusSink) {
        match self {
            Self::ControlDisabled { control, disabled } => sink.set_control_disabled(*control, *disabled),
            Self::ControlActive { control, active } => sink.set_control_active(*control, *active),
            Self::DisabledReasonText(text) => sink.set_disabled_reason_text(text),
            Self::OverlayHidden(hidden) => sink.set_overlay_hidden(*hidden),
        }
    }
}
