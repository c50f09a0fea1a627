use crate::models::status::Control;

/// Receiver of call-screen status updates, implemented by the UI layer.
///
/// The orchestrator always invokes these on the `UiContext` it was given,
/// never on the session worker or the notification thread. Calls may
/// repeat a value already applied; implementations must treat them as
/// idempotent.
pub trait StatusSink: Send + Sync {
    /// Enable or disable a control.
    fn set_control_disabled(&self, control: Control, disabled: bool);

    /// Show a toggle control as on or off. Only `Video` and `Microphone`.
    fn set_control_active(&self, control: Control, active: bool);

    /// Text explaining why the camera is off. Empty when it is on.
    fn set_disabled_reason_text(&self, text: &str);

    /// Hide or show the overlay drawn over the preview while the camera is off.
    fn set_overlay_hidden(&self, hidden: bool);
}
