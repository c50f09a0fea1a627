//! # callroom-core
//!
//! Platform-agnostic capture session orchestration for a 1:1 call screen.
//!
//! Owns the camera and microphone session lifecycle: authorization, device
//! acquisition, user toggles, camera flips and system interruptions, and
//! turns all of it into a single derived control status published to the
//! UI. Platform backends implement the `traits` and plug into
//! `SessionOrchestrator` through `PlatformServices`.
//!
//! ## Architecture
//!
//! ```text
//! callroom-core (this crate)
//! ├── traits/    ← PermissionProvider, DeviceProvider, CaptureBackend,
//! │                NotificationSource, StatusSink, UiContext
//! ├── models/    ← CaptureError, AuthorizationStatus, DeviceInput,
//! │                DerivedStatus, OrchestratorConfig, diagnostics
//! ├── access/    ← AuthorizationGate, DeviceCatalog
//! ├── monitor/   ← InterruptionMonitor
//! └── session/   ← CaptureSession, SessionWorker, SessionOrchestrator
//! ```
//!
//! Every mutation of the capture session runs on one serial worker thread;
//! status updates always reach the sink through the `UiContext`.

pub mod access;
pub mod models;
pub mod monitor;
pub mod session;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use access::authorization_gate::AuthorizationGate;
pub use access::device_catalog::{Acquisition, DeviceCatalog};
pub use models::authorization::{AcquisitionFailure, AuthorizationStatus, PermissionState};
pub use models::config::{OrchestratorConfig, SessionPreset};
pub use models::device::{DeviceDescriptor, DeviceInput, DevicePosition, InputId, MediaKind};
pub use models::diagnostics::SessionDiagnostics;
pub use models::error::CaptureError;
pub use models::interruption::{
    InterruptionEvent, InterruptionReason, PlatformInterruption, SystemNotification, ThermalState,
};
pub use models::status::{CameraIntent, Control, DerivedStatus, DisabledReason, StatusChange, StatusInputs};
pub use monitor::interruption_monitor::InterruptionMonitor;
pub use session::capture_session::CaptureSession;
pub use session::orchestrator::{PlatformServices, SessionOrchestrator};
pub use session::ui_thread::UiThread;
pub use session::worker::{QueueSuspension, SessionWorker};
pub use traits::capture_backend::CaptureBackend;
pub use traits::device_provider::DeviceProvider;
pub use traits::notification_source::{NotificationHandler, NotificationSource, SubscriptionToken};
pub use traits::permission_provider::{AccessCompletion, PermissionProvider};
pub use traits::status_sink::StatusSink;
pub use traits::ui_context::{UiContext, UiTask};
