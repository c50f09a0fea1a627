//! # callroom-virtual
//!
//! In-memory platform backend for callroom.
//!
//! Provides:
//! - `VirtualPermissions`: scripted camera/microphone prompts
//! - `VirtualDevices`: attachable, detachable and busy cameras and microphones
//! - `VirtualCaptureBackend`: capture pipeline that records every committed input set
//! - `VirtualNotificationCenter`: injectable interruptions and thermal changes
//! - `RecordingStatusSink`: status sink that remembers what the UI was told
//!
//! ## Usage
//! ```ignore
//! use std::sync::Arc;
//! use callroom_core::{OrchestratorConfig, SessionOrchestrator, UiThread};
//! use callroom_virtual::{RecordingStatusSink, VirtualPlatform};
//!
//! let platform = VirtualPlatform::phone();
//! let sink = Arc::new(RecordingStatusSink::new());
//! let ui = Arc::new(UiThread::spawn().unwrap());
//! let call = SessionOrchestrator::new(OrchestratorConfig::default(), platform.services(), sink, ui).unwrap();
//! call.start().unwrap();
//! ```

pub mod device_enumerator;
pub mod notification_center;
pub mod permissions;
pub mod platform;
pub mod recording_sink;
pub mod virtual_session;

pub use device_enumerator::VirtualDevices;
pub use notification_center::VirtualNotificationCenter;
pub use permissions::{PromptResponse, VirtualPermissions};
pub use platform::VirtualPlatform;
pub use recording_sink::RecordingStatusSink;
pub use virtual_session::{BackendProbe, CommittedConfiguration, VirtualCaptureBackend};
