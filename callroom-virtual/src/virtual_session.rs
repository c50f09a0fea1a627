//! Virtual capture pipeline.
//!
//! Stages input changes made inside a configuration bracket and records
//! each committed input set, so tests can check that nothing in between
//! ever became visible.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;

use callroom_core::models::config::SessionPreset;
use callroom_core::models::device::{DeviceDescriptor, DeviceInput, DevicePosition, MediaKind};
use callroom_core::models::error::CaptureError;
use callroom_core::models::interruption::SystemNotification;
use callroom_core::traits::capture_backend::CaptureBackend;

use crate::notification_center::VirtualNotificationCenter;

/// One input set the pipeline actually switched to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommittedConfiguration {
    pub preset: SessionPreset,
    pub inputs: Vec<DeviceDescriptor>,
}

impl CommittedConfiguration {
    pub fn video_position(&self) -> Option<DevicePosition> {
        self.inputs.iter().find(|d| d.kind == MediaKind::Video).map(|d| d.position)
    }

    pub fn has_audio(&self) -> bool {
        self.inputs.iter().any(|d| d.kind == MediaKind::Audio)
    }
}

#[derive(Default)]
struct ProbeState {
    committed: Vec<CommittedConfiguration>,
    running: bool,
    starts: usize,
    stops: usize,
    rejected: HashSet<String>,
    owner_threads: HashSet<String>,
}

/// Handle for observing a `VirtualCaptureBackend` from outside the worker.
#[derive(Clone, Default)]
pub struct BackendProbe {
    state: Arc<Mutex<ProbeState>>,
}

impl BackendProbe {
    /// Every committed input set, oldest first.
    pub fn committed(&self) -> Vec<CommittedConfiguration> {
        self.state.lock().committed.clone()
    }

    pub fn last_committed(&self) -> Option<CommittedConfiguration> {
        self.state.lock().committed.last().cloned()
    }

    pub fn is_running(&self) -> bool {
        self.state.lock().running
    }

    pub fn start_count(&self) -> usize {
        self.state.lock().starts
    }

    pub fn stop_count(&self) -> usize {
        self.state.lock().stops
    }

    /// Make the pipeline refuse the device with `id`.
    pub fn reject(&self, id: &str) {
        self.state.lock().rejected.insert(id.to_string());
    }

    /// Stop the pipeline behind the session's back, as a media server
    /// crash would. Nothing is posted.
    pub fn halt(&self) {
        self.state.lock().running = false;
    }

    /// Names of the threads that touched the pipeline.
    pub fn threads(&self) -> HashSet<String> {
        self.state.lock().owner_threads.clone()
    }
}

pub struct VirtualCaptureBackend {
    probe: BackendProbe,
    notifications: Option<Arc<VirtualNotificationCenter>>,
    preset: SessionPreset,
    live: Vec<DeviceDescriptor>,
    in_configuration: bool,
}

impl VirtualCaptureBackend {
    pub fn new(probe: BackendProbe) -> Self {
        Self {
            probe,
            notifications: None,
            preset: SessionPreset::default(),
            live: Vec::new(),
            in_configuration: false,
        }
    }

    /// Post running-state changes to `center`, like a real session does.
    pub fn with_notifications(mut self, center: Arc<VirtualNotificationCenter>) -> Self {
        self.notifications = Some(center);
        self
    }

    fn touch(&self) {
        let name = std::thread::current().name().unwrap_or("<unnamed>").to_string();
        self.probe.state.lock().owner_threads.insert(name);
    }

    /// Outside a bracket every change is its own commit.
    fn changed(&mut self) {
        if !self.in_configuration {
            self.commit();
        }
    }

    fn commit(&mut self) {
        self.probe.state.lock().committed.push(CommittedConfiguration {
            preset: self.preset,
            inputs: self.live.clone(),
        });
    }

    fn set_running(&mut self, running: bool) {
        {
            let mut state = self.probe.state.lock();
            if state.running == running {
                return;
            }
            state.running = running;
            if running {
                state.starts += 1;
            } else {
                state.stops += 1;
            }
        }
        if let Some(center) = &self.notifications {
            center.post(SystemNotification::RunningStateChanged { running });
        }
    }
}

impl CaptureBackend for VirtualCaptureBackend {
    fn set_preset(&mut self, preset: SessionPreset) {
        self.touch();
        self.preset = preset;
    }

    fn begin_configuration(&mut self) {
        self.touch();
        self.in_configuration = true;
    }

    fn commit_configuration(&mut self) {
        self.touch();
        self.in_configuration = false;
        self.commit();
    }

    fn can_add_input(&self, input: &DeviceInput) -> bool {
        !self.probe.state.lock().rejected.contains(&input.device().id)
            && !self.live.iter().any(|d| d.kind == input.kind())
    }

    fn add_input(&mut self, input: &DeviceInput) -> Result<(), CaptureError> {
        self.touch();
        if !self.can_add_input(input) {
            return Err(CaptureError::InputRejected(input.device().name.clone()));
        }
        self.live.push(input.device().clone());
        self.changed();
        Ok(())
    }

    fn remove_input(&mut self, input: &DeviceInput) {
        self.touch();
        self.live.retain(|d| d.id != input.device().id);
        self.changed();
    }

    fn start_running(&mut self) {
        self.touch();
        self.set_running(true);
    }

    fn stop_running(&mut self) {
        self.touch();
        self.set_running(false);
    }

    fn is_running(&self) -> bool {
        self.probe.state.lock().running
    }
}
