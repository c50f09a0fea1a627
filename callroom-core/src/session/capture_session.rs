use std::collections::{BTreeMap, BTreeSet};
use std::thread::{self, ThreadId};

use crate::models::config::SessionPreset;
use crate::models::device::{DeviceInput, DevicePosition, InputId, MediaKind};
use crate::models::error::CaptureError;
use crate::models::status::SessionSnapshot;
use crate::traits::capture_backend::CaptureBackend;

/// The live capture session: at most one active camera input, at most one
/// active microphone input, and the inputs that are acquired but parked.
///
/// Bound to the thread that created it (the session worker). Every method
/// panics when called from any other thread.
pub struct CaptureSession {
    backend: Box<dyn CaptureBackend>,
    owner: ThreadId,
    configuration_depth: u32,
    video: Option<DeviceInput>,
    audio: Option<DeviceInput>,
    parked_video: BTreeMap<DevicePosition, DeviceInput>,
    parked_audio: Option<DeviceInput>,
    last_video_position: Option<DevicePosition>,
}

impl CaptureSession {
    pub fn new(backend: Box<dyn CaptureBackend>) -> Self {
        Self {
            backend,
            owner: thread::current().id(),
            configuration_depth: 0,
            video: None,
            audio: None,
            parked_video: BTreeMap::new(),
            parked_audio: None,
            last_video_position: None,
        }
    }

    pub fn set_preset(&mut self, preset: SessionPreset) {
        self.assert_owner();
        self.backend.set_preset(preset);
    }

    /// Open a configuration bracket. Brackets nest; only the outermost one
    /// reaches the backend.
    pub fn begin_configuration(&mut self) {
        self.assert_owner();
        if self.configuration_depth == 0 {
            self.backend.begin_configuration();
        }
        self.configuration_depth += 1;
    }

    pub fn commit_configuration(&mut self) {
        self.assert_owner();
        if self.configuration_depth == 0 {
            log::warn!("commit_configuration without matching begin_configuration");
            return;
        }
        self.configuration_depth -= 1;
        if self.configuration_depth == 0 {
            self.backend.commit_configuration();
        }
    }

    /// Run `f` inside one configuration bracket.
    pub fn configure<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        self.begin_configuration();
        let result = f(self);
        self.commit_configuration();
        result
    }

    /// Whether `input` could be added now: its slot is free and the backend
    /// accepts it.
    pub fn can_add_input(&self, input: &DeviceInput) -> bool {
        self.assert_owner();
        let slot_free = match input.kind() {
            MediaKind::Video => self.video.is_none(),
            MediaKind::Audio => self.audio.is_none(),
        };
        slot_free && self.backend.can_add_input(input)
    }

    /// Make `input` the active input of its kind.
    ///
    /// Hands the input back when the session cannot take it.
    pub fn add_input(&mut self, input: DeviceInput) -> Result<(), DeviceInput> {
        if !self.can_add_input(&input) {
            log::debug!("Session cannot add {} input {}", input.kind(), input.device().name);
            return Err(input);
        }
        if let Err(e) = self.backend.add_input(&input) {
            log::warn!("Backend rejected {}: {}", input.device().name, e);
            return Err(input);
        }

        match input.kind() {
            MediaKind::Video => {
                self.last_video_position = Some(input.position());
                self.video = Some(input);
            }
            MediaKind::Audio => self.audio = Some(input),
        }
        Ok(())
    }

    /// Take the active input with `id` out of the session.
    ///
    /// Returns `None` when no such input is active.
    pub fn remove_input(&mut self, id: InputId) -> Option<DeviceInput> {
        self.assert_owner();
        let slot = if self.video.as_ref().is_some_and(|i| i.id() == id) {
            &mut self.video
        } else if self.audio.as_ref().is_some_and(|i| i.id() == id) {
            &mut self.audio
        } else {
            return None;
        };
        let input = slot.take()?;
        self.backend.remove_input(&input);
        Some(input)
    }

    /// Keep an acquired input available without making it active.
    ///
    /// A camera parked at an occupied position replaces the older input.
    pub fn park_input(&mut self, input: DeviceInput) {
        self.assert_owner();
        match input.kind() {
            MediaKind::Video => {
                self.parked_video.insert(input.position(), input);
            }
            MediaKind::Audio => self.parked_audio = Some(input),
        }
    }

    pub fn take_parked_video(&mut self, position: DevicePosition) -> Option<DeviceInput> {
        self.assert_owner();
        self.parked_video.remove(&position)
    }

    pub fn take_parked_audio(&mut self) -> Option<DeviceInput> {
        self.assert_owner();
        self.parked_audio.take()
    }

    /// Replace the active camera with the parked one at `position`.
    ///
    /// Runs inside a single configuration bracket, so the backend never
    /// commits a state without a camera. If the new input is rejected the
    /// previous one is restored.
    pub fn swap_video(&mut self, position: DevicePosition) -> Result<(), CaptureError> {
        self.assert_owner();
        let Some(current) = self.video.as_ref().map(DeviceInput::id) else {
            return Err(CaptureError::DeviceNotAvailable);
        };
        let Some(next) = self.parked_video.remove(&position) else {
            return Err(CaptureError::DeviceNotAvailable);
        };

        self.configure(|session| {
            let previous = session.remove_input(current);
            match session.add_input(next) {
                Ok(()) => {
                    if let Some(previous) = previous {
                        session.park_input(previous);
                    }
                    Ok(())
                }
                Err(rejected) => {
                    let name = rejected.device().name.clone();
                    session.park_input(rejected);
                    if let Some(previous) = previous {
                        if let Err(previous) = session.add_input(previous) {
                            session.park_input(previous);
                        }
                    }
                    Err(CaptureError::InputRejected(name))
                }
            }
        })
    }

    /// Drop every input of `kind`, active or parked.
    pub fn release(&mut self, kind: MediaKind) {
        self.assert_owner();
        let active = match kind {
            MediaKind::Video => self.video.take(),
            MediaKind::Audio => self.audio.take(),
        };
        if let Some(input) = active {
            self.backend.remove_input(&input);
        }
        match kind {
            MediaKind::Video => self.parked_video.clear(),
            MediaKind::Audio => self.parked_audio = None,
        }
    }

    pub fn start_running(&mut self) {
        self.assert_owner();
        if !self.backend.is_running() {
            self.backend.start_running();
        }
    }

    pub fn stop_running(&mut self) {
        self.assert_owner();
        if self.backend.is_running() {
            self.backend.stop_running();
        }
    }

    pub fn is_running(&self) -> bool {
        self.assert_owner();
        self.backend.is_running()
    }

    pub fn video_input(&self) -> Option<&DeviceInput> {
        self.assert_owner();
        self.video.as_ref()
    }

    pub fn audio_input(&self) -> Option<&DeviceInput> {
        self.assert_owner();
        self.audio.as_ref()
    }

    /// Whether any camera input is held, active or parked.
    pub fn holds_video(&self) -> bool {
        self.video_input().is_some() || !self.parked_video.is_empty()
    }

    pub fn holds_audio(&self) -> bool {
        self.audio_input().is_some() || self.parked_audio.is_some()
    }

    /// Position of the camera that was active most recently.
    pub fn last_video_position(&self) -> Option<DevicePosition> {
        self.last_video_position
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.assert_owner();
        let mut video_positions: BTreeSet<_> = self.parked_video.keys().copied().collect();
        if let Some(active) = &self.video {
            video_positions.insert(active.position());
        }
        SessionSnapshot {
            active_video: self.video.as_ref().map(DeviceInput::position),
            video_positions,
            audio_active: self.audio.is_some(),
            audio_parked: self.parked_audio.is_some(),
            running: self.backend.is_running(),
        }
    }

    fn assert_owner(&self) {
        assert_eq!(
            thread::current().id(),
            self.owner,
            "capture session used outside its session worker"
        );
    }
}
