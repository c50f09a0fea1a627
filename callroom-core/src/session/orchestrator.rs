use std::collections::VecDeque;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::access::authorization_gate::AuthorizationGate;
use crate::access::device_catalog::{Acquisition, DeviceCatalog};
use crate::models::authorization::{AcquisitionFailure, AuthorizationStatus};
use crate::models::config::OrchestratorConfig;
use crate::models::device::{DeviceInput, DevicePosition, MediaKind};
use crate::models::diagnostics::SessionDiagnostics;
use crate::models::error::CaptureError;
use crate::models::interruption::{InterruptionEvent, InterruptionReason};
use crate::models::status::{CameraIntent, DerivedStatus, StatusChange, StatusInputs};
use crate::monitor::interruption_monitor::InterruptionMonitor;
use crate::session::capture_session::CaptureSession;
use crate::session::worker::{QueueSuspension, SessionWorker};
use crate::traits::capture_backend::CaptureBackend;
use crate::traits::device_provider::DeviceProvider;
use crate::traits::notification_source::NotificationSource;
use crate::traits::permission_provider::PermissionProvider;
use crate::traits::status_sink::StatusSink;
use crate::traits::ui_context::UiContext;

/// The platform pieces a session is built from.
pub struct PlatformServices {
    pub permissions: Arc<dyn PermissionProvider>,
    pub devices: Arc<dyn DeviceProvider>,
    pub notifications: Arc<dyn NotificationSource>,
    pub backend: Box<dyn CaptureBackend>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Created,
    Started,
    TornDown,
}

struct OrchestratorState {
    lifecycle: Lifecycle,
    inputs: StatusInputs,
    published: DerivedStatus,
    diagnostics: SessionDiagnostics,
    /// The user muted the microphone. Survives revocation and re-grant.
    microphone_muted: bool,
}

/// What went wrong while putting devices into the session.
#[derive(Debug, Default)]
struct AcquisitionReport {
    failures: Vec<(MediaKind, DevicePosition, AcquisitionFailure)>,
    camera_unavailable: bool,
    microphone_unavailable: bool,
}

impl AcquisitionReport {
    fn failed(&mut self, kind: MediaKind, position: DevicePosition, failure: AcquisitionFailure) {
        self.failures.push((kind, position, failure));
    }

    fn apply(self, inputs: &mut StatusInputs, diagnostics: &mut SessionDiagnostics) {
        for (kind, position, failure) in self.failures {
            diagnostics.record_acquisition_failure(kind, position, failure);
        }
        if self.camera_unavailable && inputs.camera_authorization.is_granted() {
            inputs.camera_authorization = AuthorizationStatus::NotFound;
        }
        if self.microphone_unavailable && inputs.microphone_authorization.is_granted() {
            inputs.microphone_authorization = AuthorizationStatus::NotFound;
        }
    }
}

struct Inner {
    session_id: String,
    config: OrchestratorConfig,
    gate: AuthorizationGate,
    catalog: DeviceCatalog,
    worker: SessionWorker,
    monitor: InterruptionMonitor,
    sink: Arc<dyn StatusSink>,
    ui: Arc<dyn UiContext>,
    state: Mutex<OrchestratorState>,
}

/// Drives the call screen's capture session.
///
/// Consumes authorization outcomes, device acquisition results, user taps
/// and system interruptions; funnels every session mutation onto the
/// session worker; recomputes the `DerivedStatus` after each transition and
/// publishes the fields that changed to the `StatusSink` on the UI context.
///
/// ```text
/// user taps ──────┐
/// prompts ────────┼→ transition → DerivedStatus diff → UiContext → StatusSink
/// interruptions ──┘       │
///                         └→ SessionWorker → CaptureSession → CaptureBackend
/// ```
pub struct SessionOrchestrator {
    inner: Arc<Inner>,
}

impl SessionOrchestrator {
    pub fn new(
        config: OrchestratorConfig,
        platform: PlatformServices,
        sink: Arc<dyn StatusSink>,
        ui: Arc<dyn UiContext>,
    ) -> Result<Self, CaptureError> {
        config.validate().map_err(CaptureError::InvalidConfiguration)?;

        let session_id = uuid::Uuid::new_v4().to_string();
        let worker = SessionWorker::spawn(platform.backend)?;
        let inner = Inner {
            gate: AuthorizationGate::new(platform.permissions, Arc::clone(&platform.devices)),
            catalog: DeviceCatalog::new(platform.devices),
            monitor: InterruptionMonitor::new(platform.notifications),
            worker,
            sink,
            ui,
            state: Mutex::new(OrchestratorState {
                lifecycle: Lifecycle::Created,
                inputs: StatusInputs::default(),
                published: DerivedStatus::initial(),
                diagnostics: SessionDiagnostics::new(&session_id),
                microphone_muted: false,
            }),
            session_id,
            config,
        };

        Ok(Self { inner: Arc::new(inner) })
    }

    /// The screen appeared: sync the UI, listen for interruptions, settle
    /// authorization and bring the session up.
    ///
    /// While a permission prompt is open the session queue stays suspended,
    /// so nothing is configured against an undecided permission.
    pub fn start(&self) -> Result<(), CaptureError> {
        let inner = &self.inner;
        {
            let mut state = inner.state.lock();
            match state.lifecycle {
                Lifecycle::Created => {}
                Lifecycle::Started => return Err(CaptureError::SessionAlreadyStarted),
                Lifecycle::TornDown => return Err(CaptureError::SessionTornDown),
            }
            state.lifecycle = Lifecycle::Started;
            let initial = state.published.full_sync();
            state.diagnostics.notifications_published += initial.len() as u64;
            inner.publish(initial);
        }
        log::info!("Starting call session {}", inner.session_id);

        let weak = Arc::downgrade(inner);
        inner.monitor.attach(move |event| {
            if let Some(inner) = weak.upgrade() {
                inner.handle_event(event);
            }
        })?;

        let camera = inner.gate.check_camera();
        let microphone = inner.gate.check_microphone();
        inner.transition("authorization checked", |inputs, _| {
            inputs.camera_authorization = camera;
            inputs.microphone_authorization = microphone;
        });

        let undetermined: VecDeque<MediaKind> = [(MediaKind::Video, camera), (MediaKind::Audio, microphone)]
            .into_iter()
            .filter(|(_, status)| status.is_undetermined())
            .map(|(kind, _)| kind)
            .collect();
        if !undetermined.is_empty() {
            let suspension = inner.worker.suspend();
            inner.request_next(undetermined, suspension);
        }

        let weak = Arc::downgrade(inner);
        inner.worker.submit(move |session| {
            if let Some(inner) = weak.upgrade() {
                inner.bring_up(session);
            }
        });
        Ok(())
    }

    /// Re-read both authorizations, e.g. after the user came back from the
    /// system settings. Newly granted resources get their devices
    /// acquired; revoked ones have their inputs released.
    pub fn refresh_authorization(&self) {
        let inner = &self.inner;
        if inner.lifecycle() != Lifecycle::Started {
            return;
        }

        for kind in [MediaKind::Video, MediaKind::Audio] {
            if inner.gate.is_pending(kind) {
                continue;
            }
            let current = inner.gate.check(kind);
            let previous = inner.authorization(kind);
            if current == previous || previous == AuthorizationStatus::NotFound {
                continue;
            }
            log::info!("{} authorization changed: {:?} -> {:?}", kind, previous, current);
            inner.transition("authorization refreshed", |inputs, _| match kind {
                MediaKind::Video => inputs.camera_authorization = current,
                MediaKind::Audio => inputs.microphone_authorization = current,
            });

            let weak = Arc::downgrade(inner);
            if current.is_granted() {
                inner.worker.submit(move |session| {
                    if let Some(inner) = weak.upgrade() {
                        inner.acquire(session, kind);
                    }
                });
            } else if previous.is_granted() {
                inner.worker.submit(move |session| {
                    if let Some(inner) = weak.upgrade() {
                        session.configure(|s| s.release(kind));
                        inner.commit(session, "authorization revoked", |_, _| {});
                    }
                });
            }
        }
    }

    /// The user tapped the video control.
    pub fn toggle_video(&self) {
        self.inner.submit_with_inner(Inner::toggle_video);
    }

    /// The user tapped the microphone control.
    pub fn toggle_microphone(&self) {
        self.inner.submit_with_inner(Inner::toggle_microphone);
    }

    /// The user tapped the flip control. A no-op unless both cameras are
    /// held and one of them is active.
    pub fn flip_camera(&self) {
        self.inner.submit_with_inner(Inner::flip_camera);
    }

    /// The screen is going away: detach from interruptions, stop the session
    /// and shut the worker down. Nothing is published afterwards. Safe to
    /// call more than once.
    pub fn teardown(&self) {
        let inner = &self.inner;
        {
            let mut state = inner.state.lock();
            if state.lifecycle == Lifecycle::TornDown {
                return;
            }
            state.lifecycle = Lifecycle::TornDown;
        }
        log::info!("Tearing down call session {}", inner.session_id);

        inner.monitor.detach();
        inner.worker.submit(|session| session.stop_running());
        inner.worker.shutdown();
    }

    /// Last published status.
    pub fn status(&self) -> DerivedStatus {
        self.inner.state.lock().published.clone()
    }

    pub fn authorization(&self, kind: MediaKind) -> AuthorizationStatus {
        self.inner.authorization(kind)
    }

    /// Position of the active camera as of the last transition.
    pub fn camera_position(&self) -> Option<DevicePosition> {
        self.inner.state.lock().inputs.session.active_video
    }

    pub fn session_id(&self) -> &str {
        &self.inner.session_id
    }

    pub fn diagnostics(&self) -> SessionDiagnostics {
        self.inner.state.lock().diagnostics.clone()
    }

    /// Run a read-only closure on the session worker after everything
    /// already queued, and return its result.
    pub fn probe<T, F>(&self, f: F) -> Result<T, CaptureError>
    where
        T: Send + 'static,
        F: FnOnce(&CaptureSession) -> T + Send + 'static,
    {
        self.inner.worker.perform(move |session| f(session))
    }

    /// Wait until pending interruption events and queued session work have
    /// been processed, including events the session work itself caused.
    /// Must not be called while a permission prompt is open.
    pub fn settle(&self) {
        self.inner.monitor.flush();
        if let Err(e) = self.inner.worker.perform(|_| ()) {
            log::debug!("Settle skipped: {}", e);
        }
        self.inner.monitor.flush();
    }
}

impl Drop for SessionOrchestrator {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl Inner {
    fn lifecycle(&self) -> Lifecycle {
        self.state.lock().lifecycle
    }

    fn authorization(&self, kind: MediaKind) -> AuthorizationStatus {
        let state = self.state.lock();
        match kind {
            MediaKind::Video => state.inputs.camera_authorization,
            MediaKind::Audio => state.inputs.microphone_authorization,
        }
    }

    /// Apply `update`, recompute the derived status and publish what changed.
    fn transition(&self, cause: &str, update: impl FnOnce(&mut StatusInputs, &mut SessionDiagnostics)) {
        let mut state = self.state.lock();
        if state.lifecycle == Lifecycle::TornDown {
            log::debug!("Ignoring '{}' after teardown", cause);
            return;
        }

        let OrchestratorState {
            inputs,
            diagnostics,
            ..
        } = &mut *state;
        update(inputs, diagnostics);

        let next = DerivedStatus::derive(&state.inputs);
        let changes = next.changes_since(&state.published);
        state.diagnostics.status = next.clone();
        state.published = next;

        if changes.is_empty() {
            log::debug!("{}: no visible change", cause);
            return;
        }
        log::debug!("{}: {} status change(s)", cause, changes.len());
        if state.lifecycle == Lifecycle::Started {
            state.diagnostics.notifications_published += changes.len() as u64;
            self.publish(changes);
        }
    }

    /// Hand one transition's changes to the sink as a single UI task.
    fn publish(&self, changes: Vec<StatusChange>) {
        let sink = Arc::clone(&self.sink);
        self.ui.post(Box::new(move || {
            for change in &changes {
                change.apply(sink.as_ref());
            }
        }));
    }

    /// Transition that also refreshes the session snapshot.
    fn commit(
        &self,
        session: &CaptureSession,
        cause: &str,
        update: impl FnOnce(&mut StatusInputs, &mut SessionDiagnostics),
    ) {
        let snapshot = session.snapshot();
        self.transition(cause, move |inputs, diagnostics| {
            inputs.session = snapshot;
            update(inputs, diagnostics);
        });
    }

    fn submit_with_inner(self: &Arc<Self>, action: fn(&Inner, &mut CaptureSession)) {
        let weak: Weak<Inner> = Arc::downgrade(self);
        self.worker.submit(move |session| {
            if let Some(inner) = weak.upgrade() {
                action(&inner, session);
            }
        });
    }

    // --- Authorization ---

    /// Prompt for the next undetermined resource; the suspension travels
    /// with the chain and is released after the last answer.
    fn request_next(self: &Arc<Self>, mut pending: VecDeque<MediaKind>, suspension: QueueSuspension) {
        if self.lifecycle() == Lifecycle::TornDown {
            return;
        }
        let Some(kind) = pending.pop_front() else {
            drop(suspension);
            return;
        };

        let weak = Arc::downgrade(self);
        let requested = self.gate.request(kind, move |status| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            inner.transition("authorization resolved", |inputs, _| match kind {
                MediaKind::Video => inputs.camera_authorization = status,
                MediaKind::Audio => inputs.microphone_authorization = status,
            });
            inner.request_next(pending, suspension);
        });
        if let Err(e) = requested {
            log::warn!("Could not request {} access: {}", kind, e);
        }
    }

    // --- Session work (worker thread only) ---

    fn bring_up(&self, session: &mut CaptureSession) {
        if self.lifecycle() != Lifecycle::Started {
            return;
        }
        let camera = self.authorization(MediaKind::Video);
        let microphone = self.authorization(MediaKind::Audio);

        let mut report = AcquisitionReport::default();
        session.configure(|session| {
            session.set_preset(self.config.session_preset);
            if camera.is_granted() {
                self.configure_video(session, &mut report);
            }
            if microphone.is_granted() {
                self.configure_audio(session, &mut report);
            }
        });
        session.start_running();

        self.commit(session, "session configured", |inputs, diagnostics| report.apply(inputs, diagnostics));
    }

    fn acquire(&self, session: &mut CaptureSession, kind: MediaKind) {
        let mut report = AcquisitionReport::default();
        session.configure(|session| match kind {
            MediaKind::Video => self.configure_video(session, &mut report),
            MediaKind::Audio => self.configure_audio(session, &mut report),
        });
        self.commit(session, "devices acquired", |inputs, diagnostics| report.apply(inputs, diagnostics));
    }

    /// Add the preferred camera, falling back to the opposite one, and park
    /// the other if it can be acquired too. Must run inside a bracket.
    fn configure_video(&self, session: &mut CaptureSession, report: &mut AcquisitionReport) {
        if session.holds_video() {
            return;
        }

        let preferred = self.config.preferred_position;
        let mut active = None;
        let mut spare = None;
        for position in [preferred, preferred.opposite()] {
            match self.catalog.acquire_video(position) {
                Acquisition::Acquired(input) if active.is_none() => match session.add_input(input) {
                    Ok(()) => active = Some(position),
                    Err(_) => report.failed(MediaKind::Video, position, AcquisitionFailure::Failed),
                },
                Acquisition::Acquired(input) => spare = Some(input),
                Acquisition::Unavailable(failure) => report.failed(MediaKind::Video, position, failure),
            }
        }

        let Some(position) = active else {
            log::warn!("No camera could be added to the session");
            report.camera_unavailable = true;
            return;
        };
        log::info!("Camera {:?} active", position);
        if let Some(spare) = spare {
            session.park_input(spare);
        }

        if self.state.lock().inputs.camera_intent == CameraIntent::DisabledByUser {
            Self::park_active_video(session);
        }
    }

    fn configure_audio(&self, session: &mut CaptureSession, report: &mut AcquisitionReport) {
        if session.holds_audio() {
            return;
        }

        match self.catalog.acquire_default_audio() {
            Acquisition::Acquired(input) if self.state.lock().microphone_muted => {
                log::info!("Microphone acquired muted");
                session.park_input(input);
            }
            Acquisition::Acquired(input) => {
                if session.add_input(input).is_err() {
                    report.failed(MediaKind::Audio, DevicePosition::Unspecified, AcquisitionFailure::Failed);
                    report.microphone_unavailable = true;
                }
            }
            Acquisition::Unavailable(failure) => {
                report.failed(MediaKind::Audio, DevicePosition::Unspecified, failure);
                report.microphone_unavailable = true;
            }
        }
    }

    fn park_active_video(session: &mut CaptureSession) {
        if let Some(id) = session.video_input().map(DeviceInput::id) {
            if let Some(input) = session.remove_input(id) {
                session.park_input(input);
            }
        }
    }

    fn toggle_video(&self, session: &mut CaptureSession) {
        let (camera, intent) = {
            let state = self.state.lock();
            (state.inputs.camera_authorization, state.inputs.camera_intent)
        };
        if !camera.is_granted() {
            log::debug!("Video toggle ignored: camera is {:?}", camera);
            return;
        }

        match intent {
            CameraIntent::On => {
                session.configure(Self::park_active_video);
                self.commit(session, "camera turned off by user", |inputs, _| {
                    inputs.camera_intent = CameraIntent::DisabledByUser;
                });
            }
            CameraIntent::DisabledByUser => {
                let preferred = session.last_video_position().unwrap_or(self.config.preferred_position);
                session.configure(|s| {
                    let input = s
                        .take_parked_video(preferred)
                        .or_else(|| s.take_parked_video(preferred.opposite()));
                    if let Some(input) = input {
                        if let Err(input) = s.add_input(input) {
                            log::warn!("Camera {:?} could not be re-added", input.position());
                            s.park_input(input);
                        }
                    }
                });
                self.commit(session, "camera turned on by user", |inputs, _| {
                    inputs.camera_intent = CameraIntent::On;
                });
            }
        }
    }

    fn toggle_microphone(&self, session: &mut CaptureSession) {
        if let Some(id) = session.audio_input().map(DeviceInput::id) {
            session.configure(|s| {
                if let Some(input) = s.remove_input(id) {
                    s.park_input(input);
                }
            });
            self.state.lock().microphone_muted = true;
            self.commit(session, "microphone turned off", |_, _| {});
            return;
        }

        if let Some(input) = session.take_parked_audio() {
            session.configure(|s| {
                if let Err(input) = s.add_input(input) {
                    log::warn!("Microphone could not be re-added");
                    s.park_input(input);
                }
            });
            self.state.lock().microphone_muted = session.audio_input().is_none();
            self.commit(session, "microphone turned on", |_, _| {});
            return;
        }

        match self.authorization(MediaKind::Audio) {
            AuthorizationStatus::Authorized | AuthorizationStatus::NotFound => {
                self.commit(session, "microphone toggled without input", |inputs, _| {
                    inputs.microphone_authorization = AuthorizationStatus::NotFound;
                });
            }
            // NotFound is never refreshed, so a denial must not become one.
            status => log::debug!("Microphone toggle ignored: microphone is {:?}", status),
        }
    }

    fn flip_camera(&self, session: &mut CaptureSession) {
        if !self.authorization(MediaKind::Video).is_granted() || !session.snapshot().can_flip() {
            log::debug!("Flip ignored: not available");
            return;
        }
        let Some(current) = session.video_input().map(DeviceInput::position) else {
            return;
        };

        match session.swap_video(current.opposite()) {
            Ok(()) => log::info!("Camera flipped to {:?}", current.opposite()),
            Err(e) => log::warn!("Camera flip failed: {}", e),
        }
        self.commit(session, "camera flipped", |_, _| {});
    }

    // --- System events (monitor thread) ---

    fn handle_event(self: &Arc<Self>, event: InterruptionEvent) {
        self.transition("system event", |inputs, diagnostics| {
            if let Some(reason) = event.reason() {
                diagnostics.record_interruption(reason);
            }
            match event {
                InterruptionEvent::Interrupted(reason) => inputs.interruptions.interrupt(reason),
                InterruptionEvent::ThermalStateChanged(state) => inputs.interruptions.thermal(state),
                InterruptionEvent::RunningStateChanged(true) => inputs.interruptions.end_session_interruption(),
                InterruptionEvent::RunningStateChanged(false) => inputs
                    .interruptions
                    .interrupt(InterruptionReason::SessionStoppedUnexpectedly),
            }
        });

        if event == InterruptionEvent::Interrupted(InterruptionReason::RuntimeError)
            && self.config.restart_on_runtime_error
        {
            let weak = Arc::downgrade(self);
            self.worker.submit(move |session| {
                if session.is_running() {
                    return;
                }
                log::info!("Restarting session after runtime error");
                session.start_running();
                if let Some(inner) = weak.upgrade() {
                    inner.commit(session, "session restarted", |_, _| {});
                }
            });
        }
    }
}
