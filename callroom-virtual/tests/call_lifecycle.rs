mod common;

use std::collections::HashSet;

use callroom_core::{
    AcquisitionFailure, AuthorizationStatus, CaptureError, Control, DerivedStatus, DevicePosition, DisabledReason, MediaKind,
    OrchestratorConfig, PermissionState, PlatformInterruption, SessionPreset,
};
use callroom_virtual::device_enumerator::{BACK_CAMERA_ID, BUILT_IN_MIC_ID, FRONT_CAMERA_ID};
use callroom_virtual::{PromptResponse, VirtualDevices, VirtualPermissions, VirtualPlatform};

use common::Call;

#[test]
fn first_launch_prompts_then_brings_up_back_camera_and_microphone() {
    let call = Call::started(VirtualPlatform::phone());

    assert_eq!(call.platform.permissions.prompts(), vec![MediaKind::Video, MediaKind::Audio]);

    let status = call.orchestrator.status();
    assert_eq!(status.camera_authorization, AuthorizationStatus::Authorized);
    assert_eq!(status.microphone_authorization, AuthorizationStatus::Authorized);
    assert!(status.camera_on);
    assert!(status.microphone_on);
    assert!(status.flip_available);
    assert_eq!(status.disabled_reason, None);
    assert_eq!(call.orchestrator.camera_position(), Some(DevicePosition::Back));

    assert_eq!(call.sink.reason_text(), "");
    assert_eq!(call.sink.overlay_hidden(), Some(true));
    assert_eq!(call.sink.is_disabled(Control::Video), Some(false));
    assert_eq!(call.sink.is_active(Control::Video), Some(true));
    assert_eq!(call.sink.is_active(Control::Microphone), Some(true));
    assert_eq!(call.sink.is_disabled(Control::FlipCamera), Some(false));

    let committed = call.platform.probe.last_committed().unwrap();
    assert_eq!(committed.video_position(), Some(DevicePosition::Back));
    assert!(committed.has_audio());
    assert!(call.platform.probe.is_running());
}

#[test]
fn initial_sync_covers_every_control() {
    let call = Call::new(VirtualPlatform::new(VirtualPermissions::authorized(), VirtualDevices::phone()));
    call.orchestrator.start().unwrap();
    call.settle();

    let first_seven: Vec<_> = call.sink.changes().into_iter().take(7).collect();
    assert_eq!(first_seven, DerivedStatus::initial().full_sync());
}

#[test]
fn denied_camera_keeps_microphone_working() {
    let platform = VirtualPlatform::phone();
    platform.permissions.respond_with(MediaKind::Video, PromptResponse::Deny);
    let call = Call::started(platform);

    let status = call.orchestrator.status();
    assert_eq!(status.camera_authorization, AuthorizationStatus::Denied);
    assert!(!status.camera_on);
    assert!(!status.flip_available);
    assert!(status.microphone_on);
    assert_eq!(status.disabled_reason, Some(DisabledReason::NotAuthorized));

    assert_eq!(call.sink.reason_text(), DisabledReason::NotAuthorized.text());
    assert_eq!(call.sink.is_disabled(Control::Video), Some(true));
    assert_eq!(call.sink.overlay_hidden(), Some(false));
    assert_eq!(call.platform.probe.last_committed().unwrap().video_position(), None);
}

#[test]
fn restricted_camera_counts_as_denied_without_prompt() {
    let permissions = VirtualPermissions::authorized();
    permissions.set_state(MediaKind::Video, PermissionState::Restricted);
    let call = Call::started(VirtualPlatform::new(permissions, VirtualDevices::phone()));

    assert!(call.platform.permissions.prompts().is_empty());
    assert_eq!(call.orchestrator.authorization(MediaKind::Video), AuthorizationStatus::Denied);
}

#[test]
fn session_stays_unconfigured_while_prompt_is_open() {
    let platform = VirtualPlatform::phone();
    platform.permissions.respond_with(MediaKind::Video, PromptResponse::Defer);
    let call = Call::new(platform);
    call.orchestrator.start().unwrap();
    call.ui.flush();

    assert!(call.platform.permissions.has_open_prompt(MediaKind::Video));
    assert!(call.platform.probe.committed().is_empty());
    assert!(!call.platform.probe.is_running());
    assert_eq!(call.sink.reason_text(), DisabledReason::AwaitingAuthorization.text());

    assert!(call.platform.permissions.resolve_pending(MediaKind::Video, true));
    call.settle();

    assert!(call.orchestrator.status().camera_on);
    assert_eq!(call.platform.permissions.prompts(), vec![MediaKind::Video, MediaKind::Audio]);
    assert_eq!(call.platform.probe.committed().len(), 1);
}

#[test]
fn no_cameras_reports_no_camera_available() {
    let devices = VirtualDevices::phone();
    devices.detach(FRONT_CAMERA_ID);
    devices.detach(BACK_CAMERA_ID);
    let call = Call::started(VirtualPlatform::new(VirtualPermissions::authorized(), devices));

    let status = call.orchestrator.status();
    assert_eq!(status.camera_authorization, AuthorizationStatus::NotFound);
    assert_eq!(status.disabled_reason, Some(DisabledReason::NoCameraAvailable));
    assert!(status.microphone_on);

    let failures = call.orchestrator.diagnostics().acquisition_failures;
    assert_eq!(failures.len(), 2);
    assert!(failures.iter().all(|f| f.failure == AcquisitionFailure::NotFound));
}

#[test]
fn missing_microphone_is_not_found_without_prompt() {
    let devices = VirtualDevices::phone();
    devices.detach(BUILT_IN_MIC_ID);
    let call = Call::started(VirtualPlatform::new(VirtualPermissions::new(), devices));

    assert_eq!(call.platform.permissions.prompts(), vec![MediaKind::Video]);
    assert_eq!(call.orchestrator.authorization(MediaKind::Audio), AuthorizationStatus::NotFound);
    assert_eq!(call.sink.is_disabled(Control::Microphone), Some(true));
    assert!(call.orchestrator.status().camera_on);
}

#[test]
fn busy_preferred_camera_falls_back_without_flip() {
    let devices = VirtualDevices::phone();
    devices.set_busy(BACK_CAMERA_ID, true);
    let call = Call::started(VirtualPlatform::new(VirtualPermissions::authorized(), devices));

    assert_eq!(call.orchestrator.camera_position(), Some(DevicePosition::Front));
    assert!(call.orchestrator.status().camera_on);
    assert!(!call.orchestrator.status().flip_available);

    let failures = call.orchestrator.diagnostics().acquisition_failures;
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].position, DevicePosition::Back);
    assert_eq!(failures[0].failure, AcquisitionFailure::Failed);
}

#[test]
fn rejected_camera_input_falls_back_to_opposite() {
    let platform = VirtualPlatform::new(VirtualPermissions::authorized(), VirtualDevices::phone());
    platform.probe.reject(BACK_CAMERA_ID);
    let call = Call::started(platform);

    assert_eq!(call.orchestrator.camera_position(), Some(DevicePosition::Front));
    assert!(!call.orchestrator.status().flip_available);
}

#[test]
fn preferred_front_camera_is_used_first() {
    let config = OrchestratorConfig {
        preferred_position: DevicePosition::Front,
        ..OrchestratorConfig::default()
    };
    let call = Call::with_config(
        VirtualPlatform::new(VirtualPermissions::authorized(), VirtualDevices::phone()),
        config,
    );
    call.orchestrator.start().unwrap();
    call.settle();

    assert_eq!(call.orchestrator.camera_position(), Some(DevicePosition::Front));
    assert!(call.orchestrator.status().flip_available);
}

#[test]
fn configured_preset_is_committed_with_the_inputs() {
    let config = OrchestratorConfig {
        session_preset: SessionPreset::Low,
        ..OrchestratorConfig::default()
    };
    let call = Call::with_config(
        VirtualPlatform::new(VirtualPermissions::authorized(), VirtualDevices::phone()),
        config,
    );
    call.orchestrator.start().unwrap();
    call.settle();

    let committed = call.platform.probe.last_committed().unwrap();
    assert_eq!(committed.preset, SessionPreset::Low);
    assert_eq!(committed.video_position(), Some(DevicePosition::Back));
    assert_eq!(call.platform.probe.committed().len(), 1);
}

#[test]
fn unspecified_preferred_position_is_rejected() {
    let platform = VirtualPlatform::phone();
    let config = OrchestratorConfig {
        preferred_position: DevicePosition::Unspecified,
        ..OrchestratorConfig::default()
    };
    let sink = std::sync::Arc::new(callroom_virtual::RecordingStatusSink::new());
    let ui = std::sync::Arc::new(callroom_core::UiThread::spawn().unwrap());
    let result = callroom_core::SessionOrchestrator::new(config, platform.services(), sink, ui);
    assert!(matches!(result, Err(CaptureError::InvalidConfiguration(_))));
}

#[test]
fn start_twice_or_after_teardown_fails() {
    let call = Call::started(VirtualPlatform::phone());
    assert_eq!(call.orchestrator.start(), Err(CaptureError::SessionAlreadyStarted));

    call.orchestrator.teardown();
    assert_eq!(call.orchestrator.start(), Err(CaptureError::SessionTornDown));
}

#[test]
fn teardown_is_idempotent_and_silences_the_sink() {
    let call = Call::started(VirtualPlatform::phone());
    call.orchestrator.teardown();
    call.orchestrator.teardown();
    call.ui.flush();

    assert!(!call.platform.probe.is_running());
    assert_eq!(call.platform.probe.stop_count(), 1);
    assert_eq!(call.platform.notifications.subscriber_count(), 0);

    call.sink.clear_history();
    call.platform
        .notifications
        .interrupt(PlatformInterruption::VideoDeviceInUseByAnotherClient);
    call.orchestrator.toggle_video();
    call.orchestrator.refresh_authorization();
    call.orchestrator.settle();
    call.ui.flush();

    assert!(call.sink.changes().is_empty());
}

#[test]
fn teardown_with_open_prompt_never_configures() {
    let platform = VirtualPlatform::phone();
    platform.permissions.respond_with(MediaKind::Video, PromptResponse::Defer);
    let call = Call::new(platform);
    call.orchestrator.start().unwrap();

    call.orchestrator.teardown();
    assert!(call.platform.permissions.resolve_pending(MediaKind::Video, true));
    call.ui.flush();

    assert!(call.platform.probe.committed().is_empty());
    assert_eq!(call.platform.permissions.prompts(), vec![MediaKind::Video]);
}

#[test]
fn work_stays_on_its_threads() {
    let call = Call::started(VirtualPlatform::phone());
    call.orchestrator.flip_camera();
    call.orchestrator.toggle_microphone();
    call.platform.notifications.end_interruption();
    call.settle();

    assert_eq!(call.sink.threads(), HashSet::from(["ui-context".to_string()]));
    assert_eq!(call.platform.probe.threads(), HashSet::from(["capture-session".to_string()]));
}

#[test]
fn diagnostics_export_as_json() {
    let call = Call::started(VirtualPlatform::phone());
    call.platform
        .notifications
        .interrupt(PlatformInterruption::VideoDeviceNotAvailableInBackground);
    call.settle();

    let diagnostics = call.orchestrator.diagnostics();
    assert_eq!(diagnostics.session_id, call.orchestrator.session_id());
    assert!(diagnostics.notifications_published >= 7);

    let json = diagnostics.to_json().unwrap();
    assert!(json.contains(call.orchestrator.session_id()));
    assert!(json.contains("backgroundedApp"));
}
