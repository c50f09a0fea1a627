mod common;

use callroom_core::{
    AuthorizationStatus, Control, DevicePosition, DisabledReason, MediaKind, PermissionState, PlatformInterruption,
    StatusChange, ThermalState,
};
use callroom_virtual::device_enumerator::{BUILT_IN_MIC_ID, FRONT_CAMERA_ID};
use callroom_virtual::{VirtualDevices, VirtualPermissions, VirtualPlatform};

use common::Call;

#[test]
fn granted_prompt_with_only_back_camera() {
    let devices = VirtualDevices::phone();
    devices.detach(FRONT_CAMERA_ID);
    let call = Call::started(VirtualPlatform::new(VirtualPermissions::new(), devices));

    let status = call.orchestrator.status();
    assert!(status.camera_on);
    assert!(!status.flip_available);
    assert_eq!(call.orchestrator.camera_position(), Some(DevicePosition::Back));
    assert_eq!(call.sink.is_disabled(Control::FlipCamera), Some(true));
}

#[test]
fn flip_there_and_back_keeps_flip_available() {
    let call = Call::started(VirtualPlatform::new(VirtualPermissions::authorized(), VirtualDevices::phone()));
    call.sink.clear_history();

    call.orchestrator.flip_camera();
    call.settle();
    assert_eq!(call.orchestrator.camera_position(), Some(DevicePosition::Front));
    assert!(call.orchestrator.status().flip_available);

    call.orchestrator.flip_camera();
    call.settle();
    assert_eq!(call.orchestrator.camera_position(), Some(DevicePosition::Back));
    assert!(call.orchestrator.status().flip_available);

    assert!(!call.sink.changes().iter().any(|c| matches!(
        c,
        StatusChange::ControlDisabled {
            control: Control::FlipCamera,
            ..
        }
    )));
}

#[test]
fn system_pressure_then_fair_thermal_restores_camera() {
    let call = Call::started(VirtualPlatform::new(VirtualPermissions::authorized(), VirtualDevices::phone()));

    call.platform
        .notifications
        .interrupt(PlatformInterruption::VideoDeviceNotAvailableDueToSystemPressure);
    call.settle();
    assert!(!call.orchestrator.status().camera_on);
    assert_eq!(call.sink.reason_text(), DisabledReason::ThermalCritical.text());

    // Unrelated notifications leave the thermal text in place.
    call.orchestrator.toggle_microphone();
    call.settle();
    assert_eq!(call.sink.reason_text(), DisabledReason::ThermalCritical.text());

    call.platform.notifications.set_thermal_state(ThermalState::Fair);
    call.settle();
    assert!(call.orchestrator.status().camera_on);
    assert_eq!(call.sink.reason_text(), "");
}

#[test]
fn no_microphone_hardware_makes_toggle_a_noop() {
    let devices = VirtualDevices::phone();
    devices.detach(BUILT_IN_MIC_ID);
    let call = Call::started(VirtualPlatform::new(VirtualPermissions::authorized(), devices));

    let status = call.orchestrator.status();
    assert_eq!(status.microphone_authorization, AuthorizationStatus::NotFound);
    assert!(!status.microphone_on);

    call.sink.clear_history();
    let commits = call.platform.probe.committed().len();
    call.orchestrator.toggle_microphone();
    call.settle();

    assert_eq!(call.orchestrator.status(), status);
    assert!(call.sink.changes().is_empty());
    assert_eq!(call.platform.probe.committed().len(), commits);
}

#[test]
fn every_swap_leaves_a_video_input_in_place() {
    let call = Call::started(VirtualPlatform::new(VirtualPermissions::authorized(), VirtualDevices::phone()));

    for _ in 0..6 {
        call.orchestrator.flip_camera();
        let present = call
            .orchestrator
            .probe(|session| session.video_input().is_some())
            .unwrap();
        assert!(present);
    }
    assert!(call
        .platform
        .probe
        .committed()
        .iter()
        .all(|c| c.video_position().is_some()));
}

#[test]
fn flip_never_changes_anything_while_unavailable() {
    let devices = VirtualDevices::phone();
    devices.detach(FRONT_CAMERA_ID);
    let call = Call::started(VirtualPlatform::new(VirtualPermissions::authorized(), devices));

    let histories: [fn(&Call); 3] = [
        |_| {},
        |call| call.orchestrator.toggle_video(),
        |call| {
            call.platform
                .notifications
                .interrupt(PlatformInterruption::VideoDeviceInUseByAnotherClient)
        },
    ];
    for history in histories {
        history(&call);
        call.settle();
        assert!(!call.orchestrator.status().flip_available);

        let before = (call.orchestrator.status(), call.orchestrator.camera_position());
        call.orchestrator.flip_camera();
        call.settle();
        assert_eq!((call.orchestrator.status(), call.orchestrator.camera_position()), before);
    }
}

#[test]
fn camera_is_never_on_without_authorization() {
    let call = Call::started(VirtualPlatform::new(VirtualPermissions::authorized(), VirtualDevices::phone()));
    let sequence = [
        PermissionState::Denied,
        PermissionState::Authorized,
        PermissionState::Restricted,
        PermissionState::Authorized,
        PermissionState::Denied,
        PermissionState::Denied,
        PermissionState::Authorized,
    ];

    for state in sequence {
        call.platform.permissions.set_state(MediaKind::Video, state);
        call.orchestrator.refresh_authorization();
        call.orchestrator.flip_camera();
        call.settle();

        let status = call.orchestrator.status();
        if status.camera_on {
            assert_eq!(status.camera_authorization, AuthorizationStatus::Authorized);
        }
        assert_eq!(status.camera_on, state == PermissionState::Authorized);
        assert_eq!(call.sink.is_active(Control::Video), Some(status.camera_on));
    }
}
