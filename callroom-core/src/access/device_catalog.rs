use std::sync::Arc;

use crate::models::authorization::AcquisitionFailure;
use crate::models::device::{DeviceInput, DevicePosition, MediaKind};
use crate::traits::device_provider::DeviceProvider;

/// Result of trying to open an input.
#[derive(Debug)]
pub enum Acquisition {
    Acquired(DeviceInput),
    Unavailable(AcquisitionFailure),
}

impl Acquisition {
    pub fn into_input(self) -> Option<DeviceInput> {
        match self {
            Self::Acquired(input) => Some(input),
            Self::Unavailable(_) => None,
        }
    }

    pub fn failure(&self) -> Option<AcquisitionFailure> {
        match self {
            Self::Acquired(_) => None,
            Self::Unavailable(failure) => Some(*failure),
        }
    }
}

/// Looks up cameras by facing position and the default microphone, and
/// opens them as session inputs.
///
/// Every lookup enumerates again: accessories come and go between attempts.
pub struct DeviceCatalog {
    provider: Arc<dyn DeviceProvider>,
}

impl DeviceCatalog {
    pub fn new(provider: Arc<dyn DeviceProvider>) -> Self {
        Self { provider }
    }

    /// Open the first camera facing `position`.
    pub fn acquire_video(&self, position: DevicePosition) -> Acquisition {
        let Some(device) = self
            .provider
            .devices(MediaKind::Video)
            .into_iter()
            .find(|d| d.position == position)
        else {
            log::debug!("No {:?} camera attached", position);
            return Acquisition::Unavailable(AcquisitionFailure::NotFound);
        };

        match self.provider.open_input(&device) {
            Ok(input) => Acquisition::Acquired(input),
            Err(e) => {
                log::warn!("Failed to open camera {}: {}", device.name, e);
                Acquisition::Unavailable(AcquisitionFailure::Failed)
            }
        }
    }

    /// Open the system default microphone.
    pub fn acquire_default_audio(&self) -> Acquisition {
        let Some(device) = self.provider.default_device(MediaKind::Audio) else {
            log::debug!("No default microphone");
            return Acquisition::Unavailable(AcquisitionFailure::NotFound);
        };

        match self.provider.open_input(&device) {
            Ok(input) => Acquisition::Acquired(input),
            Err(e) => {
                log::warn!("Failed to open microphone {}: {}", device.name, e);
                Acquisition::Unavailable(AcquisitionFailure::Failed)
            }
        }
    }

    pub fn video_input(&self, position: DevicePosition) -> Option<DeviceInput> {
        self.acquire_video(position).into_input()
    }

    pub fn default_audio_input(&self) -> Option<DeviceInput> {
        self.acquire_default_audio().into_input()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::device::DeviceDescriptor;
    use crate::models::error::CaptureError;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct FakeDevices {
        attached: Mutex<Vec<DeviceDescriptor>>,
        busy: Mutex<Vec<String>>,
    }

    impl DeviceProvider for FakeDevices {
        fn devices(&self, kind: MediaKind) -> Vec<DeviceDescriptor> {
            self.attached.lock().iter().filter(|d| d.kind == kind).cloned().collect()
        }

        fn default_device(&self, kind: MediaKind) -> Option<DeviceDescriptor> {
            self.devices(kind).into_iter().next()
        }

        fn open_input(&self, device: &DeviceDescriptor) -> Result<DeviceInput, CaptureError> {
            if self.busy.lock().contains(&device.id) {
                return Err(CaptureError::DeviceBusy(device.id.clone()));
            }
            Ok(DeviceInput::new(device.clone()))
        }
    }

    #[test]
    fn finds_camera_by_position() {
        let devices = Arc::new(FakeDevices::default());
        devices.attached.lock().extend([
            DeviceDescriptor::camera("front", "Front Camera", DevicePosition::Front),
            DeviceDescriptor::camera("back", "Back Camera", DevicePosition::Back),
        ]);
        let catalog = DeviceCatalog::new(devices);

        let input = catalog.video_input(DevicePosition::Front).unwrap();
        assert_eq!(input.device().id, "front");
        assert_eq!(input.position(), DevicePosition::Front);
    }

    #[test]
    fn absence_and_failure_are_distinguished() {
        let devices = Arc::new(FakeDevices::default());
        devices.attached.lock().push(DeviceDescriptor::camera("back", "Back Camera", DevicePosition::Back));
        devices.busy.lock().push("back".into());
        let catalog = DeviceCatalog::new(devices);

        assert_eq!(catalog.acquire_video(DevicePosition::Front).failure(), Some(AcquisitionFailure::NotFound));
        assert_eq!(catalog.acquire_video(DevicePosition::Back).failure(), Some(AcquisitionFailure::Failed));
        assert!(catalog.video_input(DevicePosition::Back).is_none());
    }

    #[test]
    fn enumerates_on_every_call() {
        let devices = Arc::new(FakeDevices::default());
        let catalog = DeviceCatalog::new(Arc::clone(&devices) as Arc<dyn DeviceProvider>);
        assert!(catalog.default_audio_input().is_none());

        devices.attached.lock().push(DeviceDescriptor::microphone("mic", "USB Microphone"));
        let input = catalog.default_audio_input().unwrap();
        assert_eq!(input.kind(), MediaKind::Audio);
    }
}
