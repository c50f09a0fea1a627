//! In-memory camera and microphone enumeration.
//!
//! Devices can be attached, detached and marked busy at any time; every
//! query reflects the current set, like the platform enumerator does.

use std::collections::HashSet;

use parking_lot::Mutex;

use callroom_core::models::device::{DeviceDescriptor, DeviceInput, DevicePosition, MediaKind};
use callroom_core::models::error::CaptureError;
use callroom_core::traits::device_provider::DeviceProvider;

pub const FRONT_CAMERA_ID: &str = "camera-front";
pub const BACK_CAMERA_ID: &str = "camera-back";
pub const BUILT_IN_MIC_ID: &str = "mic-built-in";

/// Virtual device enumerator.
pub struct VirtualDevices {
    devices: Mutex<Vec<DeviceDescriptor>>,
    busy: Mutex<HashSet<String>>,
    default_microphone: Mutex<Option<String>>,
}

impl VirtualDevices {
    /// No devices attached.
    pub fn empty() -> Self {
        Self {
            devices: Mutex::new(Vec::new()),
            busy: Mutex::new(HashSet::new()),
            default_microphone: Mutex::new(None),
        }
    }

    /// A phone: front and back cameras plus a built-in microphone.
    pub fn phone() -> Self {
        let devices = Self::empty();
        devices.attach(DeviceDescriptor::camera(FRONT_CAMERA_ID, "Front Camera", DevicePosition::Front));
        devices.attach(DeviceDescriptor::camera(BACK_CAMERA_ID, "Back Camera", DevicePosition::Back));
        devices.attach(DeviceDescriptor::microphone(BUILT_IN_MIC_ID, "iPhone Microphone"));
        devices
    }

    /// Plug a device in. Replaces an existing device with the same id.
    pub fn attach(&self, device: DeviceDescriptor) {
        let mut devices = self.devices.lock();
        devices.retain(|d| d.id != device.id);
        devices.push(device);
    }

    /// Unplug a device. Inputs already opened stay valid.
    pub fn detach(&self, id: &str) {
        self.devices.lock().retain(|d| d.id != id);
        let mut default = self.default_microphone.lock();
        if default.as_deref() == Some(id) {
            *default = None;
        }
    }

    /// Busy devices enumerate normally but cannot be opened.
    pub fn set_busy(&self, id: &str, busy: bool) {
        let mut set = self.busy.lock();
        if busy {
            set.insert(id.to_string());
        } else {
            set.remove(id);
        }
    }

    pub fn set_default_microphone(&self, id: &str) {
        *self.default_microphone.lock() = Some(id.to_string());
    }
}

impl DeviceProvider for VirtualDevices {
    fn devices(&self, kind: MediaKind) -> Vec<DeviceDescriptor> {
        self.devices.lock().iter().filter(|d| d.kind == kind).cloned().collect()
    }

    fn default_device(&self, kind: MediaKind) -> Option<DeviceDescriptor> {
        let devices = self.devices.lock();
        if kind == MediaKind::Audio {
            if let Some(id) = self.default_microphone.lock().as_deref() {
                if let Some(device) = devices.iter().find(|d| d.id == id) {
                    return Some(device.clone());
                }
            }
        }
        devices.iter().find(|d| d.kind == kind).cloned()
    }

    fn open_input(&self, device: &DeviceDescriptor) -> Result<DeviceInput, CaptureError> {
        if !self.devices.lock().iter().any(|d| d.id == device.id) {
            return Err(CaptureError::DeviceNotAvailable);
        }
        if self.busy.lock().contains(&device.id) {
            return Err(CaptureError::DeviceBusy(device.name.clone()));
        }
        log::debug!("Opened virtual {} input {}", device.kind, device.name);
        Ok(DeviceInput::new(device.clone()))
    }
}
