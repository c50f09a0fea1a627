use crate::models::device::{DeviceDescriptor, DeviceInput, MediaKind};
use crate::models::error::CaptureError;

/// Platform device enumeration.
///
/// Every call reflects the hardware present right now; results are not
/// expected to be cached by the implementation.
pub trait DeviceProvider: Send + Sync {
    /// Devices of `kind` currently attached.
    fn devices(&self, kind: MediaKind) -> Vec<DeviceDescriptor>;

    /// The system default device of `kind`, if any.
    fn default_device(&self, kind: MediaKind) -> Option<DeviceDescriptor>;

    /// Open `device` as an input that can be added to a capture session.
    fn open_input(&self, device: &DeviceDescriptor) -> Result<DeviceInput, CaptureError>;
}
