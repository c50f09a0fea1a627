use std::sync::Arc;

use callroom_core::session::orchestrator::PlatformServices;

use crate::device_enumerator::VirtualDevices;
use crate::notification_center::VirtualNotificationCenter;
use crate::permissions::VirtualPermissions;
use crate::virtual_session::{BackendProbe, VirtualCaptureBackend};

/// A complete virtual platform with handles kept for the test to drive.
pub struct VirtualPlatform {
    pub permissions: Arc<VirtualPermissions>,
    pub devices: Arc<VirtualDevices>,
    pub notifications: Arc<VirtualNotificationCenter>,
    pub probe: BackendProbe,
}

impl VirtualPlatform {
    pub fn new(permissions: VirtualPermissions, devices: VirtualDevices) -> Self {
        Self {
            permissions: Arc::new(permissions),
            devices: Arc::new(devices),
            notifications: Arc::new(VirtualNotificationCenter::new()),
            probe: BackendProbe::default(),
        }
    }

    /// Two cameras and a microphone, nothing decided yet.
    pub fn phone() -> Self {
        Self::new(VirtualPermissions::new(), VirtualDevices::phone())
    }

    /// The services an orchestrator is built from. Each call creates a fresh
    /// pipeline reporting to the same probe.
    pub fn services(&self) -> PlatformServices {
        let backend = VirtualCaptureBackend::new(self.probe.clone()).with_notifications(Arc::clone(&self.notifications));
        PlatformServices {
            permissions: Arc::clone(&self.permissions) as _,
            devices: Arc::clone(&self.devices) as _,
            notifications: Arc::clone(&self.notifications) as _,
            backend: Box::new(backend),
        }
    }
}
