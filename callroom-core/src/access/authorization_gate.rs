use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::authorization::AuthorizationStatus;
use crate::models::device::MediaKind;
use crate::models::error::CaptureError;
use crate::traits::device_provider::DeviceProvider;
use crate::traits::permission_provider::PermissionProvider;

/// Camera and microphone permission checks.
///
/// `check` reads the platform's cached decision. `request` shows the system
/// prompt when the decision is still open and resolves exactly once.
pub struct AuthorizationGate {
    permissions: Arc<dyn PermissionProvider>,
    devices: Arc<dyn DeviceProvider>,
    pending: Arc<Mutex<HashSet<MediaKind>>>,
}

impl AuthorizationGate {
    pub fn new(permissions: Arc<dyn PermissionProvider>, devices: Arc<dyn DeviceProvider>) -> Self {
        Self {
            permissions,
            devices,
            pending: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Cached authorization for `kind`.
    ///
    /// A microphone reports `NotFound` when there is no default input,
    /// whatever the permission store says.
    pub fn check(&self, kind: MediaKind) -> AuthorizationStatus {
        if kind == MediaKind::Audio && self.devices.default_device(MediaKind::Audio).is_none() {
            return AuthorizationStatus::NotFound;
        }
        self.permissions.authorization_state(kind).into()
    }

    pub fn check_camera(&self) -> AuthorizationStatus {
        self.check(MediaKind::Video)
    }

    pub fn check_microphone(&self) -> AuthorizationStatus {
        self.check(MediaKind::Audio)
    }

    /// Whether a prompt for `kind` is waiting on the user.
    pub fn is_pending(&self, kind: MediaKind) -> bool {
        self.pending.lock().contains(&kind)
    }

    /// Resolve the authorization for `kind`, prompting if undetermined.
    ///
    /// A decided status is handed to `completion` immediately. Otherwise the
    /// system prompt is shown and `completion` runs when the user answers,
    /// on whatever thread the platform uses. Fails without calling
    /// `completion` if a prompt for `kind` is already showing.
    pub fn request<F>(&self, kind: MediaKind, completion: F) -> Result<(), CaptureError>
    where
        F: FnOnce(AuthorizationStatus) + Send + 'static,
    {
        let current = self.check(kind);
        if !current.is_undetermined() {
            completion(current);
            return Ok(());
        }

        if !self.pending.lock().insert(kind) {
            return Err(CaptureError::AuthorizationPending(kind));
        }

        log::info!("Requesting {} access", kind);
        let pending = Arc::clone(&self.pending);
        // The lock is released here: providers may answer synchronously.
        self.permissions.request_access(
            kind,
            Box::new(move |granted| {
                pending.lock().remove(&kind);
                let status = if granted {
                    AuthorizationStatus::Authorized
                } else {
                    AuthorizationStatus::Denied
                };
                log::info!("{} access resolved: {:?}", kind, status);
                completion(status);
            }),
        );
        Ok(())
    }
}
