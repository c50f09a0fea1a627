use crate::models::authorization::PermissionState;
use crate::models::device::MediaKind;

/// Completion for a permission prompt. `true` when access was granted.
pub type AccessCompletion = Box<dyn FnOnce(bool) + Send + 'static>;

/// Platform permission store for camera and microphone access.
pub trait PermissionProvider: Send + Sync {
    /// The decision the platform has cached for `kind`. Must not block.
    fn authorization_state(&self, kind: MediaKind) -> PermissionState;

    /// Show the system prompt for `kind`.
    ///
    /// `completion` is called at most once, from any thread, possibly before
    /// this method returns. Dropping it without calling means the prompt
    /// never resolved.
    fn request_access(&self, kind: MediaKind, completion: AccessCompletion);
}
