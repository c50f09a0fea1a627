use std::sync::Arc;

use crate::models::interruption::{SystemNotification, ThermalState};

/// Handler registered with a `NotificationSource`.
///
/// Called on whatever thread the platform posts from; keep it short.
pub type NotificationHandler = Arc<dyn Fn(SystemNotification) + Send + Sync + 'static>;

/// Opaque handle returned by `subscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionToken(pub u64);

/// Platform notification center for capture-session events.
pub trait NotificationSource: Send + Sync {
    fn subscribe(&self, handler: NotificationHandler) -> SubscriptionToken;

    /// Remove a handler. Unknown tokens are ignored.
    fn unsubscribe(&self, token: SubscriptionToken);

    /// Current thermal level. Only read after a thermal notification.
    fn thermal_state(&self) -> ThermalState;
}
