//! Injectable capture-session notifications.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use callroom_core::models::interruption::{PlatformInterruption, SystemNotification, ThermalState};
use callroom_core::traits::notification_source::{NotificationHandler, NotificationSource, SubscriptionToken};

/// A notification center tests post to directly.
///
/// Handlers run synchronously on the posting thread, as the platform
/// center does.
pub struct VirtualNotificationCenter {
    handlers: Mutex<Vec<(SubscriptionToken, NotificationHandler)>>,
    next_token: AtomicU64,
    thermal: Mutex<ThermalState>,
}

impl VirtualNotificationCenter {
    pub fn new() -> Self {
        Self {
            handlers: Mutex::new(Vec::new()),
            next_token: AtomicU64::new(1),
            thermal: Mutex::new(ThermalState::Nominal),
        }
    }

    pub fn post(&self, notification: SystemNotification) {
        // Handlers may unsubscribe while being called.
        let handlers: Vec<NotificationHandler> = self.handlers.lock().iter().map(|(_, h)| Arc::clone(h)).collect();
        log::trace!("Posting {:?} to {} handler(s)", notification, handlers.len());
        for handler in handlers {
            handler(notification.clone());
        }
    }

    pub fn interrupt(&self, reason: PlatformInterruption) {
        self.post(SystemNotification::SessionInterrupted { reason });
    }

    pub fn end_interruption(&self) {
        self.post(SystemNotification::InterruptionEnded);
    }

    pub fn runtime_error(&self, message: &str) {
        self.post(SystemNotification::RuntimeError {
            message: message.to_string(),
        });
    }

    /// Change the thermal level and notify, without the level in the payload.
    pub fn set_thermal_state(&self, state: ThermalState) {
        *self.thermal.lock() = state;
        self.post(SystemNotification::ThermalStateChanged);
    }

    pub fn subscriber_count(&self) -> usize {
        self.handlers.lock().len()
    }
}

impl Default for VirtualNotificationCenter {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationSource for VirtualNotificationCenter {
    fn subscribe(&self, handler: NotificationHandler) -> SubscriptionToken {
        let token = SubscriptionToken(self.next_token.fetch_add(1, Ordering::Relaxed));
        self.handlers.lock().push((token, handler));
        token
    }

    fn unsubscribe(&self, token: SubscriptionToken) {
        self.handlers.lock().retain(|(t, _)| *t != token);
    }

    fn thermal_state(&self) -> ThermalState {
        *self.thermal.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsubscribed_handlers_stop_receiving() {
        let center = VirtualNotificationCenter::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let token = center.subscribe(Arc::new(move |n| sink.lock().push(n)));

        center.end_interruption();
        center.unsubscribe(token);
        center.end_interruption();

        assert_eq!(*seen.lock(), vec![SystemNotification::InterruptionEnded]);
        assert_eq!(center.subscriber_count(), 0);
    }

    #[test]
    fn thermal_level_is_polled_not_posted() {
        let center = VirtualNotificationCenter::new();
        center.set_thermal_state(ThermalState::Serious);
        assert_eq!(center.thermal_state(), ThermalState::Serious);
    }
}
