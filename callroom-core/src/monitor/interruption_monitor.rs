use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{unbounded, Sender};
use parking_lot::Mutex;

use crate::models::error::CaptureError;
use crate::models::interruption::{InterruptionEvent, InterruptionReason, SystemNotification};
use crate::traits::notification_source::{NotificationSource, SubscriptionToken};

enum MonitorMessage {
    Notification(SystemNotification),
    Flush(Sender<()>),
    Stop,
}

struct Attachment {
    token: SubscriptionToken,
    active: Arc<AtomicBool>,
    sender: Sender<MonitorMessage>,
    handle: thread::JoinHandle<()>,
}

/// Turns platform capture notifications into `InterruptionEvent`s.
///
/// While attached, every notification is forwarded to a dedicated
/// "interruption-monitor" thread, normalized there and handed to the
/// consumer in the order the platform posted it. Thermal notifications carry
/// no level; it is polled from the source when the notification is handled.
pub struct InterruptionMonitor {
    source: Arc<dyn NotificationSource>,
    attachment: Mutex<Option<Attachment>>,
}

impl InterruptionMonitor {
    pub fn new(source: Arc<dyn NotificationSource>) -> Self {
        Self {
            source,
            attachment: Mutex::new(None),
        }
    }

    /// Subscribe to the source and start delivering events to `consumer`.
    pub fn attach<F>(&self, consumer: F) -> Result<(), CaptureError>
    where
        F: Fn(InterruptionEvent) + Send + 'static,
    {
        let mut attachment = self.attachment.lock();
        if attachment.is_some() {
            return Err(CaptureError::MonitorAlreadyAttached);
        }

        let (sender, receiver) = unbounded::<MonitorMessage>();
        let active = Arc::new(AtomicBool::new(true));

        let source = Arc::clone(&self.source);
        let thread_active = Arc::clone(&active);
        let handle = thread::Builder::new()
            .name("interruption-monitor".into())
            .spawn(move || {
                for message in receiver.iter() {
                    match message {
                        MonitorMessage::Notification(notification) => {
                            if !thread_active.load(Ordering::Acquire) {
                                continue;
                            }
                            let event = Self::normalize(notification, source.as_ref());
                            log::debug!("Interruption event: {:?}", event);
                            consumer(event);
                        }
                        MonitorMessage::Flush(done) => {
                            let _ = done.send(());
                        }
                        MonitorMessage::Stop => break,
                    }
                }
            })
            .map_err(|e| CaptureError::Unknown(format!("failed to spawn monitor thread: {}", e)))?;

        let handler_sender = sender.clone();
        let handler_active = Arc::clone(&active);
        let token = self.source.subscribe(Arc::new(move |notification| {
            if handler_active.load(Ordering::Acquire) {
                let _ = handler_sender.send(MonitorMessage::Notification(notification));
            }
        }));

        *attachment = Some(Attachment {
            token,
            active,
            sender,
            handle,
        });
        log::debug!("Interruption monitor attached");
        Ok(())
    }

    /// Unsubscribe and stop delivery. Notifications already queued but not
    /// yet delivered are discarded. Safe to call more than once.
    pub fn detach(&self) {
        let Some(attachment) = self.attachment.lock().take() else {
            return;
        };
        attachment.active.store(false, Ordering::Release);
        self.source.unsubscribe(attachment.token);
        let _ = attachment.sender.send(MonitorMessage::Stop);

        if attachment.handle.thread().id() == thread::current().id() {
            return;
        }
        if attachment.handle.join().is_err() {
            log::error!("Interruption monitor thread panicked");
        }
        log::debug!("Interruption monitor detached");
    }

    pub fn is_attached(&self) -> bool {
        self.attachment.lock().is_some()
    }

    /// Wait until every notification posted so far has been delivered.
    pub fn flush(&self) {
        let (done, wait) = crossbeam_channel::bounded(1);
        let sent = match self.attachment.lock().as_ref() {
            Some(attachment) => attachment.sender.send(MonitorMessage::Flush(done)).is_ok(),
            None => false,
        };
        if sent {
            let _ = wait.recv();
        }
    }

    /// Map a platform notification to the event the orchestrator consumes.
    pub fn normalize(notification: SystemNotification, source: &dyn NotificationSource) -> InterruptionEvent {
        match notification {
            SystemNotification::RuntimeError { message } => {
                log::warn!("Capture runtime error: {}", message);
                InterruptionEvent::Interrupted(InterruptionReason::RuntimeError)
            }
            SystemNotification::SessionInterrupted { reason } => InterruptionEvent::Interrupted(reason.into()),
            SystemNotification::InterruptionEnded => {
                InterruptionEvent::Interrupted(InterruptionReason::InterruptionEnded)
            }
            SystemNotification::ThermalStateChanged => InterruptionEvent::ThermalStateChanged(source.thermal_state()),
            SystemNotification::RunningStateChanged { running } => InterruptionEvent::RunningStateChanged(running),
        }
    }
}

impl Drop for InterruptionMonitor {
    fn drop(&mut self) {
        self.detach();
    }
}
