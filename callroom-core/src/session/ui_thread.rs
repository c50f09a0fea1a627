use std::thread;

use crossbeam_channel::{unbounded, Sender};
use parking_lot::Mutex;

use crate::models::error::CaptureError;
use crate::traits::ui_context::{UiContext, UiTask};

enum UiMessage {
    Run(UiTask),
    Flush(Sender<()>),
}

/// A dedicated thread standing in for the UI context.
///
/// For hosts that have no UI event loop of their own (tests, headless
/// embedders). Tasks run one at a time in the order they were posted.
pub struct UiThread {
    sender: Mutex<Option<Sender<UiMessage>>>,
    handle: Mutex<Option<thread::JoinHandle<()>>>,
}

impl UiThread {
    pub fn spawn() -> Result<Self, CaptureError> {
        let (sender, receiver) = unbounded::<UiMessage>();
        let handle = thread::Builder::new()
            .name("ui-context".into())
            .spawn(move || {
                for message in receiver.iter() {
                    match message {
                        UiMessage::Run(task) => task(),
                        UiMessage::Flush(done) => {
                            let _ = done.send(());
                        }
                    }
                }
            })
            .map_err(|e| CaptureError::Unknown(format!("failed to spawn UI thread: {}", e)))?;

        Ok(Self {
            sender: Mutex::new(Some(sender)),
            handle: Mutex::new(Some(handle)),
        })
    }

    /// Wait until every task posted so far has run.
    pub fn flush(&self) {
        let (done, wait) = crossbeam_channel::bounded(1);
        let sent = match self.sender.lock().as_ref() {
            Some(sender) => sender.send(UiMessage::Flush(done)).is_ok(),
            None => false,
        };
        if sent {
            let _ = wait.recv();
        }
    }

    /// Run what is already queued, then stop the thread.
    pub fn shutdown(&self) {
        drop(self.sender.lock().take());
        if let Some(handle) = self.handle.lock().take() {
            if handle.thread().id() == thread::current().id() {
                return;
            }
            if handle.join().is_err() {
                log::error!("UI thread panicked");
            }
        }
    }
}

impl UiContext for UiThread {
    fn post(&self, task: UiTask) {
        match self.sender.lock().as_ref() {
            Some(sender) => {
                if sender.send(UiMessage::Run(task)).is_err() {
                    log::debug!("UI thread gone; dropping task");
                }
            }
            None => log::debug!("UI thread shut down; dropping task"),
        }
    }
}

impl Drop for UiThread {
    fn drop(&mut self) {
        self.shutdown();
    }
}
