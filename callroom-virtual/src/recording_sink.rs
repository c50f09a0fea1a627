//! A `StatusSink` that remembers what it was told.

use std::collections::{HashMap, HashSet};
use std::thread;

use parking_lot::Mutex;

use callroom_core::models::status::{Control, StatusChange};
use callroom_core::traits::status_sink::StatusSink;

#[derive(Default)]
struct Recorded {
    changes: Vec<StatusChange>,
    disabled: HashMap<Control, bool>,
    active: HashMap<Control, bool>,
    reason_text: String,
    overlay_hidden: Option<bool>,
    threads: HashSet<String>,
}

/// Records every sink call and the view state they add up to.
#[derive(Default)]
pub struct RecordingStatusSink {
    recorded: Mutex<Recorded>,
}

impl RecordingStatusSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call received, in order.
    pub fn changes(&self) -> Vec<StatusChange> {
        self.recorded.lock().changes.clone()
    }

    /// Forget the call history but keep the view state.
    pub fn clear_history(&self) {
        self.recorded.lock().changes.clear();
    }

    pub fn is_disabled(&self, control: Control) -> Option<bool> {
        self.recorded.lock().disabled.get(&control).copied()
    }

    pub fn is_active(&self, control: Control) -> Option<bool> {
        self.recorded.lock().active.get(&control).copied()
    }

    pub fn reason_text(&self) -> String {
        self.recorded.lock().reason_text.clone()
    }

    pub fn overlay_hidden(&self) -> Option<bool> {
        self.recorded.lock().overlay_hidden
    }

    /// Names of the threads the sink was called on.
    pub fn threads(&self) -> HashSet<String> {
        self.recorded.lock().threads.clone()
    }

    fn record(&self, change: StatusChange, apply: impl FnOnce(&mut Recorded)) {
        let name = thread::current().name().unwrap_or("<unnamed>").to_string();
        let mut recorded = self.recorded.lock();
        recorded.threads.insert(name);
        apply(&mut recorded);
        recorded.changes.push(change);
    }
}

impl StatusSink for RecordingStatusSink {
    fn set_control_disabled(&self, control: Control, disabled: bool) {
        self.record(StatusChange::ControlDisabled { control, disabled }, |r| {
            r.disabled.insert(control, disabled);
        });
    }

    fn set_control_active(&self, control: Control, active: bool) {
        self.record(StatusChange::ControlActive { control, active }, |r| {
            r.active.insert(control, active);
        });
    }

    fn set_disabled_reason_text(&self, text: &str) {
        self.record(StatusChange::DisabledReasonText(text.to_string()), |r| {
            r.reason_text = text.to_string();
        });
    }

    fn set_overlay_hidden(&self, hidden: bool) {
        self.record(StatusChange::OverlayHidden(hidden), |r| r.overlay_hidden = Some(hidden));
    }
}
