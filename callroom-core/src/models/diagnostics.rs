use std::collections::VecDeque;

use serde::Serialize;

use super::authorization::AcquisitionFailure;
use super::device::{DevicePosition, MediaKind};
use super::error::CaptureError;
use super::interruption::InterruptionReason;
use super::status::DerivedStatus;

/// How many interruption and acquisition records are kept; older ones are
/// dropped first.
pub const MAX_HISTORY: usize = 32;

/// An interruption as it was received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterruptionRecord {
    pub reason: InterruptionReason,
    pub received_at: String,
}

/// A device that could not be put into the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AcquisitionRecord {
    pub kind: MediaKind,
    pub position: DevicePosition,
    pub failure: AcquisitionFailure,
    pub recorded_at: String,
}

/// Snapshot of a call-screen session for debugging.
///
/// Serializable for JSON export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionDiagnostics {
    pub session_id: String,
    pub created_at: String,
    pub status: DerivedStatus,
    pub interruptions: VecDeque<InterruptionRecord>,
    pub acquisition_failures: VecDeque<AcquisitionRecord>,
    pub notifications_published: u64,
}

impl SessionDiagnostics {
    pub fn new(session_id: &str) -> Self {
        Self {
            session_id: session_id.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            status: DerivedStatus::initial(),
            interruptions: VecDeque::new(),
            acquisition_failures: VecDeque::new(),
            notifications_published: 0,
        }
    }

    pub fn record_interruption(&mut self, reason: InterruptionReason) {
        push_bounded(
            &mut self.interruptions,
            InterruptionRecord {
                reason,
                received_at: chrono::Utc::now().to_rfc3339(),
            },
        );
    }

    pub fn record_acquisition_failure(
        &mut self,
        kind: MediaKind,
        position: DevicePosition,
        failure: AcquisitionFailure,
    ) {
        push_bounded(
            &mut self.acquisition_failures,
            AcquisitionRecord {
                kind,
                position,
                failure,
                recorded_at: chrono::Utc::now().to_rfc3339(),
            },
        );
    }

    pub fn to_json(&self) -> Result<String, CaptureError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CaptureError::Unknown(format!("failed to serialize diagnostics: {}", e)))
    }
}

fn push_bounded<T>(records: &mut VecDeque<T>, record: T) {
    if records.len() == MAX_HISTORY {
        records.pop_front();
    }
    records.push_back(record);
}
