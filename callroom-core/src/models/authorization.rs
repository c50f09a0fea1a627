use serde::{Deserialize, Serialize};

/// Raw permission state as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PermissionState {
    NotDetermined,
    Restricted,
    Denied,
    Authorized,
}

/// Authorization outcome for one resource (camera or microphone).
///
/// ```text
/// undetermined ──prompt──→ authorized / denied
///      │
///      └──────────────────→ notFound   (no hardware; sticks until re-enumeration)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AuthorizationStatus {
    Authorized,
    Denied,
    NotFound,
    Undetermined,
}

impl AuthorizationStatus {
    pub fn is_granted(self) -> bool {
        matches!(self, Self::Authorized)
    }

    pub fn is_undetermined(self) -> bool {
        matches!(self, Self::Undetermined)
    }
}

impl From<PermissionState> for AuthorizationStatus {
    fn from(state: PermissionState) -> Self {
        match state {
            PermissionState::NotDetermined => Self::Undetermined,
            PermissionState::Restricted | PermissionState::Denied => Self::Denied,
            PermissionState::Authorized => Self::Authorized,
        }
    }
}

/// Why a device could not be put into the session.
///
/// Both degrade the control the same way; they are kept apart for
/// diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AcquisitionFailure {
    /// No matching hardware was enumerated.
    NotFound,
    /// Hardware exists but could not be opened or added (busy, conflict).
    Failed,
}
