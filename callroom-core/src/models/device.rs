use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind of media a device produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Audio,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Video => f.write_str("camera"),
            Self::Audio => f.write_str("microphone"),
        }
    }
}

/// Which way a camera faces. Audio devices report `Unspecified`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DevicePosition {
    Front,
    Back,
    Unspecified,
}

impl DevicePosition {
    /// The position a flip switches to. `Unspecified` flips to `Back`.
    pub fn opposite(self) -> Self {
        match self {
            Self::Back => Self::Front,
            Self::Front | Self::Unspecified => Self::Back,
        }
    }
}

/// A hardware device as reported by the platform's enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceDescriptor {
    pub id: String,
    pub name: String,
    pub kind: MediaKind,
    pub position: DevicePosition,
}

impl DeviceDescriptor {
    pub fn camera(id: impl Into<String>, name: impl Into<String>, position: DevicePosition) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: MediaKind::Video,
            position,
        }
    }

    pub fn microphone(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: MediaKind::Audio,
            position: DevicePosition::Unspecified,
        }
    }
}

/// Identity of one acquired input handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InputId(uuid::Uuid);

impl fmt::Display for InputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An acquired input that can be added to a capture session.
///
/// Not `Clone`: a handle has exactly one owner. Once added it belongs to the
/// capture session; removing it hands it back to the caller.
#[derive(Debug, PartialEq, Eq)]
pub struct DeviceInput {
    id: InputId,
    device: DeviceDescriptor,
}

impl DeviceInput {
    /// Wrap an opened device. Called by platform `DeviceProvider`s.
    pub fn new(device: DeviceDescriptor) -> Self {
        Self {
            id: InputId(uuid::Uuid::new_v4()),
            device,
        }
    }

    pub fn id(&self) -> InputId {
        self.id
    }

    pub fn device(&self) -> &DeviceDescriptor {
        &self.device
    }

    pub fn kind(&self) -> MediaKind {
        self.device.kind
    }

    pub fn position(&self) -> DevicePosition {
        self.device.position
    }
}
