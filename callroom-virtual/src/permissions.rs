//! Scripted camera and microphone permission store.
//!
//! Each kind starts `NotDetermined`. A prompt is answered according to the
//! response scripted for its kind: granted, denied, or left open until the
//! test resolves it with `resolve_pending`.

use std::collections::HashMap;

use parking_lot::Mutex;

use callroom_core::models::authorization::PermissionState;
use callroom_core::models::device::MediaKind;
use callroom_core::traits::permission_provider::{AccessCompletion, PermissionProvider};

/// How the user answers a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptResponse {
    Grant,
    Deny,
    /// Keep the prompt on screen until `resolve_pending`.
    Defer,
}

pub struct VirtualPermissions {
    states: Mutex<HashMap<MediaKind, PermissionState>>,
    responses: Mutex<HashMap<MediaKind, PromptResponse>>,
    open_prompts: Mutex<Vec<(MediaKind, AccessCompletion)>>,
    prompt_log: Mutex<Vec<MediaKind>>,
}

impl VirtualPermissions {
    /// Both kinds undetermined; prompts are granted.
    pub fn new() -> Self {
        Self {
            states: Mutex::new(HashMap::new()),
            responses: Mutex::new(HashMap::new()),
            open_prompts: Mutex::new(Vec::new()),
            prompt_log: Mutex::new(Vec::new()),
        }
    }

    /// Both kinds already authorized.
    pub fn authorized() -> Self {
        let permissions = Self::new();
        permissions.set_state(MediaKind::Video, PermissionState::Authorized);
        permissions.set_state(MediaKind::Audio, PermissionState::Authorized);
        permissions
    }

    /// Change the cached decision, as the user would in the system settings.
    pub fn set_state(&self, kind: MediaKind, state: PermissionState) {
        self.states.lock().insert(kind, state);
    }

    pub fn respond_with(&self, kind: MediaKind, response: PromptResponse) {
        self.responses.lock().insert(kind, response);
    }

    /// Answer the open prompt for `kind`. Returns `false` if none is open.
    pub fn resolve_pending(&self, kind: MediaKind, granted: bool) -> bool {
        let completion = {
            let mut open = self.open_prompts.lock();
            match open.iter().position(|(k, _)| *k == kind) {
                Some(index) => open.remove(index).1,
                None => return false,
            }
        };
        self.record_answer(kind, granted);
        completion(granted);
        true
    }

    pub fn has_open_prompt(&self, kind: MediaKind) -> bool {
        self.open_prompts.lock().iter().any(|(k, _)| *k == kind)
    }

    /// Kinds prompted for, in order.
    pub fn prompts(&self) -> Vec<MediaKind> {
        self.prompt_log.lock().clone()
    }

    fn record_answer(&self, kind: MediaKind, granted: bool) {
        let state = if granted {
            PermissionState::Authorized
        } else {
            PermissionState::Denied
        };
        self.set_state(kind, state);
    }
}

impl Default for VirtualPermissions {
    fn default() -> Self {
        Self::new()
    }
}

impl PermissionProvider for VirtualPermissions {
    fn authorization_state(&self, kind: MediaKind) -> PermissionState {
        self.states
            .lock()
            .get(&kind)
            .copied()
            .unwrap_or(PermissionState::NotDetermined)
    }

    fn request_access(&self, kind: MediaKind, completion: AccessCompletion) {
        self.prompt_log.lock().push(kind);
        let response = self
            .responses
            .lock()
            .get(&kind)
            .copied()
            .unwrap_or(PromptResponse::Grant);
        log::debug!("Virtual {} prompt answered with {:?}", kind, response);

        match response {
            PromptResponse::Grant | PromptResponse::Deny => {
                let granted = response == PromptResponse::Grant;
                self.record_answer(kind, granted);
                completion(granted);
            }
            PromptResponse::Defer => self.open_prompts.lock().push((kind, completion)),
        }
    }
}
