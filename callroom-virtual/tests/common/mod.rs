#![allow(dead_code)]

use std::sync::Arc;

use callroom_core::{OrchestratorConfig, SessionOrchestrator, UiThread};
use callroom_virtual::{RecordingStatusSink, VirtualPlatform};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// One call screen wired to a virtual platform.
pub struct Call {
    pub platform: VirtualPlatform,
    pub sink: Arc<RecordingStatusSink>,
    pub ui: Arc<UiThread>,
    pub orchestrator: SessionOrchestrator,
}

impl Call {
    pub fn new(platform: VirtualPlatform) -> Self {
        Self::with_config(platform, OrchestratorConfig::default())
    }

    pub fn with_config(platform: VirtualPlatform, config: OrchestratorConfig) -> Self {
        init_logging();
        let sink = Arc::new(RecordingStatusSink::new());
        let ui = Arc::new(UiThread::spawn().unwrap());
        let orchestrator =
            SessionOrchestrator::new(config, platform.services(), Arc::clone(&sink) as _, Arc::clone(&ui) as _)
                .unwrap();
        Self {
            platform,
            sink,
            ui,
            orchestrator,
        }
    }

    /// Build, start and wait for the session to come up.
    pub fn started(platform: VirtualPlatform) -> Self {
        let call = Self::new(platform);
        call.orchestrator.start().unwrap();
        call.settle();
        call
    }

    /// Wait for queued work, then for the UI to catch up.
    pub fn settle(&self) {
        self.orchestrator.settle();
        self.ui.flush();
    }
}
