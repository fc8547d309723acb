//! Shared doubles and fixtures.
//!
//! [`RecordingHost`] stands in for the platform: it records every
//! outbound effect and can answer dispatches over the reply channel the
//! way a real embedder would, with `opened` depending on which handlers
//! are "installed".

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use tracing::debug;
use url::Url;

use wavelet_core::clock::ManualClock;
use wavelet_core::config::ShellConfig;
use wavelet_core::host::{
    ContentDialog, HostReply, NavigationHost, Notice, OverlayLayout, ReplySender,
};
use wavelet_core::types::SurfaceId;
use wavelet_policy::NavigationPolicyEngine;
use wavelet_session::MemoryStore;
use wavelet_shell::WebShell;

/// Host double that records every outbound effect
#[derive(Default)]
pub struct RecordingHost {
    dispatched: Mutex<Vec<Url>>,
    notices: Mutex<Vec<Notice>>,
    mounted: Mutex<Vec<SurfaceId>>,
    unmounted: Mutex<Vec<SurfaceId>>,
    dialogs: Mutex<Vec<ContentDialog>>,
    handlers: Mutex<HashSet<String>>,
    replies: Mutex<Option<ReplySender>>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretend an app handling `scheme` is installed on the device.
    pub fn install_handler(&self, scheme: &str) {
        self.handlers.lock().unwrap().insert(scheme.to_string());
    }

    /// Answer every dispatch with a completion over `sender`, as a real
    /// platform would after the open attempt settles.
    pub fn connect_replies(&self, sender: ReplySender) {
        *self.replies.lock().unwrap() = Some(sender);
    }

    pub fn dispatched(&self) -> Vec<Url> {
        self.dispatched.lock().unwrap().clone()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }

    pub fn mounted(&self) -> Vec<SurfaceId> {
        self.mounted.lock().unwrap().clone()
    }

    pub fn unmounted(&self) -> Vec<SurfaceId> {
        self.unmounted.lock().unwrap().clone()
    }

    pub fn dialogs(&self) -> Vec<ContentDialog> {
        self.dialogs.lock().unwrap().clone()
    }

    pub fn dispatch_count(&self) -> usize {
        self.dispatched.lock().unwrap().len()
    }

    pub fn notice_count(&self) -> usize {
        self.notices.lock().unwrap().len()
    }
}

impl NavigationHost for RecordingHost {
    fn dispatch_external(&self, url: &Url) {
        debug!(%url, "Recording external dispatch");
        self.dispatched.lock().unwrap().push(url.clone());
        let opened = self.handlers.lock().unwrap().contains(url.scheme());
        if let Some(sender) = self.replies.lock().unwrap().as_ref() {
            sender.send(HostReply::DispatchCompleted {
                url: url.clone(),
                opened,
            });
        }
    }

    fn present_notice(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }

    fn mount_overlay(&self, surface: SurfaceId, _layout: &OverlayLayout) {
        self.mounted.lock().unwrap().push(surface);
    }

    fn unmount_overlay(&self, surface: SurfaceId) {
        self.unmounted.lock().unwrap().push(surface);
    }

    fn present_dialog(&self, dialog: &ContentDialog) {
        self.dialogs.lock().unwrap().push(dialog.clone());
    }
}

/// Landing URL used by the fixtures
pub fn landing_url() -> Url {
    Url::parse("https://app.example.com/start").unwrap()
}

/// Shell on a manual clock with an in-memory store and a connected
/// recording host.
pub fn shell_fixture() -> (WebShell, Arc<RecordingHost>, Arc<ManualClock>) {
    shell_fixture_with(ShellConfig::new(landing_url()))
}

pub fn shell_fixture_with(config: ShellConfig) -> (WebShell, Arc<RecordingHost>, Arc<ManualClock>) {
    let host = Arc::new(RecordingHost::new());
    let clock = Arc::new(ManualClock::new());
    let shell = WebShell::with_clock(
        config,
        host.clone(),
        Arc::new(MemoryStore::new()),
        clock.clone(),
    );
    host.connect_replies(shell.reply_sender());
    (shell, host, clock)
}

/// Policy engine on a manual clock with a recording host. Outcomes are
/// fed back by hand through `handle_dispatch_outcome`.
pub fn engine_fixture() -> (NavigationPolicyEngine, Arc<RecordingHost>, Arc<ManualClock>) {
    let config = ShellConfig::new(landing_url());
    let host = Arc::new(RecordingHost::new());
    let clock = Arc::new(ManualClock::new());
    let engine = NavigationPolicyEngine::new(&config.policy, clock.clone(), host.clone());
    (engine, host, clock)
}
