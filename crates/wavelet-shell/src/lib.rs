//! Embedded web shell controller.
//!
//! [`WebShell`] wires the navigation policy engine, popup manager, load
//! watchdog, dialog broker, and session state together behind the
//! [`NavigationObserver`] trait. One shell owns one primary surface and
//! runs on one thread: hosts call observer methods from that thread and
//! post asynchronous outcomes to the reply channel, which
//! [`WebShell::pump`] drains back onto it.

pub mod events;

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use url::Url;

use wavelet_core::clock::{SharedClock, SystemClock};
use wavelet_core::config::ShellConfig;
use wavelet_core::host::{
    reply_channel, DialogCompletion, HostReply, NavigationHost, NavigationObserver, ReplySender,
};
use wavelet_core::types::{
    CloseReason, DialogChoice, DialogId, MediaCaptureKind, NavigationDecision, NavigationId,
    NavigationRequest, PermissionDecision, PopupConfig, SurfaceId,
};
use wavelet_policy::NavigationPolicyEngine;
use wavelet_session::{build_launch_plan, LaunchPlan, PreferenceStore, Session};
use wavelet_surface::popup::PopupEvent;
use wavelet_surface::{DialogBroker, LoadWatchdog, PopupWindowManager};

pub use events::ShellEvent;

pub struct WebShell {
    config: ShellConfig,
    primary: SurfaceId,
    engine: NavigationPolicyEngine,
    popups: PopupWindowManager,
    watchdog: LoadWatchdog,
    dialogs: DialogBroker,
    session: Session,
    current_url: Option<Url>,
    replies: mpsc::UnboundedReceiver<HostReply>,
    reply_sender: ReplySender,
    event_sender: Option<mpsc::UnboundedSender<ShellEvent>>,
}

impl WebShell {
    /// Shell on the system clock.
    pub fn new(
        config: ShellConfig,
        host: Arc<dyn NavigationHost>,
        store: Arc<dyn PreferenceStore>,
    ) -> Self {
        Self::with_clock(config, host, store, Arc::new(SystemClock))
    }

    /// Shell on an injected clock, so tests can step time manually.
    pub fn with_clock(
        config: ShellConfig,
        host: Arc<dyn NavigationHost>,
        store: Arc<dyn PreferenceStore>,
        clock: SharedClock,
    ) -> Self {
        let (reply_sender, replies) = reply_channel();
        let primary = SurfaceId::new();
        info!(primary = primary.0, landing = %config.landing_url, "Shell created");
        Self {
            engine: NavigationPolicyEngine::new(&config.policy, clock.clone(), host.clone()),
            popups: PopupWindowManager::new(
                primary,
                config.surface.popup.clone(),
                host.clone(),
                clock.clone(),
            ),
            watchdog: LoadWatchdog::new(config.surface.load_deadline, clock),
            dialogs: DialogBroker::new(host),
            session: Session::new(store),
            current_url: None,
            replies,
            reply_sender,
            event_sender: None,
            primary,
            config,
        }
    }

    pub fn with_event_sender(mut self, sender: mpsc::UnboundedSender<ShellEvent>) -> Self {
        self.event_sender = Some(sender);
        self
    }

    /// Route popup state changes to a listener.
    pub fn with_popup_events(mut self, sender: mpsc::UnboundedSender<PopupEvent>) -> Self {
        self.popups = self.popups.with_event_sender(sender);
        self
    }

    /// Sender hosts use to post asynchronous outcomes back to the shell
    pub fn reply_sender(&self) -> ReplySender {
        self.reply_sender.clone()
    }

    pub fn primary_surface(&self) -> SurfaceId {
        self.primary
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Popup surfaces currently alive
    pub fn open_popups(&self) -> usize {
        self.popups.open_count()
    }

    /// Plan the initial request for this launch and record the launch.
    pub fn launch_plan(&mut self) -> LaunchPlan {
        let last_visited = self.session.last_visited();
        let plan = build_launch_plan(
            &self.config,
            last_visited.as_deref(),
            self.current_url.as_ref(),
        );
        if self.session.is_first_open() {
            if let Err(err) = self.session.mark_opened() {
                warn!(%err, "Failed to record first launch");
            }
        }
        plan
    }

    /// Drain pending host replies onto the owner thread. Returns the
    /// number processed.
    pub fn pump(&mut self) -> usize {
        let mut processed = 0;
        while let Ok(reply) = self.replies.try_recv() {
            self.handle_reply(reply);
            processed += 1;
        }
        processed
    }

    fn handle_reply(&mut self, reply: HostReply) {
        match reply {
            HostReply::DispatchCompleted { url, opened } => {
                self.engine.handle_dispatch_outcome(&url, opened);
            }
            HostReply::LoadDeadlineElapsed { navigation } => {
                if self.watchdog.on_deadline_elapsed(navigation) {
                    warn!(navigation = navigation.0, "Load exceeded its deadline");
                    self.emit(ShellEvent::LoadTimedOut { navigation });
                }
            }
        }
    }

    /// Poll-driven alternative to the deadline timer for hosts running
    /// without an async runtime. Reports a stalled navigation at most
    /// once.
    pub fn check_load_deadline(&mut self) {
        if let Some(navigation) = self.watchdog.poll() {
            warn!(navigation = navigation.0, "Load exceeded its deadline");
            self.emit(ShellEvent::LoadTimedOut { navigation });
        }
    }

    fn arm_deadline_timer(&self, navigation: NavigationId) {
        // Only under a Tokio runtime; poll-driven hosts use
        // check_load_deadline instead.
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return;
        };
        let deadline = self.config.surface.load_deadline;
        let sender = self.reply_sender.clone();
        handle.spawn(async move {
            tokio::time::sleep(deadline).await;
            sender.send(HostReply::LoadDeadlineElapsed { navigation });
        });
    }

    fn emit(&self, event: ShellEvent) {
        if let Some(sender) = &self.event_sender {
            let _ = sender.send(event);
        }
    }
}

impl NavigationObserver for WebShell {
    fn on_navigation_request(&mut self, raw_url: &str) -> NavigationDecision {
        let request = NavigationRequest::new(raw_url);
        self.engine.decide(&request)
    }

    fn on_load_started(&mut self) -> NavigationId {
        let navigation = self.watchdog.navigation_started();
        debug!(navigation = navigation.0, "Load started");
        self.arm_deadline_timer(navigation);
        self.emit(ShellEvent::LoadStarted { navigation });
        navigation
    }

    fn on_load_finished(&mut self, document_url: Option<&str>) {
        self.watchdog.navigation_finished();
        let url = document_url.and_then(|raw| Url::parse(raw).ok());
        if let Some(ref url) = url {
            self.current_url = Some(url.clone());
            // The landing URL is never a resume point; coming back to it
            // means starting over anyway.
            if *url != self.config.landing_url {
                match self.session.set_last_visited(url.as_str()) {
                    Ok(()) => self.emit(ShellEvent::ResumePointSaved { url: url.clone() }),
                    Err(err) => warn!(%err, "Failed to persist resume URL"),
                }
            }
        }
        self.emit(ShellEvent::LoadFinished { url });
    }

    fn on_load_failed(&mut self, reason: &str) {
        warn!(reason, "Load failed");
        self.watchdog.navigation_failed();
        self.emit(ShellEvent::LoadFailed {
            reason: reason.to_string(),
        });
    }

    fn on_new_window_requested(&mut self, config: PopupConfig) -> SurfaceId {
        let surface = self.popups.request(config);
        self.popups.present(surface);
        surface
    }

    fn on_window_close_requested(&mut self, surface: SurfaceId, reason: CloseReason) {
        self.popups.close(surface, reason);
    }

    fn on_script_alert(&mut self, message: &str, completion: DialogCompletion) -> DialogId {
        self.dialogs.request_alert(message, completion)
    }

    fn on_script_confirm(&mut self, message: &str, completion: DialogCompletion) -> DialogId {
        self.dialogs.request_confirm(message, completion)
    }

    fn on_dialog_choice(&mut self, dialog: DialogId, choice: DialogChoice) {
        self.dialogs.resolve(dialog, choice);
    }

    fn on_media_capture_requested(
        &mut self,
        origin: &str,
        kind: MediaCaptureKind,
    ) -> PermissionDecision {
        if self.config.permissions.auto_grant_media_capture {
            info!(origin, ?kind, "Granting media capture");
            PermissionDecision::Grant
        } else {
            info!(origin, ?kind, "Denying media capture");
            PermissionDecision::Deny
        }
    }

    fn on_context_menu_requested(&mut self) -> bool {
        self.config.permissions.allow_context_menu
    }
}
