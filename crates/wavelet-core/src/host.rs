//! Host/observer boundary traits.
//!
//! The shell core never touches a rendering engine or the platform
//! directly. Outbound effects go through [`NavigationHost`], implemented
//! by the embedder; inbound content events arrive through
//! [`NavigationObserver`], implemented by the shell. Asynchronous host
//! work reports back over the reply channel, which the shell drains on
//! its own thread.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::mpsc;
use url::Url;

use crate::types::{
    CloseReason, DialogChoice, DialogId, MediaCaptureKind, NavigationDecision, NavigationId,
    PermissionDecision, PopupConfig, SurfaceId,
};

/// Notice shown when a dispatched link has no installed handler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub title: String,
    pub message: String,
    pub actions: Vec<NoticeAction>,
}

/// One selectable action on a notice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoticeAction {
    pub label: String,
    pub kind: NoticeActionKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeActionKind {
    /// Close the notice
    Dismiss,
    /// Open a marketplace listing for the missing handler
    OpenListing(String),
}

/// Sheet geometry and transition timings handed to the host on mount
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayLayout {
    pub height_fraction: f64,
    pub corner_radius: f64,
    pub backdrop_opacity: f64,
    pub enter_duration: Duration,
    pub exit_duration: Duration,
}

/// A dialog raised by page script, relayed to the host for presentation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentDialog {
    pub id: DialogId,
    pub kind: DialogKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogKind {
    Alert { message: String },
    Confirm { message: String },
}

impl DialogKind {
    pub fn message(&self) -> &str {
        match self {
            Self::Alert { message } => message,
            Self::Confirm { message } => message,
        }
    }
}

/// Completion invoked once the user resolves a content dialog
pub type DialogCompletion = Box<dyn FnOnce(DialogChoice) + Send>;

/// Replies posted back to the shell after asynchronous host work
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostReply {
    /// The platform finished an external dispatch attempt
    DispatchCompleted { url: Url, opened: bool },

    /// A load supervision deadline expired
    LoadDeadlineElapsed { navigation: NavigationId },
}

/// Cloneable sender half of the shell reply channel
#[derive(Debug, Clone)]
pub struct ReplySender {
    inner: mpsc::UnboundedSender<HostReply>,
}

impl ReplySender {
    pub fn send(&self, reply: HostReply) {
        // A dropped receiver means the shell is shutting down
        let _ = self.inner.send(reply);
    }
}

/// Create the reply channel pair for one shell
pub fn reply_channel() -> (ReplySender, mpsc::UnboundedReceiver<HostReply>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ReplySender { inner: tx }, rx)
}

/// Outbound effects an embedder provides to the shell
pub trait NavigationHost: Send + Sync {
    /// Hand a URL to the platform for external handling.
    ///
    /// Must not block. The outcome is reported later through
    /// [`HostReply::DispatchCompleted`] on the shell's reply channel.
    fn dispatch_external(&self, url: &Url);

    /// Show a transient notice with optional actions.
    fn present_notice(&self, notice: Notice);

    /// Attach a popup surface as a sheet overlay with the given layout.
    fn mount_overlay(&self, surface: SurfaceId, layout: &OverlayLayout);

    /// Detach a popup surface and its backdrop.
    fn unmount_overlay(&self, surface: SurfaceId);

    /// Present a content dialog. The user's choice comes back through
    /// [`NavigationObserver::on_dialog_choice`].
    fn present_dialog(&self, dialog: &ContentDialog);
}

/// Inbound content events the shell consumes
pub trait NavigationObserver {
    /// Decide what happens to a navigation the content surface wants to start.
    fn on_navigation_request(&mut self, raw_url: &str) -> NavigationDecision;

    /// A provisional load began on the primary surface.
    fn on_load_started(&mut self) -> NavigationId;

    /// The current load finished with the given document URL.
    fn on_load_finished(&mut self, document_url: Option<&str>);

    /// The current load failed.
    fn on_load_failed(&mut self, reason: &str);

    /// Content asked for a new window; returns the surface backing it.
    ///
    /// The host wires the new surface to this same observer, so popup
    /// navigations go through the same policy as the primary surface.
    fn on_new_window_requested(&mut self, config: PopupConfig) -> SurfaceId;

    /// Something asked to close a popup surface.
    fn on_window_close_requested(&mut self, surface: SurfaceId, reason: CloseReason);

    /// Page script raised `alert()`.
    fn on_script_alert(&mut self, message: &str, completion: DialogCompletion) -> DialogId;

    /// Page script raised `confirm()`.
    fn on_script_confirm(&mut self, message: &str, completion: DialogCompletion) -> DialogId;

    /// The user resolved a previously presented dialog.
    fn on_dialog_choice(&mut self, dialog: DialogId, choice: DialogChoice);

    /// Content asked for camera or microphone capture.
    fn on_media_capture_requested(
        &mut self,
        origin: &str,
        kind: MediaCaptureKind,
    ) -> PermissionDecision;

    /// Content asked to open a context menu; `false` suppresses it.
    fn on_context_menu_requested(&mut self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_channel_delivers_in_order() {
        let (tx, mut rx) = reply_channel();
        let nav = NavigationId::new();
        tx.send(HostReply::LoadDeadlineElapsed { navigation: nav });
        tx.send(HostReply::DispatchCompleted {
            url: Url::parse("tg://resolve").unwrap(),
            opened: false,
        });

        assert_eq!(
            rx.try_recv().unwrap(),
            HostReply::LoadDeadlineElapsed { navigation: nav }
        );
        assert!(matches!(
            rx.try_recv().unwrap(),
            HostReply::DispatchCompleted { opened: false, .. }
        ));
    }

    #[test]
    fn test_reply_sender_survives_dropped_receiver() {
        let (tx, rx) = reply_channel();
        drop(rx);
        tx.send(HostReply::DispatchCompleted {
            url: Url::parse("mailto:a@b.c").unwrap(),
            opened: true,
        });
    }
}
