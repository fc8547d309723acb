//! Popup window lifecycle.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tracing::{debug, info, trace};
use url::Url;

use wavelet_core::clock::SharedClock;
use wavelet_core::config::PopupStyle;
use wavelet_core::host::{NavigationHost, OverlayLayout};
use wavelet_core::types::{CloseReason, PopupConfig, SurfaceId};

/// Lifecycle states of a popup surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupState {
    /// Surface allocated, nothing on screen yet
    Requested,
    /// Sheet mounted over the primary surface
    Presented,
    /// Teardown started, exit transition running
    Dismissing,
    /// Surface gone; the handle is dead
    Closed,
}

/// State change notifications for observability and tests
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopupEvent {
    StateChanged {
        surface: SurfaceId,
        state: PopupState,
    },
}

struct PopupEntry {
    url: Option<Url>,
    state: PopupState,
    opened_at: Instant,
}

/// Owns every popup surface a shell has open.
///
/// Popups present as a sheet covering most of the primary surface; this
/// manager keeps the state machine and hands layout and transition
/// timings to the host, which does the actual drawing. Every close path
/// converges on [`close`](Self::close). A handle that is unknown or
/// already torn down is a silent no-op, and the primary surface is never
/// torn down through here.
pub struct PopupWindowManager {
    primary: SurfaceId,
    style: PopupStyle,
    popups: HashMap<SurfaceId, PopupEntry>,
    host: Arc<dyn NavigationHost>,
    clock: SharedClock,
    event_sender: Option<mpsc::UnboundedSender<PopupEvent>>,
}

impl PopupWindowManager {
    pub fn new(
        primary: SurfaceId,
        style: PopupStyle,
        host: Arc<dyn NavigationHost>,
        clock: SharedClock,
    ) -> Self {
        Self {
            primary,
            style,
            popups: HashMap::new(),
            host,
            clock,
            event_sender: None,
        }
    }

    pub fn with_event_sender(mut self, sender: mpsc::UnboundedSender<PopupEvent>) -> Self {
        self.event_sender = Some(sender);
        self
    }

    /// Allocate a surface for a content-requested window.
    pub fn request(&mut self, config: PopupConfig) -> SurfaceId {
        let surface = SurfaceId::new();
        debug!(
            surface = surface.0,
            url = config.url.as_ref().map(Url::as_str),
            "Popup surface requested"
        );
        self.popups.insert(
            surface,
            PopupEntry {
                url: config.url,
                state: PopupState::Requested,
                opened_at: self.clock.now(),
            },
        );
        self.emit(surface, PopupState::Requested);
        surface
    }

    /// Mount the sheet for a requested surface.
    pub fn present(&mut self, surface: SurfaceId) {
        match self.popups.get_mut(&surface) {
            Some(entry) if entry.state == PopupState::Requested => {
                entry.state = PopupState::Presented;
            }
            Some(_) => return,
            None => {
                trace!(surface = surface.0, "Present for unknown surface ignored");
                return;
            }
        }

        let layout = self.overlay_layout();
        self.host.mount_overlay(surface, &layout);
        info!(surface = surface.0, "Popup presented");
        self.emit(surface, PopupState::Presented);
    }

    /// Tear down a popup surface.
    ///
    /// The close button, a backdrop tap, and a close requested by the
    /// page itself all land here and run the same teardown: the overlay
    /// unmounts together with its backdrop, exactly once.
    pub fn close(&mut self, surface: SurfaceId, reason: CloseReason) {
        if surface == self.primary {
            debug!(?reason, "Close request for primary surface ignored");
            return;
        }

        let opened_at = match self.popups.get_mut(&surface) {
            Some(entry) if matches!(entry.state, PopupState::Requested | PopupState::Presented) => {
                entry.state = PopupState::Dismissing;
                entry.opened_at
            }
            Some(_) => {
                trace!(surface = surface.0, "Surface already tearing down");
                return;
            }
            None => {
                trace!(surface = surface.0, "Close for unknown surface ignored");
                return;
            }
        };

        self.emit(surface, PopupState::Dismissing);
        self.host.unmount_overlay(surface);
        self.popups.remove(&surface);

        let age = self.clock.now().duration_since(opened_at);
        info!(
            surface = surface.0,
            ?reason,
            age_ms = age.as_millis() as u64,
            "Popup closed"
        );
        self.emit(surface, PopupState::Closed);
    }

    /// Current state of a surface, `None` once it is closed or unknown
    pub fn state(&self, surface: SurfaceId) -> Option<PopupState> {
        self.popups.get(&surface).map(|entry| entry.state)
    }

    /// URL the popup was created for, when the content supplied one
    pub fn initial_url(&self, surface: SurfaceId) -> Option<&Url> {
        self.popups.get(&surface).and_then(|entry| entry.url.as_ref())
    }

    /// Number of popup surfaces not yet torn down
    pub fn open_count(&self) -> usize {
        self.popups.len()
    }

    pub fn is_primary(&self, surface: SurfaceId) -> bool {
        surface == self.primary
    }

    /// Sheet geometry and transition timings the host should apply
    pub fn overlay_layout(&self) -> OverlayLayout {
        OverlayLayout {
            height_fraction: self.style.height_fraction,
            corner_radius: self.style.corner_radius,
            backdrop_opacity: self.style.backdrop_opacity,
            enter_duration: self.style.present_duration,
            exit_duration: self.style.dismiss_duration,
        }
    }

    fn emit(&self, surface: SurfaceId, state: PopupState) {
        if let Some(sender) = &self.event_sender {
            let _ = sender.send(PopupEvent::StateChanged { surface, state });
        }
    }
}
