//! # Surface Scenarios
//!
//! Popup sheets and script dialogs driven against a recording host.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;

use wavelet_core::clock::ManualClock;
use wavelet_core::config::PopupStyle;
use wavelet_core::types::{CloseReason, DialogChoice, DialogId, PopupConfig, SurfaceId};
use wavelet_surface::popup::{PopupEvent, PopupState};
use wavelet_surface::{DialogBroker, PopupWindowManager};

use crate::harness::RecordingHost;

fn popup_manager(style: PopupStyle) -> (PopupWindowManager, Arc<RecordingHost>) {
    let host = Arc::new(RecordingHost::new());
    let manager = PopupWindowManager::new(
        SurfaceId::new(),
        style,
        host.clone(),
        Arc::new(ManualClock::new()),
    );
    (manager, host)
}

/// Test that presenting a popup mounts one overlay with the configured
/// sheet geometry.
#[test]
fn test_popup_presents_as_configured_sheet() {
    let style = PopupStyle {
        height_fraction: 0.6,
        corner_radius: 12.0,
        backdrop_opacity: 0.4,
        present_duration: Duration::from_millis(250),
        dismiss_duration: Duration::from_millis(200),
    };
    let (mut manager, host) = popup_manager(style);

    let surface = manager.request(PopupConfig::default());
    manager.present(surface);

    assert_eq!(host.mounted(), vec![surface]);
    let layout = manager.overlay_layout();
    assert_eq!(layout.height_fraction, 0.6);
    assert_eq!(layout.corner_radius, 12.0);
    assert_eq!(layout.enter_duration, Duration::from_millis(250));
}

/// Test the event stream a popup emits across its whole life.
#[test]
fn test_popup_events_trace_the_sheet_lifecycle() {
    let (manager, _host) = popup_manager(PopupStyle::default());
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut manager = manager.with_event_sender(tx);

    let surface = manager.request(PopupConfig::default());
    manager.present(surface);
    manager.close(surface, CloseReason::CloseButton);

    let mut states = Vec::new();
    while let Ok(PopupEvent::StateChanged { surface: s, state }) = rx.try_recv() {
        assert_eq!(s, surface);
        states.push(state);
    }
    assert_eq!(
        states,
        vec![
            PopupState::Requested,
            PopupState::Presented,
            PopupState::Dismissing,
            PopupState::Closed,
        ]
    );
}

/// Test that rapid close taps tear the overlay down exactly once.
#[test]
fn test_rapid_close_taps_unmount_once() {
    let (mut manager, host) = popup_manager(PopupStyle::default());
    let surface = manager.request(PopupConfig::default());
    manager.present(surface);

    manager.close(surface, CloseReason::CloseButton);
    manager.close(surface, CloseReason::BackdropTap);
    manager.close(surface, CloseReason::ContentRequest);

    assert_eq!(host.unmounted().len(), 1);
}

/// Test that closing one popup leaves the others mounted.
#[test]
fn test_each_popup_owns_its_overlay() {
    let (mut manager, host) = popup_manager(PopupStyle::default());
    let first = manager.request(PopupConfig::default());
    let second = manager.request(PopupConfig::default());
    manager.present(first);
    manager.present(second);

    manager.close(first, CloseReason::ContentRequest);

    assert_eq!(host.unmounted(), vec![first]);
    assert_eq!(manager.state(second), Some(PopupState::Presented));
    assert_eq!(manager.open_count(), 1);
}

/// Test that script dialogs present one at a time, in request order.
#[test]
fn test_script_dialogs_queue_one_at_a_time() {
    let host = Arc::new(RecordingHost::new());
    let mut broker = DialogBroker::new(host.clone());

    let choices: Arc<Mutex<Vec<DialogChoice>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = || {
        let choices = choices.clone();
        Box::new(move |choice| choices.lock().unwrap().push(choice))
    };

    let confirm = broker.request_confirm("Leave the page?", sink());
    let alert = broker.request_alert("Saved.", sink());
    assert_eq!(host.dialogs().len(), 1, "second dialog waits its turn");

    broker.resolve(confirm, DialogChoice::Dismissed);
    assert_eq!(host.dialogs().len(), 2);
    broker.resolve(alert, DialogChoice::Accepted);

    assert_eq!(
        *choices.lock().unwrap(),
        vec![DialogChoice::Dismissed, DialogChoice::Accepted]
    );
}

/// Test that a resolution for a dialog that is not active is ignored.
#[test]
fn test_stale_dialog_resolution_ignored() {
    let host = Arc::new(RecordingHost::new());
    let mut broker = DialogBroker::new(host);

    let answered: Arc<Mutex<Option<DialogChoice>>> = Arc::new(Mutex::new(None));
    let sink = answered.clone();
    let dialog = broker.request_confirm(
        "Proceed?",
        Box::new(move |choice| *sink.lock().unwrap() = Some(choice)),
    );

    broker.resolve(DialogId::new(), DialogChoice::Accepted);
    assert_eq!(*answered.lock().unwrap(), None);

    broker.resolve(dialog, DialogChoice::Accepted);
    assert_eq!(*answered.lock().unwrap(), Some(DialogChoice::Accepted));
}
