//! # Shell Scenarios
//!
//! Full embedding flows: a host drives [`WebShell`] through the
//! observer boundary and answers dispatches over the reply channel,
//! exactly as a real platform adapter would.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use url::Url;

use wavelet_core::config::{ShellConfig, SurfaceConfig};
use wavelet_core::host::NavigationObserver;
use wavelet_core::types::{CloseReason, DialogChoice, NavigationDecision, PopupConfig};
use wavelet_session::MemoryStore;
use wavelet_shell::{ShellEvent, WebShell};

use crate::harness::{landing_url, shell_fixture, RecordingHost};

/// Test the full journey for a deep link with no installed handler:
/// every attempt outside the debounce window dispatches, and notices
/// arrive only as fast as the governor allows.
#[test]
fn test_deep_link_journey_without_handler() {
    let (mut shell, host, clock) = shell_fixture();
    let link = "tg://resolve?domain=support";

    assert_eq!(shell.on_navigation_request(link), NavigationDecision::Suppress);
    shell.pump();
    assert_eq!(host.notice_count(), 1);

    // Page retries immediately; absorbed by the debounce window
    assert_eq!(shell.on_navigation_request(link), NavigationDecision::Suppress);
    assert_eq!(host.dispatch_count(), 1);

    clock.advance(Duration::from_secs(2));
    shell.on_navigation_request(link);
    shell.pump();
    assert_eq!(host.dispatch_count(), 2);
    assert_eq!(host.notice_count(), 1, "second notice lands inside the spacing gap");

    clock.advance(Duration::from_secs(4));
    shell.on_navigation_request(link);
    shell.pump();
    assert_eq!(host.dispatch_count(), 3);
    assert_eq!(host.notice_count(), 2);
}

/// Test that an installed handler keeps the journey quiet.
#[test]
fn test_deep_link_with_installed_handler_stays_quiet() {
    let (mut shell, host, _clock) = shell_fixture();
    host.install_handler("tg");

    shell.on_navigation_request("tg://resolve?domain=support");
    shell.pump();

    assert_eq!(host.dispatch_count(), 1);
    assert_eq!(host.notice_count(), 0);
}

/// Test that communication links dispatch every time and never alert,
/// handler or not.
#[test]
fn test_communication_links_never_alert() {
    let (mut shell, host, _clock) = shell_fixture();

    assert_eq!(
        shell.on_navigation_request("tel:+15551234567"),
        NavigationDecision::DispatchExternal
    );
    assert_eq!(
        shell.on_navigation_request("tel:+15551234567"),
        NavigationDecision::DispatchExternal
    );
    shell.pump();

    assert_eq!(host.dispatch_count(), 2);
    assert_eq!(host.notice_count(), 0);
}

/// Test a popup's life as the observer sees it: mount on request,
/// unmount on whichever close path fires first.
#[test]
fn test_popup_lifecycle_reports_to_host() {
    let (mut shell, host, _clock) = shell_fixture();

    let surface = shell.on_new_window_requested(PopupConfig {
        url: Some(Url::parse("https://app.example.com/help").unwrap()),
    });
    assert_eq!(host.mounted(), vec![surface]);
    assert_eq!(shell.open_popups(), 1);

    shell.on_window_close_requested(surface, CloseReason::BackdropTap);
    assert_eq!(host.unmounted(), vec![surface]);
    assert_eq!(shell.open_popups(), 0);
}

/// Test that a stalled load is reported exactly once.
#[test]
fn test_load_timeout_reported_once() {
    let (shell, _host, clock) = shell_fixture();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut shell = shell.with_event_sender(tx);

    let navigation = shell.on_load_started();
    clock.advance(Duration::from_secs(6));
    shell.check_load_deadline();
    shell.check_load_deadline();

    let timeouts = std::iter::from_fn(|| rx.try_recv().ok())
        .filter(|event| matches!(event, ShellEvent::LoadTimedOut { navigation: n } if *n == navigation))
        .count();
    assert_eq!(timeouts, 1);
}

/// Test that the resume point tracks finished pages but never the
/// landing URL, and that the next launch plan picks it up.
#[test]
fn test_resume_point_tracks_finished_pages() {
    let (mut shell, _host, _clock) = shell_fixture();

    shell.on_load_started();
    shell.on_load_finished(Some("https://app.example.com/game/7"));
    shell.on_load_started();
    shell.on_load_finished(Some(landing_url().as_str()));

    assert_eq!(
        shell.session().last_visited().as_deref(),
        Some("https://app.example.com/game/7")
    );

    let plan = shell.launch_plan();
    assert!(plan.resumed);
    assert_eq!(plan.url.as_str(), "https://app.example.com/game/7");
    assert_eq!(
        plan.headers.get("Referer").map(String::as_str),
        Some(landing_url().as_str())
    );
}

/// Test that script dialogs pass through the shell one at a time.
#[test]
fn test_script_dialogs_serialize_through_the_shell() {
    let (mut shell, host, _clock) = shell_fixture();

    let first = shell.on_script_confirm("Leave the page?", Box::new(|_| {}));
    let _second = shell.on_script_alert("Saved.", Box::new(|_| {}));
    assert_eq!(host.dialogs().len(), 1);

    shell.on_dialog_choice(first, DialogChoice::Dismissed);
    assert_eq!(host.dialogs().len(), 2);
}

/// Test the timer-driven deadline path and a failed dispatch in one
/// flow under a real runtime.
#[tokio::test]
async fn test_full_flow_under_runtime() {
    let host = Arc::new(RecordingHost::new());
    let config = ShellConfig {
        surface: SurfaceConfig {
            load_deadline: Duration::from_millis(20),
            ..Default::default()
        },
        ..ShellConfig::new(landing_url())
    };
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut shell = WebShell::new(config, host.clone(), Arc::new(MemoryStore::new()))
        .with_event_sender(tx);
    host.connect_replies(shell.reply_sender());

    let navigation = shell.on_load_started();
    tokio::time::sleep(Duration::from_millis(60)).await;
    shell.pump();

    let timed_out = std::iter::from_fn(|| rx.try_recv().ok())
        .any(|event| event == (ShellEvent::LoadTimedOut { navigation }));
    assert!(timed_out);

    shell.on_navigation_request("tg://resolve?domain=support");
    shell.pump();
    assert_eq!(host.notice_count(), 1);
}
