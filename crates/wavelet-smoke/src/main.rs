//! Wavelet Smoke Harness
//!
//! Drives a [`WebShell`] through a scripted embedding flow with real
//! timers: a navigation sweep, a deep-link storm, popups, script
//! dialogs, and a deliberately stalled load. Prints a JSON summary and
//! exits nonzero when the flow misbehaves, so CI can gate on it.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::json;
use tokio::sync::mpsc;
use tracing::info;
use url::Url;

use wavelet_core::config::ShellConfig;
use wavelet_core::host::{
    ContentDialog, HostReply, NavigationHost, Notice, OverlayLayout, ReplySender,
};
use wavelet_core::logging::{init_logging, LogConfig};
use wavelet_core::types::{
    CloseReason, DialogChoice, NavigationDecision, PopupConfig, SurfaceId,
};
use wavelet_core::NavigationObserver;
use wavelet_session::{JsonFileStore, MemoryStore, PreferenceStore};
use wavelet_shell::{ShellEvent, WebShell};

/// Host double for the smoke flow. Answers every dispatch over the
/// reply channel; `opened` depends on the handlers named on the command
/// line.
struct SmokeHost {
    handlers: HashSet<String>,
    dispatched: Mutex<Vec<String>>,
    notices: Mutex<Vec<Notice>>,
    mounted: AtomicUsize,
    unmounted: AtomicUsize,
    dialogs: AtomicUsize,
    replies: Mutex<Option<ReplySender>>,
}

impl SmokeHost {
    fn new(handlers: HashSet<String>) -> Self {
        Self {
            handlers,
            dispatched: Mutex::new(Vec::new()),
            notices: Mutex::new(Vec::new()),
            mounted: AtomicUsize::new(0),
            unmounted: AtomicUsize::new(0),
            dialogs: AtomicUsize::new(0),
            replies: Mutex::new(None),
        }
    }

    fn connect(&self, sender: ReplySender) {
        *self.replies.lock().unwrap() = Some(sender);
    }
}

impl NavigationHost for SmokeHost {
    fn dispatch_external(&self, url: &Url) {
        self.dispatched.lock().unwrap().push(url.to_string());
        let opened = self.handlers.contains(url.scheme());
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

    fn mount_overlay(&self, _surface: SurfaceId, _layout: &OverlayLayout) {
        self.mounted.fetch_add(1, Ordering::Relaxed);
    }

    fn unmount_overlay(&self, _surface: SurfaceId) {
        self.unmounted.fetch_add(1, Ordering::Relaxed);
    }

    fn present_dialog(&self, _dialog: &ContentDialog) {
        self.dialogs.fetch_add(1, Ordering::Relaxed);
    }
}

/// Parse command line arguments
struct Args {
    landing_url: Url,
    load_deadline_ms: u64,
    handlers: HashSet<String>,
    store_path: Option<String>,
    summary_output: Option<String>,
    log_json: bool,
}

impl Args {
    fn parse() -> Self {
        let mut args = std::env::args().skip(1);
        let mut landing_url = Url::parse("https://app.example.com/start").expect("landing URL");
        let mut load_deadline_ms = 250u64;
        let mut handlers = HashSet::new();
        let mut store_path = None;
        let mut summary_output = None;
        let mut log_json = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--landing-url" => {
                    if let Some(val) = args.next() {
                        if let Ok(url) = Url::parse(&val) {
                            landing_url = url;
                        }
                    }
                }
                "--load-deadline-ms" => {
                    if let Some(val) = args.next() {
                        load_deadline_ms = val.parse().unwrap_or(250);
                    }
                }
                "--with-handler" => {
                    if let Some(val) = args.next() {
                        handlers.insert(val);
                    }
                }
                "--store-path" => {
                    store_path = args.next();
                }
                "--summary-output" => {
                    summary_output = args.next();
                }
                "--log-json" => {
                    log_json = true;
                }
                _ => {}
            }
        }

        Self {
            landing_url,
            load_deadline_ms,
            handlers,
            store_path,
            summary_output,
            log_json,
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if args.log_json {
        init_logging(LogConfig::production());
    } else {
        init_logging(LogConfig::default());
    }

    info!(
        landing = %args.landing_url,
        load_deadline_ms = args.load_deadline_ms,
        handlers = ?args.handlers,
        store_path = ?args.store_path,
        "Starting Wavelet Smoke Harness"
    );

    let store: Arc<dyn PreferenceStore> = match args.store_path.as_deref() {
        Some(path) => Arc::new(JsonFileStore::open(path)),
        None => Arc::new(MemoryStore::new()),
    };

    let mut config = ShellConfig::new(args.landing_url.clone());
    config.surface.load_deadline = Duration::from_millis(args.load_deadline_ms);
    let notice_quota = config.policy.notice_quota;

    let host = Arc::new(SmokeHost::new(args.handlers.clone()));
    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let mut shell = WebShell::new(config, host.clone(), store).with_event_sender(events_tx);
    host.connect(shell.reply_sender());

    // Phase 1: launch plan
    let plan = shell.launch_plan();
    info!(url = %plan.url, method = %plan.method, resumed = plan.resumed, "Launch planned");

    // Phase 2: navigation sweep
    let sweep = [
        "https://app.example.com/lobby",
        "about:blank",
        "data:text/html,<p>hi</p>",
        "not a real url",
        "tg://resolve?domain=wavelet",
        "tg://resolve?domain=wavelet",
        "tel:+15551234567",
    ];
    let mut allowed = 0usize;
    let mut suppressed = 0usize;
    let mut dispatched_decisions = 0usize;
    for raw in sweep {
        match shell.on_navigation_request(raw) {
            NavigationDecision::Allow => allowed += 1,
            NavigationDecision::Suppress => suppressed += 1,
            NavigationDecision::DispatchExternal => dispatched_decisions += 1,
        }
    }
    shell.pump();

    // Phase 3: popup sheet round trip
    let popup = shell.on_new_window_requested(PopupConfig {
        url: Some(Url::parse("https://app.example.com/help").expect("popup URL")),
    });
    shell.on_window_close_requested(popup, CloseReason::BackdropTap);
    let second = shell.on_new_window_requested(PopupConfig::default());
    shell.on_window_close_requested(second, CloseReason::ContentRequest);

    // Phase 4: script dialogs, resolved in order
    let alert = shell.on_script_alert("Welcome back", Box::new(|_| {}));
    let confirm = shell.on_script_confirm("Enable sound?", Box::new(|_| {}));
    shell.on_dialog_choice(alert, DialogChoice::Accepted);
    shell.on_dialog_choice(confirm, DialogChoice::Dismissed);

    // Phase 5: a load that outlives its deadline, then one that finishes
    shell.on_load_started();
    tokio::time::sleep(Duration::from_millis(args.load_deadline_ms + 100)).await;
    shell.pump();

    shell.on_load_started();
    shell.on_load_finished(Some("https://app.example.com/game/7"));
    shell.pump();

    let next_plan = shell.launch_plan();

    let mut timeouts = 0usize;
    let mut finished = 0usize;
    let mut resume_points = 0usize;
    while let Ok(event) = events_rx.try_recv() {
        match event {
            ShellEvent::LoadTimedOut { .. } => timeouts += 1,
            ShellEvent::LoadFinished { .. } => finished += 1,
            ShellEvent::ResumePointSaved { .. } => resume_points += 1,
            _ => {}
        }
    }

    let dispatched = host.dispatched.lock().unwrap().clone();
    let notices = host.notices.lock().unwrap().len();
    let ok = timeouts == 1
        && notices <= notice_quota as usize
        && shell.open_popups() == 0
        && next_plan.resumed;

    let result = json!({
        "status": if ok { "ok" } else { "failed" },
        "launch": {
            "url": plan.url.as_str(),
            "method": plan.method.as_str(),
            "resumed": plan.resumed,
        },
        "decisions": {
            "allow": allowed,
            "suppress": suppressed,
            "dispatch_external": dispatched_decisions,
        },
        "dispatched": dispatched,
        "notices": notices,
        "popups": {
            "mounted": host.mounted.load(Ordering::Relaxed),
            "unmounted": host.unmounted.load(Ordering::Relaxed),
        },
        "dialogs": host.dialogs.load(Ordering::Relaxed),
        "loads": {
            "timeouts": timeouts,
            "finished": finished,
            "resume_points": resume_points,
        },
        "next_launch_resumed": next_plan.resumed,
    });
    println!("{}", result);

    if let Some(ref path) = args.summary_output {
        match std::fs::write(path, result.to_string()) {
            Ok(()) => info!(path, "Summary written"),
            Err(err) => tracing::error!(path, %err, "Failed to write summary"),
        }
    }

    if !ok {
        std::process::exit(1);
    }
}
