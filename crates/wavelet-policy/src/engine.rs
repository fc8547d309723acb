//! Navigation policy engine.

use std::sync::Arc;

use tracing::{debug, info, warn};
use url::Url;

use wavelet_core::clock::SharedClock;
use wavelet_core::config::PolicyConfig;
use wavelet_core::host::{NavigationHost, Notice, NoticeAction, NoticeActionKind};
use wavelet_core::types::{NavigationDecision, NavigationRequest};

use crate::alerts::AlertGovernor;
use crate::attempts::DeepLinkAttemptStore;
use crate::market;

/// Schemes handed straight to the platform, bypassing deep-link
/// debouncing and missing-handler notices
pub const COMMUNICATION_SCHEMES: &[&str] = &["tel", "mailto", "sms"];

/// First-match policy over navigation requests.
///
/// Rules, in order: blank loads, web schemes, and configured internal
/// schemes stay in the surface; communication schemes dispatch
/// immediately; everything else is an app deep link, debounced per URL
/// and dispatched at most once per window. Unparseable URLs pass through
/// untouched; the engine answers every request.
///
/// Dispatch side effects happen inside [`decide`](Self::decide) through
/// the injected host. The returned decision only directs what the
/// content surface does with the load itself.
pub struct NavigationPolicyEngine {
    config: PolicyConfig,
    attempts: DeepLinkAttemptStore,
    governor: AlertGovernor,
    host: Arc<dyn NavigationHost>,
}

impl NavigationPolicyEngine {
    pub fn new(config: &PolicyConfig, clock: SharedClock, host: Arc<dyn NavigationHost>) -> Self {
        Self {
            config: config.clone(),
            attempts: DeepLinkAttemptStore::new(
                config.deeplink_debounce,
                config.attempt_retention,
                clock.clone(),
            ),
            governor: AlertGovernor::new(config, clock),
            host,
        }
    }

    /// Decide what happens to one navigation request.
    pub fn decide(&mut self, request: &NavigationRequest) -> NavigationDecision {
        if request.is_blank() {
            return NavigationDecision::Allow;
        }

        let url = match request.url() {
            Some(url) => url,
            None => {
                warn!(url = request.raw(), "Unparseable navigation URL, allowing");
                return NavigationDecision::Allow;
            }
        };

        let scheme = url.scheme();

        if scheme == "http" || scheme == "https" {
            return NavigationDecision::Allow;
        }

        if self.is_internal_scheme(scheme) {
            debug!(%url, scheme, "Internal scheme stays in the surface");
            return NavigationDecision::Allow;
        }

        if COMMUNICATION_SCHEMES.contains(&scheme) {
            info!(%url, scheme, "Dispatching communication link");
            self.host.dispatch_external(url);
            return NavigationDecision::DispatchExternal;
        }

        self.handle_deep_link(request, url)
    }

    fn handle_deep_link(&mut self, request: &NavigationRequest, url: &Url) -> NavigationDecision {
        if self.attempts.is_duplicate(request.raw()) {
            debug!(%url, "Suppressing repeated deep-link attempt");
            return NavigationDecision::Suppress;
        }

        self.attempts.record(request.raw());
        info!(%url, scheme = url.scheme(), "Dispatching app deep link");
        self.host.dispatch_external(url);
        NavigationDecision::Suppress
    }

    /// Digest the host's report of a finished dispatch attempt.
    ///
    /// A link that opened needs nothing further. A failed communication
    /// link stays silent; only failed app deep links are eligible for a
    /// missing-handler notice, and the governor decides whether one shows.
    pub fn handle_dispatch_outcome(&mut self, url: &Url, opened: bool) {
        let scheme = url.scheme();

        if opened {
            debug!(%url, scheme, "External dispatch opened a handler");
            return;
        }

        if COMMUNICATION_SCHEMES.contains(&scheme) {
            debug!(%url, scheme, "No handler for communication link, staying silent");
            return;
        }

        // Internal schemes never dispatch, so a completion for one can
        // only come from outside the engine. Not alert-worthy either way.
        if self.is_internal_scheme(scheme) {
            return;
        }

        let verdict = self.governor.permit(scheme);
        if verdict.is_permitted() {
            info!(scheme, "Presenting missing-handler notice");
            self.host.present_notice(missing_handler_notice(scheme));
        } else {
            debug!(scheme, ?verdict, "Missing-handler notice withheld");
        }
    }

    fn is_internal_scheme(&self, scheme: &str) -> bool {
        self.config.internal_schemes.iter().any(|s| s == scheme)
    }

    /// Deep-link attempts currently tracked by the debounce store
    pub fn recorded_attempts(&self) -> usize {
        self.attempts.len()
    }
}

/// Notice shown when an app deep link had no installed handler
pub fn missing_handler_notice(scheme: &str) -> Notice {
    Notice {
        title: "App not found".to_string(),
        message: "Opening this link requires an app that is not installed.".to_string(),
        actions: vec![
            NoticeAction {
                label: "Get the app".to_string(),
                kind: NoticeActionKind::OpenListing(market::store_listing(scheme).to_string()),
            },
            NoticeAction {
                label: "Cancel".to_string(),
                kind: NoticeActionKind::Dismiss,
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use wavelet_core::clock::ManualClock;
    use wavelet_core::host::{ContentDialog, OverlayLayout};
    use wavelet_core::types::SurfaceId;

    #[derive(Default)]
    struct RecordingHost {
        dispatched: Mutex<Vec<String>>,
        notices: Mutex<Vec<Notice>>,
    }

    impl RecordingHost {
        fn dispatched(&self) -> Vec<String> {
            self.dispatched.lock().unwrap().clone()
        }

        fn notice_count(&self) -> usize {
            self.notices.lock().unwrap().len()
        }
    }

    impl NavigationHost for RecordingHost {
        fn dispatch_external(&self, url: &Url) {
            self.dispatched.lock().unwrap().push(url.to_string());
        }

        fn present_notice(&self, notice: Notice) {
            self.notices.lock().unwrap().push(notice);
        }

        fn mount_overlay(&self, _surface: SurfaceId, _layout: &OverlayLayout) {}

        fn unmount_overlay(&self, _surface: SurfaceId) {}

        fn present_dialog(&self, _dialog: &ContentDialog) {}
    }

    fn engine() -> (NavigationPolicyEngine, Arc<RecordingHost>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let host = Arc::new(RecordingHost::default());
        let engine =
            NavigationPolicyEngine::new(&PolicyConfig::default(), clock.clone(), host.clone());
        (engine, host, clock)
    }

    fn decide(engine: &mut NavigationPolicyEngine, raw: &str) -> NavigationDecision {
        engine.decide(&NavigationRequest::new(raw))
    }

    #[test]
    fn test_blank_and_web_urls_allowed() {
        let (mut engine, host, _clock) = engine();
        assert_eq!(decide(&mut engine, ""), NavigationDecision::Allow);
        assert_eq!(decide(&mut engine, "about:blank"), NavigationDecision::Allow);
        assert_eq!(
            decide(&mut engine, "https://pay.example.com/checkout"),
            NavigationDecision::Allow
        );
        assert_eq!(
            decide(&mut engine, "http://example.com"),
            NavigationDecision::Allow
        );
        assert!(host.dispatched().is_empty());
    }

    #[test]
    fn test_internal_schemes_allowed() {
        let (mut engine, host, _clock) = engine();
        for raw in [
            "about:srcdoc",
            "data:text/html,<p>x</p>",
            "blob:https://example.com/550e8400",
            "javascript:void(0)",
            "file:///tmp/page.html",
            "webkit-fake-url://host/x",
            "applewebdata://123-456",
        ] {
            assert_eq!(decide(&mut engine, raw), NavigationDecision::Allow, "{raw}");
        }
        assert!(host.dispatched().is_empty());
    }

    #[test]
    fn test_unparseable_url_allowed() {
        let (mut engine, host, _clock) = engine();
        assert_eq!(
            decide(&mut engine, "not a url at all"),
            NavigationDecision::Allow
        );
        assert!(host.dispatched().is_empty());
    }

    #[test]
    fn test_communication_scheme_dispatches_immediately() {
        let (mut engine, host, _clock) = engine();
        assert_eq!(
            decide(&mut engine, "tel:+15551234567"),
            NavigationDecision::DispatchExternal
        );
        assert_eq!(
            decide(&mut engine, "mailto:support@example.com"),
            NavigationDecision::DispatchExternal
        );
        assert_eq!(
            decide(&mut engine, "sms:+15551234567"),
            NavigationDecision::DispatchExternal
        );
        assert_eq!(host.dispatched().len(), 3);
    }

    #[test]
    fn test_communication_scheme_bypasses_debounce() {
        let (mut engine, host, _clock) = engine();
        decide(&mut engine, "tel:+15551234567");
        decide(&mut engine, "tel:+15551234567");
        assert_eq!(host.dispatched().len(), 2);
        assert_eq!(engine.recorded_attempts(), 0);
    }

    #[test]
    fn test_deep_link_dispatches_once_and_suppresses() {
        let (mut engine, host, _clock) = engine();
        assert_eq!(
            decide(&mut engine, "tg://resolve?domain=support"),
            NavigationDecision::Suppress
        );
        assert_eq!(host.dispatched(), vec!["tg://resolve?domain=support"]);
        assert_eq!(engine.recorded_attempts(), 1);
    }

    #[test]
    fn test_repeated_deep_link_within_window_not_redispatched() {
        let (mut engine, host, clock) = engine();
        decide(&mut engine, "tg://resolve?domain=support");
        clock.advance(Duration::from_millis(500));
        assert_eq!(
            decide(&mut engine, "tg://resolve?domain=support"),
            NavigationDecision::Suppress
        );
        assert_eq!(host.dispatched().len(), 1);
    }

    #[test]
    fn test_deep_link_redispatched_after_window() {
        let (mut engine, host, clock) = engine();
        decide(&mut engine, "tg://resolve?domain=support");
        clock.advance(Duration::from_millis(2100));
        decide(&mut engine, "tg://resolve?domain=support");
        assert_eq!(host.dispatched().len(), 2);
    }

    #[test]
    fn test_failed_deep_link_presents_notice() {
        let (mut engine, host, _clock) = engine();
        decide(&mut engine, "tg://resolve?domain=support");
        engine.handle_dispatch_outcome(&Url::parse("tg://resolve?domain=support").unwrap(), false);
        assert_eq!(host.notice_count(), 1);
    }

    #[test]
    fn test_successful_dispatch_presents_nothing() {
        let (mut engine, host, _clock) = engine();
        decide(&mut engine, "tg://resolve?domain=support");
        engine.handle_dispatch_outcome(&Url::parse("tg://resolve?domain=support").unwrap(), true);
        assert_eq!(host.notice_count(), 0);
    }

    #[test]
    fn test_failed_communication_link_stays_silent() {
        let (mut engine, host, _clock) = engine();
        decide(&mut engine, "tel:+15551234567");
        engine.handle_dispatch_outcome(&Url::parse("tel:+15551234567").unwrap(), false);
        assert_eq!(host.notice_count(), 0);
    }

    #[test]
    fn test_outcome_for_internal_scheme_never_alerts() {
        let (mut engine, host, _clock) = engine();
        engine.handle_dispatch_outcome(&Url::parse("file:///tmp/report.pdf").unwrap(), false);
        assert_eq!(host.notice_count(), 0);
    }

    #[test]
    fn test_notice_throttled_by_governor() {
        let (mut engine, host, clock) = engine();
        let url = Url::parse("tg://resolve?domain=support").unwrap();
        engine.handle_dispatch_outcome(&url, false);
        clock.advance(Duration::from_secs(1));
        engine.handle_dispatch_outcome(&url, false);
        assert_eq!(host.notice_count(), 1);
        clock.advance(Duration::from_secs(5));
        engine.handle_dispatch_outcome(&url, false);
        assert_eq!(host.notice_count(), 2);
    }

    #[test]
    fn test_notice_suggests_marketplace_listing() {
        let notice = missing_handler_notice("tg");
        assert_eq!(notice.title, "App not found");
        let listing = notice.actions.iter().find_map(|a| match &a.kind {
            NoticeActionKind::OpenListing(url) => Some(url.clone()),
            NoticeActionKind::Dismiss => None,
        });
        assert_eq!(
            listing.as_deref(),
            Some("https://apps.apple.com/app/telegram-messenger/id686449807")
        );
    }

    #[test]
    fn test_scheme_matching_is_case_insensitive() {
        let (mut engine, host, _clock) = engine();
        assert_eq!(
            decide(&mut engine, "TEL:+15551234567"),
            NavigationDecision::DispatchExternal
        );
        assert_eq!(
            decide(&mut engine, "HTTPS://EXAMPLE.COM"),
            NavigationDecision::Allow
        );
        assert_eq!(host.dispatched().len(), 1);
    }
}
