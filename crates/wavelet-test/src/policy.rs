//! # Policy Scenarios
//!
//! Decision rules, dispatch outcomes, and notice throttling driven the
//! way a page session would produce them.

use std::time::Duration;

use url::Url;

use wavelet_core::types::{NavigationDecision, NavigationRequest};

use crate::harness::engine_fixture;

/// Test a realistic page journey: web navigations load, app links
/// dispatch once each, and rapid retries are absorbed.
#[test]
fn test_checkout_journey_dispatches_each_app_once() {
    let (mut engine, host, clock) = engine_fixture();

    let mut decide = |raw: &str| engine.decide(&NavigationRequest::new(raw));

    assert_eq!(decide("https://pay.example.com/checkout"), NavigationDecision::Allow);
    assert_eq!(decide("about:blank"), NavigationDecision::Allow);

    // The page fires the bank link twice while the redirect settles
    assert_eq!(decide("bank-app://pay?order=42"), NavigationDecision::Suppress);
    assert_eq!(decide("bank-app://pay?order=42"), NavigationDecision::Suppress);

    clock.advance(Duration::from_millis(700));
    assert_eq!(decide("wallet://confirm?order=42"), NavigationDecision::Suppress);

    // Web navigation is untouched by any cooldown state
    assert_eq!(decide("https://pay.example.com/done"), NavigationDecision::Allow);

    assert_eq!(
        host.dispatched()
            .iter()
            .map(Url::as_str)
            .collect::<Vec<_>>(),
        vec!["bank-app://pay?order=42", "wallet://confirm?order=42"]
    );
}

/// Test that the notice quota spans a whole journey and replenishes
/// only when the window rolls over.
#[test]
fn test_notice_quota_spans_the_journey() {
    let (mut engine, host, clock) = engine_fixture();

    let mut fail = |raw: &str| {
        engine.handle_dispatch_outcome(&Url::parse(raw).unwrap(), false);
    };

    fail("tg://resolve?domain=a");
    clock.advance(Duration::from_secs(6));
    fail("sberbank://pay");
    clock.advance(Duration::from_secs(6));
    fail("whatsapp://send?text=hi");
    assert_eq!(host.notice_count(), 3);

    clock.advance(Duration::from_secs(6));
    fail("viber://chat");
    assert_eq!(host.notice_count(), 3, "quota for this window is spent");

    // 61s after the window opened
    clock.advance(Duration::from_secs(43));
    fail("viber://chat");
    assert_eq!(host.notice_count(), 4);
}

/// Test that notice spacing is global across schemes while dispatch
/// debouncing is per URL.
#[test]
fn test_alerting_is_global_but_debounce_is_per_url() {
    let (mut engine, host, _clock) = engine_fixture();

    engine.decide(&NavigationRequest::new("tg://resolve?domain=a"));
    engine.decide(&NavigationRequest::new("viber://chat"));
    assert_eq!(host.dispatch_count(), 2);

    engine.handle_dispatch_outcome(&Url::parse("tg://resolve?domain=a").unwrap(), false);
    engine.handle_dispatch_outcome(&Url::parse("viber://chat").unwrap(), false);
    assert_eq!(host.notice_count(), 1, "second notice lands inside the spacing gap");
}

/// Test the notice payload a host receives for a known app.
#[test]
fn test_notice_payload_names_the_listing() {
    let (mut engine, host, _clock) = engine_fixture();
    engine.handle_dispatch_outcome(&Url::parse("tg://resolve?domain=a").unwrap(), false);

    let notice = &host.notices()[0];
    let value = serde_json::to_value(notice).unwrap();
    assert_eq!(value["title"], "App not found");
    assert_eq!(value["actions"][0]["label"], "Get the app");
    assert_eq!(
        value["actions"][0]["kind"]["open_listing"],
        "https://apps.apple.com/app/telegram-messenger/id686449807"
    );
    assert_eq!(value["actions"][1]["kind"], "dismiss");
}

/// Test that an unrecognized scheme still offers the marketplace root.
#[test]
fn test_unknown_scheme_falls_back_to_generic_listing() {
    let (mut engine, host, _clock) = engine_fixture();
    engine.handle_dispatch_outcome(&Url::parse("some-game://level/3").unwrap(), false);

    let value = serde_json::to_value(&host.notices()[0]).unwrap();
    assert_eq!(
        value["actions"][0]["kind"]["open_listing"],
        "https://apps.apple.com"
    );
}
