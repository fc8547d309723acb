//! Missing-handler notice throttling.

use std::time::{Duration, Instant};

use tracing::debug;
use wavelet_core::clock::SharedClock;
use wavelet_core::config::PolicyConfig;

use crate::cooldown::CooldownTracker;

/// Why a notice was permitted or withheld
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeVerdict {
    Permitted,
    /// Too soon after the previous notice, whatever its scheme
    TooSoon,
    /// The same scheme noticed recently and is still cooling down
    SchemeCoolingDown,
    /// The rolling window quota is exhausted
    QuotaExhausted,
}

impl NoticeVerdict {
    pub fn is_permitted(&self) -> bool {
        matches!(self, Self::Permitted)
    }
}

/// Rate governor for missing-handler notices.
///
/// A notice is permitted only when the global spacing since the previous
/// notice has elapsed, the scheme is out of its own cooldown, and the
/// rolling window quota has room. State advances only on permit; a
/// withheld notice cannot delay the next one. The quota window rolls
/// lazily when a permit request arrives past its end.
pub struct AlertGovernor {
    spacing: Duration,
    quota: u32,
    window: Duration,
    scheme_cooldowns: CooldownTracker,
    last_notice: Option<(String, Instant)>,
    window_start: Instant,
    shown_in_window: u32,
    clock: SharedClock,
}

impl AlertGovernor {
    pub fn new(config: &PolicyConfig, clock: SharedClock) -> Self {
        Self {
            spacing: config.notice_spacing,
            quota: config.notice_quota,
            window: config.notice_window,
            scheme_cooldowns: CooldownTracker::new(config.scheme_notice_spacing, clock.clone()),
            last_notice: None,
            window_start: clock.now(),
            shown_in_window: 0,
            clock,
        }
    }

    /// Evaluate one notice request for `scheme`, committing all state on
    /// permit and none of it on denial.
    pub fn permit(&mut self, scheme: &str) -> NoticeVerdict {
        let now = self.clock.now();

        if now.duration_since(self.window_start) > self.window {
            self.window_start = now;
            self.shown_in_window = 0;
        }

        if let Some((ref last_scheme, at)) = self.last_notice {
            if now.duration_since(at) < self.spacing {
                debug!(scheme, last = %last_scheme, "Notice withheld, too soon after previous");
                return NoticeVerdict::TooSoon;
            }
        }

        if self.shown_in_window >= self.quota {
            debug!(scheme, quota = self.quota, "Notice withheld, window quota exhausted");
            return NoticeVerdict::QuotaExhausted;
        }

        // Mutating check last; the tracker records only on permit and
        // everything above has already passed.
        if !self.scheme_cooldowns.allow(scheme) {
            debug!(scheme, "Notice withheld, scheme cooling down");
            return NoticeVerdict::SchemeCoolingDown;
        }

        self.last_notice = Some((scheme.to_string(), now));
        self.shown_in_window += 1;
        NoticeVerdict::Permitted
    }

    /// Notices permitted inside the current window
    pub fn shown_in_window(&self) -> u32 {
        self.shown_in_window
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use wavelet_core::clock::ManualClock;

    fn governor() -> (AlertGovernor, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let governor = AlertGovernor::new(&PolicyConfig::default(), clock.clone());
        (governor, clock)
    }

    #[test]
    fn test_first_notice_permitted() {
        let (mut governor, _clock) = governor();
        assert_eq!(governor.permit("tg"), NoticeVerdict::Permitted);
    }

    #[test]
    fn test_same_scheme_within_spacing_denied() {
        let (mut governor, clock) = governor();
        assert_eq!(governor.permit("tg"), NoticeVerdict::Permitted);
        clock.advance(Duration::from_millis(4900));
        assert_eq!(governor.permit("tg"), NoticeVerdict::TooSoon);
    }

    #[test]
    fn test_same_scheme_after_spacing_permitted() {
        let (mut governor, clock) = governor();
        assert_eq!(governor.permit("tg"), NoticeVerdict::Permitted);
        clock.advance(Duration::from_millis(5100));
        assert_eq!(governor.permit("tg"), NoticeVerdict::Permitted);
    }

    #[test]
    fn test_different_scheme_still_bound_by_spacing() {
        let (mut governor, clock) = governor();
        assert_eq!(governor.permit("tg"), NoticeVerdict::Permitted);
        clock.advance(Duration::from_secs(1));
        assert_eq!(governor.permit("viber"), NoticeVerdict::TooSoon);
    }

    #[test]
    fn test_quota_exhausts_inside_window() {
        let (mut governor, clock) = governor();
        assert_eq!(governor.permit("a"), NoticeVerdict::Permitted);
        clock.advance(Duration::from_secs(10));
        assert_eq!(governor.permit("b"), NoticeVerdict::Permitted);
        clock.advance(Duration::from_secs(10));
        assert_eq!(governor.permit("c"), NoticeVerdict::Permitted);
        clock.advance(Duration::from_secs(5));
        assert_eq!(governor.permit("d"), NoticeVerdict::QuotaExhausted);
        assert_eq!(governor.shown_in_window(), 3);
    }

    #[test]
    fn test_quota_window_rolls_over() {
        let (mut governor, clock) = governor();
        for scheme in ["a", "b", "c"] {
            assert!(governor.permit(scheme).is_permitted());
            clock.advance(Duration::from_secs(10));
        }
        assert_eq!(governor.permit("d"), NoticeVerdict::QuotaExhausted);

        // 61 s past the window start the count resets
        clock.advance(Duration::from_secs(31));
        assert_eq!(governor.permit("d"), NoticeVerdict::Permitted);
        assert_eq!(governor.shown_in_window(), 1);
    }

    #[test]
    fn test_denial_does_not_commit_state() {
        let (mut governor, clock) = governor();
        assert!(governor.permit("tg").is_permitted());
        clock.advance(Duration::from_secs(1));
        assert_eq!(governor.permit("viber"), NoticeVerdict::TooSoon);
        // Spacing still measured from the permitted notice, and the
        // denied one did not consume quota.
        clock.advance(Duration::from_secs(4));
        assert_eq!(governor.permit("viber"), NoticeVerdict::Permitted);
        assert_eq!(governor.shown_in_window(), 2);
    }

    #[test]
    fn test_longer_scheme_cooldown_outlasts_spacing() {
        let clock = Arc::new(ManualClock::new());
        let config = PolicyConfig {
            scheme_notice_spacing: Duration::from_secs(20),
            ..Default::default()
        };
        let mut governor = AlertGovernor::new(&config, clock.clone());

        assert!(governor.permit("tg").is_permitted());
        clock.advance(Duration::from_secs(6));
        assert!(governor.permit("viber").is_permitted());
        clock.advance(Duration::from_secs(6));
        // Global spacing elapsed but tg's own cooldown has not
        assert_eq!(governor.permit("tg"), NoticeVerdict::SchemeCoolingDown);
        clock.advance(Duration::from_secs(10));
        assert_eq!(governor.permit("tg"), NoticeVerdict::Permitted);
    }
}
