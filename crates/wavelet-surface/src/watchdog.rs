//! Load supervision.

use std::time::{Duration, Instant};

use tracing::debug;

use wavelet_core::clock::SharedClock;
use wavelet_core::types::NavigationId;

struct Deadline {
    navigation: NavigationId,
    at: Instant,
    fired: bool,
}

/// Watches one navigation at a time and reports when it outlives its
/// deadline.
///
/// Starting a navigation arms a fresh deadline and disarms the previous
/// one, so a timer armed for an abandoned generation can never fire
/// against the current page. A deadline reports at most once, and a
/// finish or failure disarms it; a finish arriving after the report does
/// not produce a second one.
pub struct LoadWatchdog {
    deadline_after: Duration,
    current: Option<Deadline>,
    load_succeeded: bool,
    clock: SharedClock,
}

impl LoadWatchdog {
    pub fn new(deadline_after: Duration, clock: SharedClock) -> Self {
        Self {
            deadline_after,
            current: None,
            load_succeeded: false,
            clock,
        }
    }

    /// Arm the watchdog for a new navigation generation.
    pub fn navigation_started(&mut self) -> NavigationId {
        let navigation = NavigationId::new();
        let at = self.clock.now() + self.deadline_after;
        if let Some(previous) = self.current.replace(Deadline {
            navigation,
            at,
            fired: false,
        }) {
            debug!(
                superseded = previous.navigation.0,
                current = navigation.0,
                "Superseding load deadline"
            );
        }
        self.load_succeeded = false;
        navigation
    }

    /// The load reached completion; disarm and remember the success.
    pub fn navigation_finished(&mut self) {
        self.load_succeeded = true;
        self.current = None;
    }

    /// The load failed; disarm without marking success.
    pub fn navigation_failed(&mut self) {
        self.load_succeeded = false;
        self.current = None;
    }

    /// Deadline instant of the armed generation, if it has not fired
    pub fn deadline(&self) -> Option<Instant> {
        self.current.as_ref().filter(|d| !d.fired).map(|d| d.at)
    }

    /// Generation currently under supervision
    pub fn armed_navigation(&self) -> Option<NavigationId> {
        self.current.as_ref().map(|d| d.navigation)
    }

    /// Whether the most recent load reached completion
    pub fn load_succeeded(&self) -> bool {
        self.load_succeeded
    }

    /// Poll-driven check. Returns the stalled generation exactly once
    /// when its deadline has passed.
    pub fn poll(&mut self) -> Option<NavigationId> {
        let now = self.clock.now();
        match &mut self.current {
            Some(deadline) if !deadline.fired && now >= deadline.at => {
                deadline.fired = true;
                Some(deadline.navigation)
            }
            _ => None,
        }
    }

    /// Timer-driven check. Accepts an elapsed-deadline signal for a
    /// generation; true when that generation should be reported stalled.
    pub fn on_deadline_elapsed(&mut self, navigation: NavigationId) -> bool {
        match &mut self.current {
            Some(deadline) if deadline.navigation == navigation => {
                // The success flag guards a timer that lost the race
                // with a finish on the same generation.
                if self.load_succeeded || deadline.fired {
                    return false;
                }
                deadline.fired = true;
                true
            }
            _ => {
                debug!(navigation = navigation.0, "Stale load deadline ignored");
                false
            }
        }
    }
}
