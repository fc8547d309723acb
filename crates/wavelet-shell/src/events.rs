//! Shell observability events.

use url::Url;

use wavelet_core::types::NavigationId;

/// Load milestones the shell reports to interested listeners
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellEvent {
    LoadStarted {
        navigation: NavigationId,
    },
    LoadFinished {
        url: Option<Url>,
    },
    LoadFailed {
        reason: String,
    },
    /// A navigation outlived its deadline and may be stalled
    LoadTimedOut {
        navigation: NavigationId,
    },
    /// The resume URL for the next launch was persisted
    ResumePointSaved {
        url: Url,
    },
}
