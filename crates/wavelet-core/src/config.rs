//! Shell configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Top-level configuration for an embedded web shell
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShellConfig {
    /// Landing page loaded when nothing useful was persisted
    pub landing_url: Url,

    /// User agent reported for shell-originated requests
    pub user_agent: String,

    /// Accept-Language value for shell-originated requests
    pub accept_language: String,

    /// Navigation policy tuning
    pub policy: PolicyConfig,

    /// Popup presentation and load supervision tuning
    pub surface: SurfaceConfig,

    /// Content permission handling
    pub permissions: PermissionConfig,
}

/// Tuning for the navigation policy engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Window within which a repeated attempt for the same URL is suppressed
    pub deeplink_debounce: Duration,

    /// Age past which recorded attempts are pruned
    pub attempt_retention: Duration,

    /// Minimum spacing between any two missing-handler notices
    pub notice_spacing: Duration,

    /// Minimum spacing between two notices for the same scheme
    pub scheme_notice_spacing: Duration,

    /// Maximum notices inside one rolling window
    pub notice_quota: u32,

    /// Length of the rolling notice window
    pub notice_window: Duration,

    /// Schemes the content surface handles itself, besides http/https
    pub internal_schemes: Vec<String>,
}

/// Popup presentation and load supervision tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurfaceConfig {
    /// Time allowed for a navigation before it is reported stalled
    pub load_deadline: Duration,

    /// Popup sheet metrics
    pub popup: PopupStyle,
}

/// Visual metrics for the popup sheet.
///
/// The shell never renders; these are recorded as state and handed to the
/// host when an overlay is mounted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopupStyle {
    /// Fraction of the container height the sheet occupies
    pub height_fraction: f64,

    /// Sheet corner radius in points
    pub corner_radius: f64,

    /// Dim opacity of the backdrop behind the sheet
    pub backdrop_opacity: f64,

    /// Slide-in duration from below the container
    pub present_duration: Duration,

    /// Slide-out duration back off screen
    pub dismiss_duration: Duration,
}

/// Content permission handling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionConfig {
    /// Grant camera and microphone capture without prompting
    pub auto_grant_media_capture: bool,

    /// Allow the platform context menu inside content
    pub allow_context_menu: bool,
}

impl ShellConfig {
    /// Configuration for a shell anchored at the given landing page
    pub fn new(landing_url: Url) -> Self {
        Self {
            landing_url,
            ..Default::default()
        }
    }
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            landing_url: Url::parse("about:blank").unwrap(),
            user_agent: format!(
                "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Wavelet/{}",
                env!("CARGO_PKG_VERSION")
            ),
            accept_language: "en-US,en;q=0.9".to_string(),
            policy: PolicyConfig::default(),
            surface: SurfaceConfig::default(),
            permissions: PermissionConfig::default(),
        }
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            deeplink_debounce: Duration::from_secs(2),
            attempt_retention: Duration::from_secs(10),
            notice_spacing: Duration::from_secs(5),
            scheme_notice_spacing: Duration::from_secs(5),
            notice_quota: 3,
            notice_window: Duration::from_secs(60),
            internal_schemes: [
                "about",
                "data",
                "blob",
                "javascript",
                "file",
                "webkit-fake-url",
                "applewebdata",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            load_deadline: Duration::from_secs(5),
            popup: PopupStyle::default(),
        }
    }
}

impl Default for PopupStyle {
    fn default() -> Self {
        Self {
            height_fraction: 0.8,
            corner_radius: 16.0,
            backdrop_opacity: 0.5,
            present_duration: Duration::from_millis(400),
            dismiss_duration: Duration::from_millis(300),
        }
    }
}

impl Default for PermissionConfig {
    fn default() -> Self {
        Self {
            auto_grant_media_capture: true,
            allow_context_menu: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_windows() {
        let config = PolicyConfig::default();
        assert_eq!(config.deeplink_debounce, Duration::from_secs(2));
        assert_eq!(config.attempt_retention, Duration::from_secs(10));
        assert_eq!(config.notice_quota, 3);
        assert!(config.internal_schemes.iter().any(|s| s == "applewebdata"));
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let config = ShellConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: ShellConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.landing_url, config.landing_url);
        assert_eq!(back.policy.notice_window, config.policy.notice_window);
        assert_eq!(back.surface.popup, config.surface.popup);
    }
}
