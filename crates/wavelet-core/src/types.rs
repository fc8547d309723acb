//! Common types used throughout Wavelet

use serde::{Deserialize, Serialize};
use url::Url;

/// Unique identifier for a rendering surface (primary view or popup)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SurfaceId(pub u64);

/// Unique identifier for one navigation generation on a surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NavigationId(pub u64);

/// Unique identifier for a content-script dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DialogId(pub u64);

impl SurfaceId {
    pub fn new() -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl NavigationId {
    pub fn new() -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl DialogId {
    pub fn new() -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// Outcome of evaluating a navigation request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationDecision {
    /// Let the content surface load the URL
    Allow,
    /// Drop the navigation without loading it
    Suppress,
    /// Cancel the load and hand the URL to the platform
    DispatchExternal,
}

impl NavigationDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// A navigation the embedding host asks the shell to evaluate.
///
/// Parsing never fails here; a URL the `url` crate rejects is carried
/// as raw text and classified by the policy engine as unparseable.
#[derive(Debug, Clone)]
pub struct NavigationRequest {
    raw: String,
    url: Option<Url>,
}

impl NavigationRequest {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let url = Url::parse(&raw).ok();
        Self { raw, url }
    }

    pub fn from_url(url: Url) -> Self {
        Self {
            raw: url.to_string(),
            url: Some(url),
        }
    }

    /// The request URL exactly as the host reported it
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    /// Lowercase scheme, or `None` when the URL did not parse
    pub fn scheme(&self) -> Option<&str> {
        self.url.as_ref().map(|u| u.scheme())
    }

    /// True for an empty URL or the literal `about:blank`
    pub fn is_blank(&self) -> bool {
        self.raw.is_empty() || self.raw == "about:blank"
    }
}

/// Configuration for a popup surface requested by content
#[derive(Debug, Clone, Default)]
pub struct PopupConfig {
    /// Initial URL the popup was created for, when known
    pub url: Option<Url>,
}

/// What initiated teardown of a popup surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseReason {
    /// The close affordance on the sheet
    CloseButton,
    /// A tap on the dimmed area behind the sheet
    BackdropTap,
    /// The page script closed its own window
    ContentRequest,
}

/// User response to a content dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogChoice {
    Accepted,
    Dismissed,
}

/// Capture device requested by page content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaCaptureKind {
    Camera,
    Microphone,
    CameraAndMicrophone,
}

/// Response to a content permission prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionDecision {
    Grant,
    Deny,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_ids_unique() {
        let a = SurfaceId::new();
        let b = SurfaceId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_request_parses_scheme_lowercase() {
        let req = NavigationRequest::new("TEL:+15551234567");
        assert_eq!(req.scheme(), Some("tel"));
    }

    #[test]
    fn test_request_unparseable_has_no_scheme() {
        let req = NavigationRequest::new("not a url at all");
        assert!(req.url().is_none());
        assert_eq!(req.scheme(), None);
        assert_eq!(req.raw(), "not a url at all");
    }

    #[test]
    fn test_request_blank_forms() {
        assert!(NavigationRequest::new("").is_blank());
        assert!(NavigationRequest::new("about:blank").is_blank());
        assert!(!NavigationRequest::new("about:config").is_blank());
    }
}
