//! Launch request planning.

use std::collections::HashMap;

use http::Method;
use tracing::{debug, info};
use url::Url;

use wavelet_core::config::ShellConfig;

/// The initial request a host issues when the shell starts
#[derive(Debug, Clone)]
pub struct LaunchPlan {
    pub url: Url,
    pub method: Method,
    pub headers: HashMap<String, String>,
    /// True when resuming a persisted page instead of the landing URL
    pub resumed: bool,
}

/// Build the launch plan for a session.
///
/// A persisted page wins when it is a usable absolute URL; otherwise the
/// shell starts over at the landing URL with a POST announcing a fresh
/// session. Headers mirror an ordinary browser so the landing service
/// treats the embedded surface like any visitor.
pub fn build_launch_plan(
    config: &ShellConfig,
    last_visited: Option<&str>,
    referer: Option<&Url>,
) -> LaunchPlan {
    let resumable = last_visited
        .filter(|v| !v.is_empty() && *v != "about:blank")
        .and_then(|v| Url::parse(v).ok());

    let mut headers = browser_headers(config, referer);

    match resumable {
        Some(url) => {
            info!(%url, "Resuming persisted session");
            LaunchPlan {
                url,
                method: Method::GET,
                headers,
                resumed: true,
            }
        }
        None => {
            debug!(landing = %config.landing_url, "Starting at the landing URL");
            headers.insert(
                "Content-Type".to_string(),
                "application/json; charset=utf-8".to_string(),
            );
            LaunchPlan {
                url: config.landing_url.clone(),
                method: Method::POST,
                headers,
                resumed: false,
            }
        }
    }
}

/// Ordinary browser headers for shell-originated requests
pub fn browser_headers(config: &ShellConfig, referer: Option<&Url>) -> HashMap<String, String> {
    let mut headers: HashMap<String, String> = [
        (
            "Accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8".to_string(),
        ),
        ("Accept-Language", config.accept_language.clone()),
        ("Accept-Encoding", "gzip, deflate, br".to_string()),
        ("DNT", "1".to_string()),
        ("Connection", "keep-alive".to_string()),
        ("Sec-Fetch-Site", "same-origin".to_string()),
        ("Sec-Fetch-Mode", "navigate".to_string()),
        ("Sec-Fetch-Dest", "document".to_string()),
        ("Upgrade-Insecure-Requests", "1".to_string()),
        ("User-Agent", config.user_agent.clone()),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect();

    if let Some(referer) = referer {
        headers.insert("Referer".to_string(), referer.to_string());
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ShellConfig {
        ShellConfig::new(Url::parse("https://landing.example.com/start").unwrap())
    }

    #[test]
    fn test_fresh_session_posts_to_landing() {
        let plan = build_launch_plan(&config(), None, None);
        assert_eq!(plan.method, Method::POST);
        assert_eq!(plan.url.as_str(), "https://landing.example.com/start");
        assert!(!plan.resumed);
        assert_eq!(
            plan.headers.get("Content-Type").map(String::as_str),
            Some("application/json; charset=utf-8")
        );
    }

    #[test]
    fn test_blank_persisted_url_starts_fresh() {
        for stale in ["", "about:blank"] {
            let plan = build_launch_plan(&config(), Some(stale), None);
            assert_eq!(plan.method, Method::POST, "{stale:?}");
            assert!(!plan.resumed);
        }
    }

    #[test]
    fn test_unparseable_persisted_url_starts_fresh() {
        let plan = build_launch_plan(&config(), Some("not a url"), None);
        assert_eq!(plan.method, Method::POST);
        assert!(!plan.resumed);
    }

    #[test]
    fn test_persisted_url_resumes_with_get() {
        let plan = build_launch_plan(&config(), Some("https://example.com/lobby?t=1"), None);
        assert_eq!(plan.method, Method::GET);
        assert_eq!(plan.url.as_str(), "https://example.com/lobby?t=1");
        assert!(plan.resumed);
        assert!(!plan.headers.contains_key("Content-Type"));
    }

    #[test]
    fn test_headers_look_like_a_browser() {
        let config = config();
        let plan = build_launch_plan(&config, None, None);
        assert_eq!(
            plan.headers.get("Accept-Language"),
            Some(&config.accept_language)
        );
        assert_eq!(plan.headers.get("User-Agent"), Some(&config.user_agent));
        assert_eq!(
            plan.headers.get("Sec-Fetch-Mode").map(String::as_str),
            Some("navigate")
        );
        assert_eq!(plan.headers.get("DNT").map(String::as_str), Some("1"));
        assert!(!plan.headers.contains_key("Referer"));
    }

    #[test]
    fn test_referer_included_when_known() {
        let referer = Url::parse("https://example.com/previous").unwrap();
        let plan = build_launch_plan(&config(), Some("https://example.com/next"), Some(&referer));
        assert_eq!(
            plan.headers.get("Referer").map(String::as_str),
            Some("https://example.com/previous")
        );
    }
}
