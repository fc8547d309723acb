//! Navigation policy for embedded web content.
//!
//! This crate decides what happens to every navigation a content surface
//! wants to start: load it, drop it, or hand it to the platform as an
//! external deep link. It also owns the throttling state around the
//! notices shown when a dispatched link turns out to have no handler.
//!
//! All time-dependent state runs off the injected [`wavelet_core::Clock`],
//! and outbound effects go through [`wavelet_core::NavigationHost`]; the
//! engine itself is synchronous and single-owner.

pub mod alerts;
pub mod attempts;
pub mod cooldown;
pub mod engine;
pub mod market;

pub use alerts::{AlertGovernor, NoticeVerdict};
pub use attempts::DeepLinkAttemptStore;
pub use cooldown::CooldownTracker;
pub use engine::NavigationPolicyEngine;
