//! Wavelet Core Library
//!
//! This crate provides shared types, errors, configuration, and the
//! host/observer boundary traits for Wavelet shells.

pub mod clock;
pub mod config;
pub mod error;
pub mod host;
pub mod logging;
pub mod types;

pub use clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use config::ShellConfig;
pub use error::{WaveletError, WaveletResult};
pub use host::{HostReply, NavigationHost, NavigationObserver, ReplySender};
pub use types::{NavigationDecision, NavigationRequest, SurfaceId};
