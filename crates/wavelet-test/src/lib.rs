//! # Wavelet Test
//!
//! Scenario tests for the wavelet shell stack.
//!
//! Unit tests live next to the code they cover; the modules here wire
//! several crates together and drive them the way an embedder would:
//! through [`wavelet_core::NavigationObserver`] and the reply channel,
//! with a manual clock standing in for real time.
//!
//! ## Modules
//!
//! 1. **policy**: decision rules, dispatch outcomes, notice throttling
//! 2. **surfaces**: popup sheets and script dialogs against a host
//! 3. **session**: persistence and launch planning across restarts
//! 4. **shell**: full embedding flows through the observer boundary

pub mod harness;
pub mod policy;
pub mod session;
pub mod shell;
pub mod surfaces;

pub use harness::{engine_fixture, shell_fixture, shell_fixture_with, RecordingHost};
