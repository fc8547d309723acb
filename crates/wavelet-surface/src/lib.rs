//! Surface lifecycle for embedded web content.
//!
//! Three concerns live here: popup windows presented as sheets over the
//! primary surface, supervision of page loads against a deadline, and
//! relaying script dialogs to the host one at a time. None of it renders
//! anything; state machines run here and the host draws.

pub mod dialog;
pub mod popup;
pub mod watchdog;

pub use dialog::DialogBroker;
pub use popup::{PopupEvent, PopupState, PopupWindowManager};
pub use watchdog::LoadWatchdog;
