//! Live-session presentation: countdown timers, display state, and the poll
//! loop that keeps both in sync with the server.

pub mod display;
pub mod engine;
pub(crate) mod poller;
