//! Read a filtered status stream aloud.
//!
//! Wires the `net` event reader to a `tts` voice: every decoded event is
//! printed and its author (or text) spoken.

pub mod announcer;
pub mod cli;
pub mod logging;

pub use announcer::{Announcer, Field};
pub use cli::{Cli, Engine};
pub use logging::init_logging;
