//! Automatic re-indentation
//!
//! This module contains the editor-agnostic core of Codepad:
//! - `mode` - language indentation policies ([`Mode`], [`CStyleMode`])
//! - `session` - line buffer with lexical state tracking ([`TextSession`])
//! - `scheduler` - debounce and reentrancy guard ([`DebounceScheduler`])
//! - `engine` - the re-indentation pass ([`ReindentEngine`])

mod engine;
mod mode;
mod scheduler;
mod session;

pub use engine::{PassReport, ReindentEngine};
pub use mode::{CStyleMode, Mode};
pub use scheduler::{Clock, IndentConfig, SystemClock};
pub use session::{CursorPosition, Selection, Session, TextSession};

#[cfg(test)]
pub(crate) use mode::{leading_whitespace, LineState};
#[cfg(test)]
pub(crate) use scheduler::{ManualClock, SchedulerPhase};
