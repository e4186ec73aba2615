//! [C5/C13] STM Store: append-only state entries with supersession, the
//! intent gate, and the session scratchpad.

pub mod entry;
pub mod gate;
pub mod session;

pub use entry::{StateType, StmEntry};
pub use gate::{evaluate, GateRejection, MIN_STM_CONFIDENCE};
pub use session::SessionScratchpad;
