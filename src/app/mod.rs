//! Explorer session: view state, fetch orchestration and interactive commands.

pub mod commands;
pub mod explorer;
pub mod state;

pub use self::commands::{respond, FilterArgs, TabArg};
pub use self::explorer::Explorer;
pub use self::state::{AppState, Generation, ResultTab};
