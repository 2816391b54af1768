//! Terminal UI
//!
//! The build spinner writes to stderr and disappears when stderr is not an
//! interactive terminal. Maintenance commands print their reports to stdout.

mod context;
mod output;
mod progress;
mod prompts;

pub use context::UiContext;
pub use output::{remark, step_ok, step_ok_detail, step_warn_hint};
pub use progress::BuildSpinner;
pub use prompts::confirm_inline;
