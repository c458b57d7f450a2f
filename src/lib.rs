// Library surface for the typing engine, shared by the TUI binary and the
// headless integration tests. Rendering stays in the binary.
pub mod app_dirs;
pub mod clock;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod passages;
pub mod recorder;
pub mod runtime;
pub mod session;

pub use error::{Error, Result};
