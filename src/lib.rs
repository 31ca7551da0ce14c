// Library surface for the binary and for headless/integration tests.
// Terminal drawing lives in the binary; everything here is UI agnostic.
pub mod app_dirs;
pub mod clock;
pub mod config;
pub mod display;
pub mod error;
pub mod metrics;
pub mod paragraphs;
pub mod runtime;
pub mod session;
pub mod timer;

pub use error::{KeysprintError, Result};
