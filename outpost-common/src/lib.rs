pub mod address;
pub mod application;
pub mod logging;
pub mod message;
pub mod text;

pub use tracing;

/// Signal broadcast to long-running components when the process is
/// shutting down.
#[derive(Debug, Clone, Copy)]
pub enum Signal {
    Shutdown,
}
