pub mod buffer;
pub mod error;
pub mod exporters;
pub mod flush;
pub mod forwarder;
pub mod shutdown;
pub mod trigger;

#[cfg(test)]
pub(crate) mod test_utils;

pub use buffer::{BufferStats, EventBuffer};
pub use error::ForwarderError;
pub use flush::{FlushConfig, FlushExecutor, FlushStats};
pub use forwarder::{Forwarder, ForwarderInfo};
pub use shutdown::{DrainReport, ShutdownCoordinator, ShutdownState};
