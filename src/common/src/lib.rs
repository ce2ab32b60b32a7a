pub mod config;
pub mod constants;
pub mod event;
pub mod logging;
pub mod sentry;
pub mod telemetry;

pub use crate::config::{Config, ConfigLoader};
pub use crate::event::{Event, MalformedEvent};
