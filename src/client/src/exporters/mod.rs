pub mod event_forward;
pub mod event_writer;

pub use event_writer::{EventWriter, EventWriterEnum};
