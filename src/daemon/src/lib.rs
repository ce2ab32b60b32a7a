pub mod daemon_run;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod signal;
pub mod source;
pub mod state;
pub mod structs;

#[cfg(test)]
pub(crate) mod test_utils;

pub use daemon_run::run;
pub use server::ForwarderServer;
pub use state::DaemonState;
