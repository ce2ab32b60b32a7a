pub mod commands;
pub mod daemon_client;
pub mod process_command;
