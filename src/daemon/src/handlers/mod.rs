pub mod event;
pub mod info;
pub mod terminate;
