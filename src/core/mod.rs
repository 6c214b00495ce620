pub mod app;
pub mod message;
pub mod providers;
pub mod sessions;
pub mod state;
