pub mod app;
pub mod application;
pub mod config;
pub mod domain;
pub mod interface;
pub mod state;
pub mod store;
pub mod transcription;

pub use app::build_router;
