pub mod meetings_handler;
pub mod problem;
pub mod transcribe_handler;
