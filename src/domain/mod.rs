pub mod errors;
pub mod meeting;
