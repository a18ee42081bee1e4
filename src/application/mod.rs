pub mod dto;
pub mod meeting_service;
