pub mod caption_service;
pub mod error;
pub mod session_service;
