pub mod axum_handler;
pub mod config;
pub mod error;
pub mod file_storage;
pub mod font;
pub mod image_loader;
pub mod image_processor;
