pub mod background;
pub mod catalog;
pub mod color;
pub mod editor;
pub mod error;
pub mod image;
pub mod image_loader_trait;
pub mod image_processor_trait;
pub mod position;
pub mod position_tracker;
pub mod text_overlay;
