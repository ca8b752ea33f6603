pub mod alignment;
pub mod classifier;
pub mod hierarchy;
pub mod screen_model;
pub mod text_merge;
