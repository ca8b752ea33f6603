pub mod contours;
pub mod error;
pub mod geometry;
pub mod options;
pub mod preprocess;
pub mod template;
pub mod visualize;
