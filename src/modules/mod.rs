pub mod image;
pub mod progress;
pub mod video;
