pub mod filename;
pub mod response;
pub mod temp;
pub mod upload;
