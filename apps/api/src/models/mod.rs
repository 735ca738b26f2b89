pub mod resume;
pub mod upload;
