// Profile editing and the uploaded-image pipeline.

pub mod handlers;
pub mod images;
pub mod storage;
pub mod upload;
