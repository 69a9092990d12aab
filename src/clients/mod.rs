pub mod pdf;
pub mod s3;
