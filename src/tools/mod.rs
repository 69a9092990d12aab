pub mod s3_router;
