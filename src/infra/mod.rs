pub mod boot;
pub mod config;
pub mod http_app;
pub mod logging;
pub mod runtime;
