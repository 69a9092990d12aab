//! Object resolution pipeline: policy, fetch, classification, materialization.

pub mod backend;
pub mod body;
pub mod classify;
pub mod content;
pub mod error;
pub mod policy;
pub mod resource;
