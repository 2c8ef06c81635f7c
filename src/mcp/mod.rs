//! Glue between the rmcp protocol layer and the tool handlers.

pub mod service;

pub use service::SteampipeService;
