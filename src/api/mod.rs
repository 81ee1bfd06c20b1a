//! REST backend access
//!
//! This module wraps the school backend's HTTP API: a thin JSON client,
//! typed handles per collection, and the error type they share.

pub mod client;
pub mod errors;
pub mod resources;

pub use client::ApiClient;
pub use errors::ApiError;
pub use resources::{Collections, Courses, Enrollments, RecordWriter, Students};
