//! Request handler module
//!
//! Turns a validated request into a response by looking the path up under
//! the content root.

pub mod static_files;

// Re-export main entry point
pub use static_files::{generate_response, ContentRoot};
