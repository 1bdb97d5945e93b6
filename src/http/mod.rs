//! HTTP protocol layer module
//!
//! Request line reading, response rendering and date formatting, decoupled
//! from file lookup.

pub mod date;
pub mod request;
pub mod response;

// Re-export commonly used types
pub use date::format_last_modified;
pub use request::{parse_request_line, read_raw_request, Method, Request, RequestLimits};
pub use response::{Response, Status, SERVER_NAME};
