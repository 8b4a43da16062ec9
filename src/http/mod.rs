//! HTTP protocol layer module
//!
//! Protocol-level helpers shared by the API router.

pub mod response;

// Re-export commonly used items
pub use response::build_json_response;
