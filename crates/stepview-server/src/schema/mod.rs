//! API schema types for request/response definitions.

pub mod code;
pub mod sessions;
