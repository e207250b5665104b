//! HTTP surface of the gateway.
//!
//! - [`gateway_api`]: Request/response schemas, router, and route handlers
//! - [`streaming`]: Relay of an upstream token stream onto the response body

pub mod gateway_api;
pub mod streaming;
