//! API layer for HTTP request handling and request metadata.
//!
//! - **[`handlers`]**: Axum route handlers
//! - **[`models`]**: Request metadata parsed from headers
//!
//! The whole surface is a single endpoint at `/`: `GET` answers as a liveness check, `POST` stores
//! the body as an image object, anything else is refused with 405.

pub mod handlers;
pub mod models;
