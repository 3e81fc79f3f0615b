//! HTTP request handlers.
//!
//! - [`upload`]: method dispatch, header validation and the object store write
//!
//! # Error Handling
//!
//! Handlers return [`crate::errors::Error`], which converts to a bare HTTP status code. No
//! response carries a body.

pub mod upload;
