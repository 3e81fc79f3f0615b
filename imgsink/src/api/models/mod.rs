//! API request data models.
//!
//! - [`upload`]: image upload metadata carried in request headers

pub mod upload;
