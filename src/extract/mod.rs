//! Request extractors whose rejections render as [`PortalError`] bodies.
//!
//! [`PortalError`]: crate::PortalError

mod json;

pub use json::Json;
