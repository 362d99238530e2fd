//! Framework-agnostic business logic.
//!
//! Everything here takes a `&DatabaseConnection` or plain bytes and returns
//! [`crate::errors::Result`]; the request envelope and response shaping live in
//! [`crate::handlers`].

pub mod category;
pub mod fields;
pub mod image;
pub mod news;
pub mod product;
pub mod update;
pub mod upload;
