//! Domain types for the Nolej integration backend.
//!
//! This crate is framework-free: the document status state machine,
//! media-type classification, webhook action vocabulary, and the
//! on-disk document workspace. HTTP and persistence live in the
//! `nolej-api` and `nolej-db` crates.

pub mod error;
pub mod media;
pub mod status;
pub mod types;
pub mod workspace;

pub use error::CoreError;
pub use status::{DocumentStatus, WebhookAction};
