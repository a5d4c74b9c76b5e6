//! Client for the Nolej content-generation REST API.
//!
//! [`NolejApi`] is the seam the rest of the backend programs against;
//! [`HttpNolejClient`] is the reqwest-backed production implementation.
//! Tests substitute their own `NolejApi` stub instead of standing up a
//! fake HTTP server.

pub mod api;
pub mod client;

pub use api::{
    AnalysisStart, CreateDocumentRequest, PackageDescriptor, TranscriptionResult,
};
pub use client::{ClientError, HttpNolejClient, NolejApi};
