//! Montage Client Library
//!
//! Client for the Montage video editor API. The main piece is the chunked
//! asset upload; the rest is a thin typed layer over the REST endpoints.
//!
//! # Modules
//!
//! - `http`: authenticated HTTP client with injected credentials and error observer
//! - `upload`: chunked upload protocol and its state-machine driver
//! - `api`: auth, projects, assets and edit history endpoints
//! - `config`: environment configuration

pub mod api;
pub mod config;
pub mod error;
pub mod http;
pub mod upload;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::Config;
pub use error::ApiError;
pub use http::ApiClient;
pub use upload::{upload, Asset, ProjectId, UploadConstraints, UploadError, UploadableFile};
