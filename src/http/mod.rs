//! HTTP Client Module
//!
//! The capability every API exchange goes through. Credentials and error
//! reporting are injected at construction:
//!
//! ```rust,ignore
//! use montage_client::http::{ApiClient, LogErrors, TokenStore};
//!
//! let tokens = TokenStore::new();
//! let client = ApiClient::builder("http://localhost:8000")
//!     .credentials(tokens.clone())
//!     .error_observer(LogErrors)
//!     .build()?;
//! ```

mod client;
mod credentials;
mod observer;

pub use client::{ApiClient, ApiClientBuilder, DEFAULT_TIMEOUT};
pub use credentials::{Anonymous, CredentialProvider, StaticToken, TokenStore};
pub use observer::{ApiErrorEvent, ErrorObserver, LogErrors};
