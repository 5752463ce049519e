//! Chunked Upload Module
//!
//! Client side of the chunked asset upload protocol:
//! - Validation of the file against [`UploadConstraints`] before any request
//! - A three-phase exchange (init → chunk* → complete) behind [`UploadTransport`]
//! - A sequential state machine ([`UploadDriver`]) with best-effort progress
//!
//! Protocol Flow:
//! 1. Client posts the file name, size and MIME type; server returns an upload id
//!    and optionally the chunk size
//! 2. Client posts the chunks one at a time, indices `0, 1, 2, …`
//! 3. Client posts complete; server returns the created asset
//!
//! There is no resume and no abort exchange: a failed upload leaves its
//! session behind on the server and must be restarted from scratch.

pub mod driver;
pub mod progress;
pub mod protocol;
pub mod types;


pub use driver::{upload, validate, UploadDriver, UploadState};
pub use progress::ProgressObserver;
pub use protocol::UploadTransport;
pub use types::*;
