//! Typed wrappers for the rest of the Montage API
//!
//! Each submodule adds methods to [`ApiClient`](crate::http::ApiClient):
//! - `auth`: register, login, profile
//! - `projects`: project CRUD
//! - `assets`: asset listing (uploads go through [`crate::upload`])
//! - `history`: edit history entries

mod assets;
mod auth;
mod history;
mod projects;

pub use auth::{LoginRequest, LoginResponse, Member, RegisterRequest};
pub use history::{EditAction, HistoryEntry, NewHistoryEntry};
pub use projects::Project;
