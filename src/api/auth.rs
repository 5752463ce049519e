//! Authentication endpoints

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::http::ApiClient;

/// Registered account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: u64,
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    /// JWT to send as the bearer token
    pub token: String,
    pub member: Member,
}

#[derive(Deserialize)]
struct MessageResponse {
    #[serde(default)]
    message: String,
}

impl ApiClient {
    /// POST /api/auth/register/
    ///
    /// Returns the server's confirmation message.
    pub async fn register(&self, request: &RegisterRequest) -> Result<String> {
        let response: MessageResponse = self.post_json("/api/auth/register/", request).await?;
        Ok(response.message)
    }

    /// POST /api/auth/login/
    ///
    /// The token is returned, not stored; hand it to a
    /// [`TokenStore`](crate::http::TokenStore) to authenticate later calls.
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse> {
        let response: LoginResponse = self.post_json("/api/auth/login/", request).await?;
        tracing::info!(member_id = response.member.id, email = %response.member.email, "Logged in");
        Ok(response)
    }

    /// GET /api/auth/profile/
    pub async fn profile(&self) -> Result<Member> {
        self.get("/api/auth/profile/").await
    }
}
