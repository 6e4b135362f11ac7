//! Account registration and login against the mock store.
//! Login only checks the password and echoes the user; no session is issued.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::AppState;
use crate::error::ApiError;
use crate::storage::{NewUser, User};

#[cfg(not(test))]
const HASH_COST: u32 = 10;
// Minimum cost keeps the tests fast
#[cfg(test)]
const HASH_COST: u32 = 4;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: &'static str,
    pub user: User,
}

async fn hash_password(password: String) -> Result<String, ApiError> {
    // CPU bound, so off the async workers
    tokio::task::spawn_blocking(move || bcrypt::hash(password, HASH_COST))
        .await
        .map_err(|e| ApiError::Hashing(e.to_string()))?
        .map_err(|e| ApiError::Hashing(e.to_string()))
}

async fn password_matches(password: String, hash: String) -> Result<bool, ApiError> {
    // An unparseable stored hash never matches
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash).unwrap_or(false))
        .await
        .map_err(|e| ApiError::Hashing(e.to_string()))
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let email = req.email.trim().to_string();
    if state.storage.get_user_by_email(&email).await.is_some() {
        return Err(ApiError::EmailTaken(email));
    }

    let password_hash = hash_password(req.password).await?;
    let user = state
        .storage
        .create_user(NewUser {
            email,
            password_hash,
            first_name: req.first_name,
            last_name: req.last_name,
            phone: req.phone,
        })
        .await;

    info!("Registered user {}", user.id);
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User registered",
            user,
        }),
    ))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let user = state
        .storage
        .get_user_by_email(req.email.trim())
        .await
        .ok_or(ApiError::InvalidCredentials("User not found"))?;

    if !password_matches(req.password, user.password_hash.clone()).await? {
        return Err(ApiError::InvalidCredentials("Incorrect password"));
    }

    Ok(Json(AuthResponse {
        message: "Login successful",
        user,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_round_trip() {
        let hash = hash_password("s3cret".to_string()).await.unwrap();

        assert_ne!(hash, "s3cret");
        assert!(password_matches("s3cret".to_string(), hash.clone()).await.unwrap());
        assert!(!password_matches("wrong".to_string(), hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_malformed_hash_never_matches() {
        let matched = password_matches("hashedpassword".to_string(), "hashedpassword".to_string())
            .await
            .unwrap();
        assert!(!matched);
    }
}
