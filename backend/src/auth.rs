use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::state::AppState;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_LIMITED: &str = "limited";

const TOKEN_LIFETIME_DAYS: i64 = 7;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    role: String,
    exp: i64,
}

/// Maps a submitted password to a role, or `None` when it matches neither
/// configured password.
pub fn resolve_role(state: &AppState, password: &str) -> Option<&'static str> {
    if state.config.admin_password.as_deref() == Some(password) {
        Some(ROLE_ADMIN)
    } else if state.config.limited_password.as_deref() == Some(password) {
        Some(ROLE_LIMITED)
    } else {
        None
    }
}

pub fn issue_token(secret: &str, role: &str) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = Claims {
        role: role.to_string(),
        exp: (Utc::now() + chrono::Duration::days(TOKEN_LIFETIME_DAYS)).timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Returns the role baked into a token, or `None` for anything invalid or
/// expired.
pub fn verify_token(secret: &str, token: &str) -> Option<String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims.role)
    .ok()
}

/// Bearer guard for the protected route group. A deployment without any
/// configured password runs open, matching the original tool's dev mode.
pub async fn require_bearer(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if !state.config.auth_enabled() {
        return next.run(request).await;
    }

    let Some(token) = bearer_token(request.headers()) else {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "Missing token" })))
            .into_response();
    };

    if verify_token(&state.config.jwt_secret, &token).is_none() {
        return (StatusCode::FORBIDDEN, Json(json!({ "error": "Invalid token" }))).into_response();
    }

    next.run(request).await
}

pub fn bearer_token(headers: &axum::http::HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(ToOwned::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trips_its_role() {
        let token = issue_token("secret", ROLE_ADMIN).expect("issue");
        assert_eq!(verify_token("secret", &token).as_deref(), Some(ROLE_ADMIN));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue_token("secret", ROLE_LIMITED).expect("issue");
        assert_eq!(verify_token("other", &token), None);
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert_eq!(verify_token("secret", "not.a.jwt"), None);
    }

    #[test]
    fn expired_token_is_rejected() {
        let claims = Claims {
            role: ROLE_ADMIN.to_string(),
            exp: (Utc::now() - chrono::Duration::days(1)).timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"secret"),
        )
        .expect("encode");
        assert_eq!(verify_token("secret", &token), None);
    }
}
