//! Account creation

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tandem_common::api::PasswordHash;
use tandem_common::db::UserSummary;
use tandem_common::languages::normalize_email;
use tandem_common::LanguageProfile;
use tracing::info;

use crate::db::{self, NewUser};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// POST /api/signup request body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub display_name: String,
    /// Empty or absent means the account has no password
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub natives: Vec<String>,
    #[serde(default)]
    pub targets: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub ok: bool,
    pub user: UserSummary,
}

/// POST /api/signup
///
/// Creates the user and their initial languages atomically.
/// Returns 409 if the e-mail is already registered.
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<SignupResponse>)> {
    let Json(request) = payload?;

    let email = normalize_email(&request.email);
    validate_email(&email)?;

    let display_name = request.display_name.trim().to_string();
    if display_name.is_empty() {
        return Err(ApiError::Validation("displayName is required".to_string()));
    }

    let languages = LanguageProfile::from_raw(&request.natives, &request.targets);
    languages.validate()?;

    let password = match request.password.as_deref() {
        Some(password) if !password.is_empty() => PasswordHash::generate(password),
        _ => PasswordHash::none(),
    };

    let user = db::create_user(
        &state.db,
        &NewUser {
            email,
            display_name,
            password,
            languages,
        },
    )
    .await?;

    info!("Signup: user {} ({})", user.id, user.email);
    Ok((StatusCode::CREATED, Json(SignupResponse { ok: true, user })))
}

/// Minimal shape check on an already normalized e-mail
pub(crate) fn validate_email(email: &str) -> ApiResult<()> {
    if email.is_empty() {
        return Err(ApiError::Validation("email is required".to_string()));
    }

    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(ApiError::Validation(format!("Invalid email: {}", email)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("alice@example.com").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("alice").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("alice@").is_err());
        assert!(validate_email("a@b@c").is_err());
        assert!(validate_email("al ice@example.com").is_err());
    }

    #[test]
    fn test_request_defaults() {
        let request: SignupRequest =
            serde_json::from_str(r#"{"email":"a@b.c","displayName":"A"}"#).unwrap();
        assert!(request.password.is_none());
        assert!(request.natives.is_empty());
        assert!(request.targets.is_empty());
    }
}
