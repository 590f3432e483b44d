use axum::{
    extract::{rejection::JsonRejection, FromRef, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{Credentials, LoginRequest, RegisterRequest, TokenResponse},
        jwt::JwtKeys,
        password::{hash_password, verify_password},
        repo::CreateUserError,
        repo_types::NewUser,
    },
    error::ApiError,
    state::AppState,
};

const MISSING_FIELDS: &str = "Dados insuficientes";
const EMAIL_TAKEN: &str = "E-mail já registrado";
const INVALID_CREDENTIALS: &str = "Credenciais inválidas";

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/registrar", post(register))
        .route("/login", post(login))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TokenResponse>), ApiError> {
    let Json(payload) = payload.map_err(|e| {
        warn!(error = %e, "unreadable registration body");
        ApiError::bad_request()
    })?;

    let name = payload
        .nome
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());
    let Some(creds) = Credentials::from_fields(payload.email, payload.senha) else {
        warn!("insufficient registration data");
        return Err(ApiError::InvalidInput(MISSING_FIELDS.into()));
    };

    if state.users.find_by_email(&creds.email).await?.is_some() {
        warn!(email = %creds.email, "email already registered");
        return Err(ApiError::Conflict(EMAIL_TAKEN.into()));
    }

    let hash = hash_password(&creds.password)?;

    let new_user = NewUser {
        name: name.as_deref(),
        email: &creds.email,
        password_hash: &hash,
    };
    let user = match state.users.create(new_user).await {
        Ok(u) => u,
        Err(CreateUserError::EmailTaken) => {
            warn!(email = %creds.email, "email registered concurrently");
            return Err(ApiError::Conflict(EMAIL_TAKEN.into()));
        }
        Err(e) => return Err(ApiError::internal(e)),
    };

    let jwt = JwtKeys::from_ref(&state).sign(user.id)?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((StatusCode::CREATED, Json(TokenResponse { jwt })))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Json(payload) = payload.map_err(|e| {
        warn!(error = %e, "unreadable login body");
        ApiError::bad_request()
    })?;

    let Some(creds) = Credentials::from_fields(payload.email, payload.senha) else {
        warn!("insufficient login data");
        return Err(ApiError::InvalidInput(MISSING_FIELDS.into()));
    };

    let Some(user) = state.users.find_by_email(&creds.email).await? else {
        warn!(email = %creds.email, "login unknown email");
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.into()));
    };

    if !verify_password(&creds.password, &user.password_hash)? {
        warn!(email = %creds.email, user_id = %user.id, "login invalid password");
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.into()));
    }

    let jwt = JwtKeys::from_ref(&state).sign(user.id)?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Json(TokenResponse { jwt }))
}
