use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{
    app_state::AppState,
    auth::AuthUser,
    domain::models::User,
    domain::services::RegisterRequest,
    routes::ApiError,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(me))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterBody {
    email: String,
    password: String,
    name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginBody {
    email: String,
    password: String,
}

#[derive(Serialize)]
struct AuthResponse {
    user: User,
    access_token: String,
}

#[instrument(name = "POST /auth/register", skip(app_state, body), fields(email = %body.email))]
async fn register(
    State(app_state): State<AppState>,
    Json(body): Json<RegisterBody>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let (user, access_token) = app_state
        .identity
        .register(RegisterRequest {
            email: body.email,
            password: body.password,
            name: body.name,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(AuthResponse { user, access_token })))
}

#[instrument(name = "POST /auth/login", skip(app_state, body), fields(email = %body.email))]
async fn login(
    State(app_state): State<AppState>,
    Json(body): Json<LoginBody>,
) -> Result<Json<AuthResponse>, ApiError> {
    let (user, access_token) = app_state.identity.login(&body.email, &body.password).await?;

    Ok(Json(AuthResponse { user, access_token }))
}

#[instrument(name = "GET /auth/me", skip(user))]
async fn me(user: AuthUser) -> Json<User> {
    Json(user.into_user())
}
