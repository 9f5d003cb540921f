//! Authentication endpoints

use crate::auth::Registration;
use crate::core::models::{Identity, IdentityStatus};
use crate::server::routes::ApiResponse;
use crate::server::state::AppState;
use crate::utils::error::GateError;
use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};

/// Registration request body
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub status: Option<IdentityStatus>,
}

/// Login request body
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Reset request body
#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// New password submission accompanying a reset token
#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub password: String,
    pub confirm_password: String,
}

/// Identity plus its bearer token
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: Identity,
    pub token: String,
}

/// `POST /auth/register`
pub async fn register(
    state: web::Data<AppState>,
    request: web::Json<RegisterRequest>,
) -> Result<HttpResponse, GateError> {
    let request = request.into_inner();

    if request.password != request.confirm_password {
        return Err(GateError::validation("confirm_password: passwords do not match"));
    }

    let (user, token) = state
        .auth
        .register(Registration {
            first_name: request.first_name,
            last_name: request.last_name,
            email: request.email,
            password: request.password,
            role: request.role,
            status: request.status,
        })
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::success(SessionResponse { user, token })))
}

/// `POST /auth/login`
pub async fn login(
    state: web::Data<AppState>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse, GateError> {
    let (user, token) = state.auth.login(&request.email, &request.password).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(SessionResponse { user, token })))
}

/// `POST /auth/forgot_password`
pub async fn forgot_password(
    state: web::Data<AppState>,
    request: web::Json<ForgotPasswordRequest>,
) -> Result<HttpResponse, GateError> {
    state.auth.request_password_reset(&request.email).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::message("Password reset link sent to your email")))
}

/// `POST /auth/reset_password/{token}`
pub async fn reset_password(
    state: web::Data<AppState>,
    path: web::Path<String>,
    request: web::Json<ResetPasswordRequest>,
) -> Result<HttpResponse, GateError> {
    if request.password != request.confirm_password {
        return Err(GateError::validation("confirm_password: passwords do not match"));
    }

    state
        .auth
        .reset_password(&path.into_inner(), &request.password)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::message("Password reset successful")))
}
