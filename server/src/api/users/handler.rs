//! User API Handlers
//!
//! 注册、登录、个人资料和管理员的用户管理接口。

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{User, UserCreate, UserUpdate};
use crate::db::repository::UserRepository;
use crate::utils::{AppError, AppResult};

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// 个人资料更新 (不允许修改 is_admin)
#[derive(Debug, Deserialize, Validate)]
pub struct ProfileUpdateRequest {
    pub name: Option<String>,
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: Option<String>,
}

/// 管理员用户更新
#[derive(Debug, Deserialize)]
pub struct AdminUserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub is_admin: Option<bool>,
}

/// 认证响应 - 带新签发的令牌
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub is_admin: bool,
    pub token: String,
}

/// 用户响应 (不含密码散列)
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub is_admin: bool,
}

impl UserResponse {
    fn from_user(user: &User) -> Self {
        Self {
            id: user.id.as_ref().map(|t| t.to_string()).unwrap_or_default(),
            name: user.name.clone(),
            email: user.email.clone(),
            is_admin: user.is_admin,
        }
    }
}

fn auth_response(state: &ServerState, user: &User) -> AppResult<AuthResponse> {
    let id = user.id.as_ref().map(|t| t.to_string()).unwrap_or_default();
    let token = state
        .get_jwt_service()
        .generate_token(&id, &user.name, user.is_admin)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {}", e)))?;

    Ok(AuthResponse {
        id,
        name: user.name.clone(),
        email: user.email.clone(),
        is_admin: user.is_admin,
        token,
    })
}

/// Register a new user and sign a token
pub async fn register(
    State(state): State<ServerState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let repo = UserRepository::new(state.get_db());
    let user = repo
        .create(UserCreate {
            name: payload.name,
            email: payload.email,
            password: payload.password,
            is_admin: false,
        })
        .await?;

    let response = auth_response(&state, &user)?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Authenticate with email/password and sign a token
///
/// 未注册邮箱和密码错误返回同一错误，避免泄露账号是否存在。
pub async fn login(
    State(state): State<ServerState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let repo = UserRepository::new(state.get_db());
    let user = repo
        .find_by_email(&payload.email)
        .await?
        .ok_or_else(AppError::invalid_credentials)?;

    let valid = user
        .verify_password(&payload.password)
        .map_err(|e| AppError::internal(format!("Password verification failed: {}", e)))?;
    if !valid {
        return Err(AppError::invalid_credentials());
    }

    Ok(Json(auth_response(&state, &user)?))
}

/// Current user's profile
pub async fn profile(
    Extension(current): Extension<CurrentUser>,
) -> AppResult<Json<UserResponse>> {
    // 认证中间件刚从用户表解析过账号，直接回显
    Ok(Json(UserResponse {
        id: current.id,
        name: current.name,
        email: current.email,
        is_admin: current.is_admin,
    }))
}

/// Update current user's profile and re-sign the token
pub async fn update_profile(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<ProfileUpdateRequest>,
) -> AppResult<Json<AuthResponse>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let repo = UserRepository::new(state.get_db());
    let user = repo
        .update(
            &current.id,
            UserUpdate {
                name: payload.name,
                email: payload.email,
                password: payload.password,
                is_admin: None,
            },
        )
        .await?;

    Ok(Json(auth_response(&state, &user)?))
}

/// List all users (admin)
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<UserResponse>>> {
    let repo = UserRepository::new(state.get_db());
    let users = repo.find_all().await?;
    Ok(Json(users.iter().map(UserResponse::from_user).collect()))
}

/// Get user by id (admin)
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<UserResponse>> {
    let repo = UserRepository::new(state.get_db());
    let user = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    Ok(Json(UserResponse::from_user(&user)))
}

/// Update a user (admin) - may grant or revoke the admin role
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<AdminUserUpdate>,
) -> AppResult<Json<UserResponse>> {
    let repo = UserRepository::new(state.get_db());
    let user = repo
        .update(
            &id,
            UserUpdate {
                name: payload.name,
                email: payload.email,
                password: None,
                is_admin: payload.is_admin,
            },
        )
        .await?;
    Ok(Json(UserResponse::from_user(&user)))
}

/// Delete a user (admin)
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let repo = UserRepository::new(state.get_db());
    repo.delete(&id).await?;
    Ok(Json(serde_json::json!({ "message": "User removed" })))
}
