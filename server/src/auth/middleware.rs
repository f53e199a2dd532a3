//! 认证中间件
//!
//! 为 JWT 认证和授权提供 Axum 中间件

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::auth::{CurrentUser, JwtService};
use crate::core::ServerState;
use crate::db::repository::UserRepository;
use crate::security_log;
use crate::utils::AppError;

/// 公共路由判断 — 这些请求跳过认证
///
/// - 商品目录的读取 (GET /api/products...)
/// - 注册 (POST /api/users) 与登录 (POST /api/users/login)
/// - 健康检查 (GET /api/health)
fn is_public_api_route(method: &http::Method, path: &str) -> bool {
    if *method == http::Method::GET
        && (path == "/api/products" || path.starts_with("/api/products/"))
    {
        return true;
    }
    if *method == http::Method::POST && (path == "/api/users" || path == "/api/users/login") {
        return true;
    }
    path == "/api/health"
}

/// 认证中间件 - 要求用户登录
///
/// 从 `Authorization: Bearer <token>` 头提取并验证 JWT，再把 `sub`
/// 解析为完整账号记录；成功后将 [`CurrentUser`] 注入请求扩展。
/// 任何失败都在处理函数执行之前以 401 返回。
///
/// # 错误处理
///
/// | 错误 | HTTP 状态码 |
/// |------|------------|
/// | 无 Authorization 头 | 401 Unauthorized |
/// | 令牌过期 | 401 TokenExpired |
/// | 无效令牌 | 401 InvalidToken |
/// | 账号已不存在 | 401 Unauthorized |
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = req.uri().path();

    // 允许 CORS 预检的 OPTIONS 请求 (跳过认证)
    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    // 非 API 路由跳过认证 (让它们正常返回 404)
    if !path.starts_with("/api/") {
        return Ok(next.run(req).await);
    }

    if is_public_api_route(req.method(), path) {
        return Ok(next.run(req).await);
    }

    let jwt_service = state.get_jwt_service();
    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => JwtService::extract_from_header(header)
            .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?,
        None => {
            security_log!("WARN", "auth_missing", uri = format!("{:?}", req.uri()));
            return Err(AppError::unauthorized());
        }
    };

    // 验证令牌
    let claims = match jwt_service.validate_token(token) {
        Ok(claims) => claims,
        Err(e) => {
            security_log!(
                "WARN",
                "auth_failed",
                error = format!("{}", e),
                uri = format!("{:?}", req.uri())
            );

            return match e {
                crate::auth::JwtError::ExpiredToken => Err(AppError::token_expired()),
                _ => Err(AppError::invalid_token("Invalid token")),
            };
        }
    };

    // 解析账号 — 令牌有效但账号已删除时视为认证失败
    let repo = UserRepository::new(state.get_db());
    let user = repo
        .find_by_id(&claims.sub)
        .await
        .map_err(|e| AppError::database(e.to_string()))?;

    match user {
        Some(user) => {
            req.extensions_mut().insert(CurrentUser::from_user(&user));
            Ok(next.run(req).await)
        }
        None => {
            security_log!("WARN", "auth_user_gone", sub = claims.sub.clone());
            Err(AppError::unauthorized())
        }
    }
}

/// 管理员中间件 - 要求管理员角色
///
/// 检查 `CurrentUser.is_admin`，必须在 [`require_auth`] 之后执行。
///
/// # 错误
///
/// 非管理员返回 403 Forbidden
pub async fn require_admin(req: Request, next: Next) -> Result<Response, AppError> {
    let user = req
        .extensions()
        .get::<CurrentUser>()
        .ok_or(AppError::unauthorized())?;
    if !user.is_admin() {
        security_log!(
            "WARN",
            "admin_required",
            user_id = user.id.clone(),
            name = user.name.clone()
        );
        return Err(AppError::forbidden("Not authorized as an admin"));
    }

    Ok(next.run(req).await)
}
