//! User API 模块

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::require_admin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/users", routes())
}

fn routes() -> Router<ServerState> {
    // 公共路由：注册和登录
    let public_routes = Router::new()
        .route("/", post(handler::register))
        .route("/login", post(handler::login));

    // 个人路由：需要登录
    let profile_routes = Router::new().route(
        "/profile",
        get(handler::profile).put(handler::update_profile),
    );

    // 管理路由：仅管理员可用
    let admin_routes = Router::new()
        .route("/", get(handler::list))
        .route(
            "/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
        .layer(middleware::from_fn(require_admin));

    public_routes.merge(profile_routes).merge(admin_routes)
}
