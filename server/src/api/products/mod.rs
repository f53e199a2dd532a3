//! Product API 模块

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::require_admin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/products", routes())
}

fn routes() -> Router<ServerState> {
    // 读取路由：公共 (商品目录对未登录用户可见)
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/top", get(handler::top))
        .route("/{id}", get(handler::get_by_id));

    // 评论路由：需要登录 (每个用户每件商品一条)
    let review_routes = Router::new().route("/{id}/reviews", post(handler::create_review));

    // 管理路由：仅管理员可用
    let manage_routes = Router::new()
        .route("/", post(handler::create))
        .route("/{id}", put(handler::update).delete(handler::delete))
        .layer(middleware::from_fn(require_admin));

    read_routes.merge(review_routes).merge(manage_routes)
}
