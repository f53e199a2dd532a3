//! Order API 模块

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::require_admin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    // 用户路由：需要登录
    let user_routes = Router::new()
        .route("/", post(handler::create))
        .route("/myorders", get(handler::my_orders))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/pay", put(handler::pay));

    // 管理路由：仅管理员可用
    let admin_routes = Router::new()
        .route("/", get(handler::list_all))
        .route("/{id}/deliver", put(handler::deliver))
        .layer(middleware::from_fn(require_admin));

    user_routes.merge(admin_routes)
}
