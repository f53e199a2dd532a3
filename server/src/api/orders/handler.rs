//! Order API Handlers
//!
//! 订单生命周期: Created → Paid → Delivered

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::{Value, json};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Order, OrderCreate, PaymentResult};
use crate::db::repository::{OrderRepository, UserRepository, parse_record_id};
use crate::utils::{AppError, AppResult};

/// 序列化订单并把 `user` 字段展开为 {id, name[, email]}
///
/// 管理列表和详情视图需要下单人的名称；订单表只存引用，
/// 这里按需解析 (账号已删除时字段为 null)。
async fn order_with_owner(
    state: &ServerState,
    order: &Order,
    include_email: bool,
) -> AppResult<Value> {
    let repo = UserRepository::new(state.get_db());
    let owner = repo.find_by_id(&order.user.to_string()).await?;

    let mut value =
        serde_json::to_value(order).map_err(|e| AppError::internal(e.to_string()))?;
    value["user"] = match owner {
        Some(user) if include_email => json!({
            "id": order.user.to_string(),
            "name": user.name,
            "email": user.email,
        }),
        Some(user) => json!({
            "id": order.user.to_string(),
            "name": user.name,
        }),
        None => json!({ "id": order.user.to_string(), "name": null }),
    };
    Ok(value)
}

/// Create a new order for the current user
pub async fn create(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<OrderCreate>,
) -> AppResult<(StatusCode, Json<Order>)> {
    let repo = OrderRepository::new(state.get_db());
    let user = parse_record_id("user", &current.id);
    let order = repo.create(user, payload).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// List all orders with owner names resolved (admin)
pub async fn list_all(State(state): State<ServerState>) -> AppResult<Json<Vec<Value>>> {
    let repo = OrderRepository::new(state.get_db());
    let orders = repo.find_all().await?;

    let mut result = Vec::with_capacity(orders.len());
    for order in &orders {
        result.push(order_with_owner(&state, order, false).await?);
    }
    Ok(Json(result))
}

/// List the current user's orders
pub async fn my_orders(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
) -> AppResult<Json<Vec<Order>>> {
    let repo = OrderRepository::new(state.get_db());
    let user = parse_record_id("user", &current.id);
    let orders = repo.find_by_user(&user).await?;
    Ok(Json(orders))
}

/// Get order by id with owner name/email resolved
///
/// 仅订单所有者或管理员可见。
pub async fn get_by_id(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<Value>> {
    let repo = OrderRepository::new(state.get_db());
    let order = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found("Order not found"))?;

    if !current.is_admin() && order.user.to_string() != current.id {
        return Err(AppError::forbidden("Not authorized to view this order"));
    }

    Ok(Json(order_with_owner(&state, &order, true).await?))
}

/// Mark an order as paid, storing the gateway's payment result
pub async fn pay(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<PaymentResult>,
) -> AppResult<Json<Order>> {
    let repo = OrderRepository::new(state.get_db());
    let order = repo.mark_paid(&id, payload).await?;
    Ok(Json(order))
}

/// Mark an order as delivered (admin)
pub async fn deliver(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    let repo = OrderRepository::new(state.get_db());
    let order = repo.mark_delivered(&id).await?;
    Ok(Json(order))
}
