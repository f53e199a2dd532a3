//! Product API Handlers

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Product, ProductPage, ProductUpdate};
use crate::db::repository::{ProductRepository, parse_record_id};
use crate::utils::{AppError, AppResult};

/// 首页推荐商品数量
const TOP_PRODUCTS: usize = 3;

#[derive(Debug, Deserialize)]
pub struct ProductListQuery {
    /// 名称关键字 (大小写不敏感的子串匹配)
    pub keyword: Option<String>,
    /// 页码 (从 1 开始)
    #[serde(rename = "pageNumber")]
    pub page_number: Option<u64>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ReviewCreate {
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i32,
    #[serde(default)]
    pub comment: String,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// List products with keyword filter and pagination
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ProductListQuery>,
) -> AppResult<Json<ProductPage>> {
    let repo = ProductRepository::new(state.get_db());
    let page = query.page_number.unwrap_or(1).max(1);
    let keyword = query.keyword.as_deref().filter(|k| !k.is_empty());

    let result = repo.find_page(keyword, page).await?;
    Ok(Json(result))
}

/// Top rated products
pub async fn top(State(state): State<ServerState>) -> AppResult<Json<Vec<Product>>> {
    let repo = ProductRepository::new(state.get_db());
    let products = repo.find_top(TOP_PRODUCTS).await?;
    Ok(Json(products))
}

/// Get product by id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Product>> {
    let repo = ProductRepository::new(state.get_db());
    let product = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found("Product not found"))?;
    Ok(Json(product))
}

/// Create a placeholder product owned by the current admin
///
/// 返回占位商品，后续通过 PUT /{id} 填充真实字段。
pub async fn create(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
) -> AppResult<(StatusCode, Json<Product>)> {
    let repo = ProductRepository::new(state.get_db());
    let owner = parse_record_id("user", &current.id);
    let product = repo.create(&owner).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Update a product
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<ProductUpdate>,
) -> AppResult<Json<Product>> {
    let repo = ProductRepository::new(state.get_db());
    let product = repo.update(&id, payload).await?;
    Ok(Json(product))
}

/// Delete a product
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let repo = ProductRepository::new(state.get_db());
    repo.delete(&id).await?;
    Ok(Json(MessageResponse {
        message: "Product removed",
    }))
}

/// Add a review to a product
///
/// 评分 1..=5，每个用户对同一商品只能评论一次。
pub async fn create_review(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<ReviewCreate>,
) -> AppResult<(StatusCode, Json<MessageResponse>)> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let repo = ProductRepository::new(state.get_db());
    let reviewer = parse_record_id("user", &current.id);
    repo.add_review(&id, &reviewer, &current.name, payload.rating, payload.comment)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Review added",
        }),
    ))
}
