//! API 集成测试 - 完整的 HTTP 流程
//!
//! 使用 ServerState::initialize_for_tests 完整初始化 (独立临时目录)，
//! 通过 tower::oneshot 直接驱动路由，不占用真实端口。

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use storefront_server::api::build_app;
use storefront_server::db::models::UserCreate;
use storefront_server::db::repository::UserRepository;
use storefront_server::{Config, ServerState};

async fn setup() -> (tempfile::TempDir, ServerState, Router) {
    let tmp = tempfile::tempdir().expect("failed to create temp dir");
    let state = ServerState::initialize_for_tests(tmp.path()).await;
    let app = build_app(state.clone());
    (tmp, state, app)
}

/// 发送 JSON 请求，返回 (状态码, 响应体)
async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("failed to build request");

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("request should not fail at the transport level");

    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("failed to read body")
        .to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

/// 通过 API 注册用户，返回令牌
async fn register(app: &Router, name: &str, email: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/users",
        None,
        Some(json!({ "name": name, "email": email, "password": "123456" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["token"].as_str().expect("token in response").to_string()
}

/// 直接在用户表创建管理员，再通过 API 登录
async fn admin_token(state: &ServerState, app: &Router) -> String {
    let repo = UserRepository::new(state.get_db());
    repo.create(UserCreate {
        name: "Admin".to_string(),
        email: "admin@example.com".to_string(),
        password: "123456".to_string(),
        is_admin: true,
    })
    .await
    .expect("failed to seed admin");

    let (status, body) = send(
        app,
        "POST",
        "/api/users/login",
        None,
        Some(json!({ "email": "admin@example.com", "password": "123456" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().expect("token in response").to_string()
}

fn sample_order() -> Value {
    json!({
        "order_items": [{
            "product": "product:widget",
            "name": "Widget",
            "qty": 2,
            "image": "/images/widget.jpg",
            "price": 9.99
        }],
        "shipping_address": {
            "address": "1 Main St",
            "city": "Springfield",
            "postal_code": "12345",
            "country": "US"
        },
        "payment_method": "PayPal",
        "items_price": 19.98,
        "tax_price": 2.0,
        "shipping_price": 5.0,
        "total_price": 26.98
    })
}

#[tokio::test]
async fn health_is_public() {
    let (_tmp, _state, app) = setup().await;

    let (status, body) = send(&app, "GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn register_then_login_round_trip() {
    let (_tmp, _state, app) = setup().await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/users",
        None,
        Some(json!({ "name": "John", "email": "john@example.com", "password": "123456" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "John");
    assert_eq!(body["is_admin"], false);
    assert!(body["token"].is_string());
    assert!(body.get("hash_pass").is_none());

    let (status, body) = send(
        &app,
        "POST",
        "/api/users/login",
        None,
        Some(json!({ "email": "john@example.com", "password": "123456" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "john@example.com");

    // 密码错误和未注册邮箱返回同一错误
    let (status, body) = send(
        &app,
        "POST",
        "/api/users/login",
        None,
        Some(json!({ "email": "john@example.com", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid email or password");

    let (status, _) = send(
        &app,
        "POST",
        "/api/users/login",
        None,
        Some(json!({ "email": "ghost@example.com", "password": "123456" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn duplicate_registration_is_rejected() {
    let (_tmp, _state, app) = setup().await;

    register(&app, "John", "john@example.com").await;
    let (status, body) = send(
        &app,
        "POST",
        "/api/users",
        None,
        Some(json!({ "name": "Johnny", "email": "john@example.com", "password": "123456" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "User already exists");
}

#[tokio::test]
async fn protected_routes_require_token() {
    let (_tmp, _state, app) = setup().await;

    // 商品目录公开
    let (status, _) = send(&app, "GET", "/api/products", None, None).await;
    assert_eq!(status, StatusCode::OK);

    // 订单接口需要认证
    let (status, body) = send(&app, "GET", "/api/orders/myorders", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Not authorized, no token");

    // 垃圾令牌被拒绝
    let (status, _) = send(
        &app,
        "GET",
        "/api/orders/myorders",
        Some("not-a-token"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_routes_reject_regular_users() {
    let (_tmp, _state, app) = setup().await;

    let token = register(&app, "John", "john@example.com").await;

    let (status, body) = send(&app, "POST", "/api/products", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Not authorized as an admin");

    let (status, _) = send(&app, "GET", "/api/users", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_manages_product_catalog() {
    let (_tmp, state, app) = setup().await;
    let admin = admin_token(&state, &app).await;

    // 创建占位商品
    let (status, created) = send(&app, "POST", "/api/products", Some(&admin), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["name"], "Sample name");
    let id = created["id"].as_str().expect("product id").to_string();

    // 填充真实字段
    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/api/products/{id}"),
        Some(&admin),
        Some(json!({ "name": "Smartphone X", "price": 599.99, "count_in_stock": 10 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Smartphone X");

    // 关键字搜索大小写不敏感
    let (status, page) = send(&app, "GET", "/api/products?keyword=PHONE", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["products"].as_array().map(Vec::len), Some(1));
    assert_eq!(page["page"], 1);

    // 删除后 404
    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/products/{id}"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "GET", &format!("/api/products/{id}"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn review_rating_is_validated_and_deduplicated() {
    let (_tmp, state, app) = setup().await;
    let admin = admin_token(&state, &app).await;
    let user = register(&app, "John", "john@example.com").await;

    let (_, created) = send(&app, "POST", "/api/products", Some(&admin), None).await;
    let id = created["id"].as_str().expect("product id").to_string();
    let review_uri = format!("/api/products/{id}/reviews");

    // 评分超出范围
    let (status, _) = send(
        &app,
        "POST",
        &review_uri,
        Some(&user),
        Some(json!({ "rating": 6, "comment": "too good" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // 正常评论
    let (status, _) = send(
        &app,
        "POST",
        &review_uri,
        Some(&user),
        Some(json!({ "rating": 4, "comment": "works" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // 同一用户重复评论被拒绝
    let (status, body) = send(
        &app,
        "POST",
        &review_uri,
        Some(&user),
        Some(json!({ "rating": 5, "comment": "again" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Product already reviewed");

    let (_, product) = send(&app, "GET", &format!("/api/products/{id}"), None, None).await;
    assert_eq!(product["num_reviews"], 1);
    assert_eq!(product["rating"], 4.0);
}

#[tokio::test]
async fn order_lifecycle_created_paid_delivered() {
    let (_tmp, state, app) = setup().await;
    let admin = admin_token(&state, &app).await;
    let user = register(&app, "John", "john@example.com").await;

    // 空订单被拒绝
    let mut empty = sample_order();
    empty["order_items"] = json!([]);
    let (status, body) = send(&app, "POST", "/api/orders", Some(&user), Some(empty)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "No order items");

    // 创建订单
    let (status, order) = send(&app, "POST", "/api/orders", Some(&user), Some(sample_order())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(order["is_paid"], false);
    assert_eq!(order["is_delivered"], false);
    let id = order["id"].as_str().expect("order id").to_string();

    // 支付
    let (status, paid) = send(
        &app,
        "PUT",
        &format!("/api/orders/{id}/pay"),
        Some(&user),
        Some(json!({
            "id": "PAYID-123",
            "status": "COMPLETED",
            "update_time": "2024-01-01T00:00:00Z",
            "email_address": "john@example.com"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(paid["is_paid"], true);
    assert_eq!(paid["payment_result"]["id"], "PAYID-123");
    assert!(paid["paid_at"].is_string());

    // 发货为管理员操作
    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/orders/{id}/deliver"),
        Some(&user),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, delivered) = send(
        &app,
        "PUT",
        &format!("/api/orders/{id}/deliver"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(delivered["is_delivered"], true);

    // 我的订单
    let (status, mine) = send(&app, "GET", "/api/orders/myorders", Some(&user), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn order_detail_is_owner_or_admin_only() {
    let (_tmp, state, app) = setup().await;
    let admin = admin_token(&state, &app).await;
    let owner = register(&app, "John", "john@example.com").await;
    let other = register(&app, "Jane", "jane@example.com").await;

    let (_, order) = send(&app, "POST", "/api/orders", Some(&owner), Some(sample_order())).await;
    let id = order["id"].as_str().expect("order id").to_string();
    let uri = format!("/api/orders/{id}");

    // 所有者可见，下单人名称/邮箱已解析
    let (status, detail) = send(&app, "GET", &uri, Some(&owner), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["user"]["name"], "John");
    assert_eq!(detail["user"]["email"], "john@example.com");

    // 其他用户不可见
    let (status, _) = send(&app, "GET", &uri, Some(&other), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // 管理员可见所有订单，列表解析下单人名称
    let (status, _) = send(&app, "GET", &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, all) = send(&app, "GET", "/api/orders", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all[0]["user"]["name"], "John");

    // 普通用户不能列出所有订单
    let (status, _) = send(&app, "GET", "/api/orders", Some(&owner), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn deleted_account_token_is_rejected() {
    let (_tmp, state, app) = setup().await;
    let admin = admin_token(&state, &app).await;
    let user = register(&app, "John", "john@example.com").await;

    let (_, profile) = send(&app, "GET", "/api/users/profile", Some(&user), None).await;
    let id = profile["id"].as_str().expect("user id").to_string();

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/users/{id}"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // 账号删除后，旧令牌失效
    let (status, _) = send(&app, "GET", "/api/users/profile", Some(&user), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn profile_update_re_signs_token() {
    let (_tmp, _state, app) = setup().await;
    let token = register(&app, "John", "john@example.com").await;

    let (status, updated) = send(
        &app,
        "PUT",
        "/api/users/profile",
        Some(&token),
        Some(json!({ "name": "Johnny" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Johnny");
    let new_token = updated["token"].as_str().expect("re-signed token");

    let (status, profile) = send(&app, "GET", "/api/users/profile", Some(new_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["name"], "Johnny");
}

#[tokio::test]
async fn unknown_config_falls_back_to_defaults() {
    // Config 默认值与覆盖行为
    let config = Config::with_overrides("/tmp/storefront-test", 8080);
    assert_eq!(config.http_port, 8080);
    assert!(config.database_dir().ends_with("database"));
    assert!(config.log_dir().ends_with("logs"));
}
