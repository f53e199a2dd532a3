//! Order Model
//!
//! 订单生命周期: Created → Paid → Delivered
//!
//! 状态通过 `is_paid`/`is_delivered` 标志与对应时间戳表达。
//! `paid_at` 与 `payment_result` 只由支付转换一起写入；
//! `delivered_at` 只由发货转换写入。

use super::serde_helpers;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Order ID type
pub type OrderId = RecordId;

/// One product + quantity + price entry within an order
///
/// Name, image and price are snapshots taken at order creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(with = "serde_helpers::record_id")]
    pub product: RecordId,
    pub name: String,
    pub qty: u32,
    pub image: String,
    pub price: f64,
}

/// Shipping destination for an order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

/// Payment provider result, stored verbatim from the pay request
///
/// The server performs no independent verification against the provider;
/// this is a documented trust boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentResult {
    pub id: String,
    pub status: String,
    pub update_time: String,
    pub email_address: String,
}

/// Order model matching the SurrealDB `order` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<OrderId>,
    /// Owning user account
    #[serde(with = "serde_helpers::record_id")]
    pub user: RecordId,
    pub order_items: Vec<OrderItem>,
    pub shipping_address: ShippingAddress,
    pub payment_method: String,
    // 价格在创建时快照，不再重算
    pub items_price: f64,
    pub tax_price: f64,
    pub shipping_price: f64,
    pub total_price: f64,
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub is_paid: bool,
    #[serde(default)]
    pub paid_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub payment_result: Option<PaymentResult>,
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub is_delivered: bool,
    #[serde(default)]
    pub delivered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Create order payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreate {
    pub order_items: Vec<OrderItem>,
    pub shipping_address: ShippingAddress,
    pub payment_method: String,
    pub items_price: f64,
    pub tax_price: f64,
    pub shipping_price: f64,
    pub total_price: f64,
}
