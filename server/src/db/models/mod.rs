//! Database Models
//!
//! Typed records for the SurrealDB tables (`user`, `product`, `order`)
//! plus the create/update payloads the API accepts.

pub mod order;
pub mod product;
pub mod serde_helpers;
pub mod user;

pub use order::{Order, OrderCreate, OrderId, OrderItem, PaymentResult, ShippingAddress};
pub use product::{Product, ProductId, ProductPage, ProductUpdate, Review};
pub use user::{User, UserCreate, UserId, UserUpdate};
