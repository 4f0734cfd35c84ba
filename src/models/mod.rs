//! Row types read from `PostgreSQL` and the payloads assembled from them.

pub mod account;
pub mod catalog;
pub mod order;
pub mod repair;

pub use account::{AccountSummary, FavoriteProduct, Feedback, Profile, SessionUser, StockMovement, UserRecord};
pub use catalog::{Category, CategorySummary, ProductDetail, ProductRow, ProductVariant, ProductView, Review};
pub use order::{Order, OrderDetail, OrderItem};
pub use repair::{Repair, RepairDetail, RepairTracking};
