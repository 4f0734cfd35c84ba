//! Aggregates module
pub mod product;
pub mod order;
pub mod cart;

pub use product::{CategoryDraft, CategoryInput, ProductDraft, ProductError, ProductInput, VariantDraft, VariantInput};
pub use order::{ContactDetails, OrderDraft, OrderError, OrderLine};
pub use cart::{Cart, CartChange, CartError, CartLine, ProductSnapshot, VariantSnapshot, MAX_LINE_QUANTITY};
