//! Rows shared by the database tests.

use sqlx::PgPool;
use uuid::Uuid;

use super::cart::CartRepository;
use super::catalog::CatalogRepository;
use super::orders::OrderRepository;
use super::profiles::ProfileRepository;
use crate::domain::aggregates::{
    Cart, ContactDetails, OrderDraft, ProductDraft, ProductInput, VariantDraft, VariantInput,
};
use crate::domain::pricing::ShippingPolicy;
use crate::domain::status::{PaymentMethod, Role};
use crate::models::{OrderDetail, ProductVariant, ProductView, UserRecord};

pub(crate) async fn create_test_user(pool: &PgPool, email: &str, role: Role) -> UserRecord {
    ProfileRepository::new(pool)
        .create_account(email, "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA", Some("Amira Trabelsi"), role)
        .await
        .unwrap()
}

pub(crate) async fn create_test_product(pool: &PgPool, name: &str, price: i64, stock: i32) -> ProductView {
    let input: ProductInput =
        serde_json::from_value(serde_json::json!({ "name": name, "price": price, "stock_quantity": stock })).unwrap();
    CatalogRepository::new(pool).create(&ProductDraft::validate(input).unwrap()).await.unwrap()
}

pub(crate) async fn create_test_variant(pool: &PgPool, product_id: Uuid, name: &str, stock: i32) -> ProductVariant {
    let input: VariantInput =
        serde_json::from_value(serde_json::json!({ "name": name, "stock_quantity": stock })).unwrap();
    CatalogRepository::new(pool).create_variant(product_id, &VariantDraft::validate(input).unwrap()).await.unwrap()
}

/// Add a line through the same planning path the cart routes use.
pub(crate) async fn add_to_cart(
    pool: &PgPool,
    user_id: Uuid,
    product_id: Uuid,
    variant_id: Option<Uuid>,
    quantity: i32,
) -> Cart {
    let carts = CartRepository::new(pool);
    let change = carts.load(user_id).await.unwrap().plan_add(product_id, variant_id, quantity).unwrap();
    carts.apply(user_id, &change).await.unwrap();
    carts.load(user_id).await.unwrap()
}

pub(crate) async fn stock_of(pool: &PgPool, product_id: Uuid) -> i32 {
    sqlx::query_scalar("SELECT stock_quantity FROM products WHERE id = $1")
        .bind(product_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

/// Check out a single line for `user_id`.
pub(crate) async fn place_test_order(pool: &PgPool, user_id: Uuid, product_id: Uuid, quantity: i32) -> OrderDetail {
    let cart = add_to_cart(pool, user_id, product_id, None, quantity).await;
    let contact = ContactDetails {
        customer_name: "Amira Trabelsi".into(),
        customer_phone: "54 080 419".into(),
        shipping_address: "Rue de la Mosquée, Zaghouan".into(),
        ..Default::default()
    };
    let draft = OrderDraft::from_cart(&cart, contact, PaymentMethod::CashOnDelivery, &ShippingPolicy::default()).unwrap();
    let line_ids: Vec<Uuid> = cart.lines().iter().map(|l| l.id).collect();
    OrderRepository::new(pool).place(&draft, &line_ids).await.unwrap().order
}
