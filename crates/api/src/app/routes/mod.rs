use axum::{
    routing::{delete, get, post},
    Router,
};

pub mod armor;
pub mod cart;
pub mod orders;
pub mod system;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .route("/armor", get(armor::list_armor))
        .route("/armor/:id", get(armor::get_armor))
        .route("/cart", get(cart::get_cart).put(cart::put_cart))
        .route("/cart/item", delete(cart::remove_cart_item))
        .route("/order", post(orders::place_order))
        .route("/orders", get(orders::list_orders))
}
