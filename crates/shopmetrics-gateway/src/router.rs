//! Axum router wiring.
//!
//! Business routes each get a [`track_http`] route layer carrying the
//! endpoint name; ops routes are not measured.

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;
use crate::ops;
use crate::services::{products, users};
use crate::track::{track_http, Tracked};

pub fn build_router(state: AppState) -> Router {
    let registry = state.shared_registry();
    let metrics_path = state.cfg().metrics.path.clone();
    let track = |endpoint: &'static str| {
        middleware::from_fn_with_state(Tracked::new(registry.clone(), endpoint), track_http)
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(ops::health))
        .route("/ready", get(ops::ready))
        .route(&metrics_path, get(ops::metrics))
        .route(
            "/products",
            get(products::list_products)
                .route_layer(track("list_products"))
                .merge(post(products::create_product).route_layer(track("create_product"))),
        )
        .route(
            "/products/:id",
            get(products::get_product).route_layer(track("get_product")),
        )
        .route(
            "/products/search",
            post(products::search_products).route_layer(track("search_products")),
        )
        .route(
            "/products/:id/inventory",
            put(products::update_inventory).route_layer(track("update_inventory")),
        )
        .route(
            "/products/:id/price",
            put(products::update_price).route_layer(track("update_price")),
        )
        .route(
            "/cart/add",
            post(products::add_to_cart).route_layer(track("add_to_cart")),
        )
        .route(
            "/users/register",
            post(users::register).route_layer(track("register_user")),
        )
        .route("/auth/login", post(users::login).route_layer(track("login")))
        .route("/auth/logout", post(users::logout).route_layer(track("logout")))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
