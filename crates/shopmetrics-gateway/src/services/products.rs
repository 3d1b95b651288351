//! Product endpoints.
//!
//! Reads go cache first, then the store; writes go to the store and
//! invalidate the cached row. Inventory and price gauges follow every write.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use shopmetrics_core::events::product::{self, SearchType};

use crate::app_state::AppState;
use crate::error::{ApiError, ApiResult};
use crate::store::{Product, ProductFilter};

const MAX_PAGE: usize = 100;

fn not_found(id: &str) -> ApiError {
    ApiError::NotFound(format!("product {id} not found"))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Product>> {
    let product = match state.cache().get(&id).await {
        Some(p) => p,
        None => {
            let p = state.store().get(&id).await?.ok_or_else(|| not_found(&id))?;
            state.cache().set(p.clone()).await;
            p
        }
    };

    product::product_viewed(state.registry(), &product.id, &product.name, &product.category);
    Ok(Json(product))
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub category: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    20
}

pub async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Value>> {
    if params.limit == 0 || params.limit > MAX_PAGE {
        return Err(ApiError::BadRequest(format!(
            "limit must be between 1 and {MAX_PAGE}"
        )));
    }
    let filter = ProductFilter {
        category: params.category,
        ..Default::default()
    };
    let (products, total) = state
        .store()
        .list(&filter, params.limit, params.offset)
        .await?;

    Ok(Json(json!({
        "products": products,
        "total": total,
        "limit": params.limit,
        "offset": params.offset,
    })))
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub category: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

impl SearchRequest {
    fn search_type(&self) -> SearchType {
        if self.category.is_some() {
            SearchType::Category
        } else if self.min_price.is_some() || self.max_price.is_some() {
            SearchType::Filter
        } else {
            SearchType::FullText
        }
    }
}

pub async fn search_products(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> ApiResult<Json<Value>> {
    product::searched(state.registry(), req.search_type());

    let text = req.query.trim();
    let filter = ProductFilter {
        text: (!text.is_empty()).then(|| text.to_string()),
        category: req.category,
        min_price: req.min_price,
        max_price: req.max_price,
    };
    let (results, total) = state.store().list(&filter, MAX_PAGE, 0).await?;

    Ok(Json(json!({ "results": results, "total": total })))
}

#[derive(Debug, Deserialize)]
pub struct CartItem {
    pub product_id: String,
    pub quantity: i64,
}

pub async fn add_to_cart(
    State(state): State<AppState>,
    Json(item): Json<CartItem>,
) -> ApiResult<Json<Value>> {
    if item.quantity <= 0 {
        return Err(ApiError::BadRequest("quantity must be positive".into()));
    }
    let p = state
        .store()
        .get(&item.product_id)
        .await?
        .ok_or_else(|| not_found(&item.product_id))?;
    if item.quantity > p.inventory {
        return Err(ApiError::BadRequest(format!(
            "only {} units of {} in stock",
            p.inventory, p.id
        )));
    }

    product::added_to_cart(state.registry(), &p.id, &p.name);
    Ok(Json(json!({
        "message": "Product added to cart",
        "product_id": p.id,
        "quantity": item.quantity,
    })))
}

pub async fn create_product(
    State(state): State<AppState>,
    Json(p): Json<Product>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    if p.id.trim().is_empty() || p.name.trim().is_empty() {
        return Err(ApiError::BadRequest("id and name are required".into()));
    }
    if !p.price.is_finite() || p.price < 0.0 {
        return Err(ApiError::BadRequest("price must be a non-negative number".into()));
    }
    if p.inventory < 0 {
        return Err(ApiError::BadRequest("inventory must not be negative".into()));
    }

    state.store().insert(p.clone()).await?;
    let reg = state.registry();
    product::inventory_updated(reg, &p.id, &p.name, p.inventory);
    product::price_updated(reg, &p.id, &p.name, p.price, product::DEFAULT_CURRENCY);

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Product created", "product": p })),
    ))
}

#[derive(Debug, Deserialize)]
pub struct InventoryParams {
    pub quantity: i64,
}

pub async fn update_inventory(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<InventoryParams>,
) -> ApiResult<Json<Value>> {
    if params.quantity < 0 {
        return Err(ApiError::BadRequest("quantity must not be negative".into()));
    }
    let p = state
        .store()
        .set_inventory(&id, params.quantity)
        .await?
        .ok_or_else(|| not_found(&id))?;
    state.cache().delete(&id).await;

    product::inventory_updated(state.registry(), &p.id, &p.name, p.inventory);
    Ok(Json(json!({
        "message": "Inventory updated",
        "product_id": p.id,
        "new_quantity": p.inventory,
    })))
}

#[derive(Debug, Deserialize)]
pub struct PriceParams {
    pub price: f64,
}

pub async fn update_price(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<PriceParams>,
) -> ApiResult<Json<Value>> {
    if !params.price.is_finite() || params.price < 0.0 {
        return Err(ApiError::BadRequest("price must be a non-negative number".into()));
    }
    let p = state
        .store()
        .set_price(&id, params.price)
        .await?
        .ok_or_else(|| not_found(&id))?;
    state.cache().delete(&id).await;

    product::price_updated(state.registry(), &p.id, &p.name, p.price, product::DEFAULT_CURRENCY);
    Ok(Json(json!({
        "message": "Price updated",
        "product_id": p.id,
        "new_price": p.price,
    })))
}
