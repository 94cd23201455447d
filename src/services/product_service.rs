use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use crate::{
    audit,
    dto::products::{CreateProductRequest, ProductList, UpdateProductRequest},
    entity::products::{ActiveModel, Column, Entity as Products, Model as ProductModel},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_staff},
    models::Product,
    response::{ApiResponse, Meta},
    routes::params::{ProductQuery, ProductSortBy, SortOrder},
    state::AppState,
};

/// Customers only see active products; staff see the whole catalog.
pub async fn list_products(
    state: &AppState,
    user: &AuthUser,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = query.pagination.normalize();
    let mut condition = Condition::all();

    if !user.is_staff() {
        condition = condition.add(Column::IsActive.eq(true));
    }

    if let Some(search) = query.q.as_ref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(Column::Name).ilike(pattern.clone()))
                .add(Expr::col(Column::Supplier).ilike(pattern.clone()))
                .add(Expr::col(Column::Description).ilike(pattern)),
        );
    }

    if let Some(category1_id) = query.category1_id.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(Column::Category1Id.eq(category1_id.clone()));
    }

    if let Some(category2_id) = query.category2_id.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(Column::Category2Id.eq(category2_id.clone()));
    }

    let sort_by = query.sort_by.unwrap_or(ProductSortBy::Id);
    let sort_order = query.sort_order.unwrap_or(SortOrder::Asc);
    let sort_col = match sort_by {
        ProductSortBy::Id => Column::Id,
        ProductSortBy::Name => Column::Name,
        ProductSortBy::PricePerMinOrder => Column::PricePerMinOrder,
        ProductSortBy::CreatedAt => Column::CreatedAt,
    };

    let mut finder = Products::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(product_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Products", ProductList { items }, Some(meta)))
}

pub async fn get_product(
    state: &AppState,
    user: &AuthUser,
    id: &str,
) -> AppResult<ApiResponse<Product>> {
    let product = Products::find_by_id(id.to_string())
        .one(&state.orm)
        .await?
        .filter(|p| p.is_active || user.is_staff())
        .map(product_from_entity)
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Product", product, None))
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_staff(user)?;
    validate_pricing(
        payload.price_per_unit,
        payload.order_min_quantity,
        payload.price_per_min_order,
    )?;
    if payload.id.trim().is_empty() || payload.name.trim().is_empty() {
        return Err(AppError::BadRequest("id and name are required".into()));
    }
    if Products::find_by_id(payload.id.clone())
        .one(&state.orm)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(format!(
            "Product {} already exists",
            payload.id
        )));
    }

    let product = ActiveModel {
        id: Set(payload.id),
        name: Set(payload.name),
        category1_id: Set(payload.category1_id),
        category2_id: Set(payload.category2_id),
        unit: Set(payload.unit),
        supplier: Set(payload.supplier),
        description: Set(payload.description),
        price_per_unit: Set(payload.price_per_unit),
        order_min_quantity: Set(payload.order_min_quantity),
        order_unit: Set(payload.order_unit),
        price_per_min_order: Set(payload.price_per_min_order),
        in_stock: Set(true),
        is_active: Set(true),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        state,
        Some(user),
        "product_create",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Product created",
        product_from_entity(product),
        Some(Meta::empty()),
    ))
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: &str,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_staff(user)?;
    let existing = Products::find_by_id(id.to_string())
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    validate_pricing(
        payload.price_per_unit.unwrap_or(existing.price_per_unit),
        payload
            .order_min_quantity
            .unwrap_or(existing.order_min_quantity),
        payload
            .price_per_min_order
            .unwrap_or(existing.price_per_min_order),
    )?;

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(supplier) = payload.supplier {
        active.supplier = Set(supplier);
    }
    if let Some(price) = payload.price_per_unit {
        active.price_per_unit = Set(price);
    }
    if let Some(min_quantity) = payload.order_min_quantity {
        active.order_min_quantity = Set(min_quantity);
    }
    if let Some(order_unit) = payload.order_unit {
        active.order_unit = Set(order_unit);
    }
    if let Some(price) = payload.price_per_min_order {
        active.price_per_min_order = Set(price);
    }
    if let Some(in_stock) = payload.in_stock {
        active.in_stock = Set(in_stock);
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }
    active.updated_at = Set(Utc::now().into());

    let product = active.update(&state.orm).await?;

    audit::record(
        state,
        Some(user),
        "product_update",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        product_from_entity(product),
        Some(Meta::empty()),
    ))
}

fn validate_pricing(price_per_unit: i64, min_quantity: f64, price_per_min_order: i64) -> AppResult<()> {
    if price_per_unit < 0 || price_per_min_order < 0 {
        return Err(AppError::BadRequest("prices must not be negative".into()));
    }
    if !(min_quantity.is_finite() && min_quantity > 0.0) {
        return Err(AppError::BadRequest(
            "order_min_quantity must be greater than 0".into(),
        ));
    }
    Ok(())
}

pub(crate) fn product_from_entity(model: ProductModel) -> Product {
    Product {
        id: model.id,
        name: model.name,
        category1_id: model.category1_id,
        category2_id: model.category2_id,
        unit: model.unit,
        supplier: model.supplier,
        description: model.description,
        price_per_unit: model.price_per_unit,
        order_min_quantity: model.order_min_quantity,
        order_unit: model.order_unit,
        price_per_min_order: model.price_per_min_order,
        in_stock: model.in_stock,
        is_active: model.is_active,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}
