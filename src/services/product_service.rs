use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

use super::SortOrder;
use crate::{
    audit::log_audit,
    entity::{
        Collections, ProductPromotions, Products, Promotions,
        product_promotions,
        products::{self, Column},
    },
    error::{AppError, AppResult},
    middleware::auth::Caller,
    state::AppState,
};

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub unit_price: Decimal,
    pub inventory: i32,
    pub collection_id: i32,
    pub promotions: Option<Vec<i32>>,
}

/// Only supplied fields change; promotion ids are added to the existing
/// associations, never removed by this operation.
#[derive(Debug, Default, Clone)]
pub struct ProductChanges {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub unit_price: Option<Decimal>,
    pub inventory: Option<i32>,
    pub collection_id: Option<i32>,
    pub promotions: Option<Vec<i32>>,
}

#[derive(Debug, Default, Clone)]
pub struct ProductFilter {
    pub collection_id: Option<i32>,
    pub unit_price_gt: Option<Decimal>,
    pub unit_price_lt: Option<Decimal>,
}

#[derive(Debug, Clone, Copy)]
pub enum ProductSortBy {
    UnitPrice,
    Title,
    LastUpdate,
}

fn filter_condition(filter: &ProductFilter) -> Condition {
    let mut condition = Condition::all();
    if let Some(collection_id) = filter.collection_id {
        condition = condition.add(Column::CollectionId.eq(collection_id));
    }
    if let Some(floor) = filter.unit_price_gt {
        condition = condition.add(Column::UnitPrice.gt(floor));
    }
    if let Some(ceiling) = filter.unit_price_lt {
        condition = condition.add(Column::UnitPrice.lt(ceiling));
    }
    condition
}

pub async fn count_products(state: &AppState, filter: &ProductFilter) -> AppResult<u64> {
    let total = Products::find()
        .filter(filter_condition(filter))
        .count(&state.orm)
        .await?;
    Ok(total)
}

pub async fn list_products(
    state: &AppState,
    filter: &ProductFilter,
    sort_by: Option<ProductSortBy>,
    sort_order: Option<SortOrder>,
    offset: u64,
    limit: u64,
) -> AppResult<Vec<products::Model>> {
    let sort_col = match sort_by.unwrap_or(ProductSortBy::LastUpdate) {
        ProductSortBy::UnitPrice => Column::UnitPrice,
        ProductSortBy::Title => Column::Title,
        ProductSortBy::LastUpdate => Column::LastUpdate,
    };

    let mut finder = Products::find().filter(filter_condition(filter));
    finder = match sort_order.unwrap_or(SortOrder::Asc) {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    };

    let rows = finder
        .offset(offset)
        .limit(limit)
        .all(&state.orm)
        .await?;
    Ok(rows)
}

pub async fn get_product(state: &AppState, id: i32) -> AppResult<Option<products::Model>> {
    let product = Products::find_by_id(id).one(&state.orm).await?;
    Ok(product)
}

/// Create a product, assign its collection and attach any promotions in one
/// transaction. Any unresolvable reference rolls the whole operation back.
pub async fn create_product(
    state: &AppState,
    caller: &Caller,
    input: NewProduct,
) -> AppResult<products::Model> {
    let txn = state.orm.begin().await?;

    if Collections::find_by_id(input.collection_id)
        .one(&txn)
        .await?
        .is_none()
    {
        return Err(AppError::not_found("Collection"));
    }

    let product = products::ActiveModel {
        id: NotSet,
        title: Set(input.title),
        slug: Set(input.slug),
        description: Set(input.description),
        unit_price: Set(input.unit_price),
        inventory: Set(input.inventory),
        collection_id: Set(input.collection_id),
        last_update: NotSet,
    }
    .insert(&txn)
    .await?;

    if let Some(promotion_ids) = &input.promotions {
        attach_promotions(&txn, product.id, promotion_ids).await?;
    }

    txn.commit().await?;

    audit(state, caller, "product_create", product.id).await;
    Ok(product)
}

pub async fn edit_product(
    state: &AppState,
    caller: &Caller,
    product_id: i32,
    changes: ProductChanges,
) -> AppResult<products::Model> {
    let txn = state.orm.begin().await?;

    let existing = Products::find_by_id(product_id).one(&txn).await?;
    let existing = match existing {
        Some(p) => p,
        None => return Err(AppError::not_found("Product")),
    };

    let mut active: products::ActiveModel = existing.into();
    if let Some(title) = changes.title {
        active.title = Set(title);
    }
    if let Some(slug) = changes.slug {
        active.slug = Set(slug);
    }
    if let Some(description) = changes.description {
        active.description = Set(Some(description));
    }
    if let Some(unit_price) = changes.unit_price {
        active.unit_price = Set(unit_price);
    }
    if let Some(inventory) = changes.inventory {
        active.inventory = Set(inventory);
    }
    if let Some(collection_id) = changes.collection_id {
        if Collections::find_by_id(collection_id)
            .one(&txn)
            .await?
            .is_none()
        {
            return Err(AppError::not_found("Collection"));
        }
        active.collection_id = Set(collection_id);
    }
    active.last_update = Set(Utc::now().into());

    let product = active.update(&txn).await?;

    if let Some(promotion_ids) = &changes.promotions {
        attach_promotions(&txn, product.id, promotion_ids).await?;
    }

    txn.commit().await?;

    audit(state, caller, "product_update", product.id).await;
    Ok(product)
}

/// Clear every promotion association of a product; the promotions themselves
/// are untouched.
pub async fn delete_product_promotions(
    state: &AppState,
    caller: &Caller,
    product_id: i32,
) -> AppResult<()> {
    if Products::find_by_id(product_id)
        .one(&state.orm)
        .await?
        .is_none()
    {
        return Err(AppError::not_found("Product"));
    }

    ProductPromotions::delete_many()
        .filter(product_promotions::Column::ProductId.eq(product_id))
        .exec(&state.orm)
        .await?;

    audit(state, caller, "product_promotions_clear", product_id).await;
    Ok(())
}

pub async fn delete_product(state: &AppState, caller: &Caller, product_id: i32) -> AppResult<()> {
    let txn = state.orm.begin().await?;

    if Products::find_by_id(product_id).one(&txn).await?.is_none() {
        return Err(AppError::not_found("Product"));
    }

    // Association rows go first so no dangling links survive the delete.
    ProductPromotions::delete_many()
        .filter(product_promotions::Column::ProductId.eq(product_id))
        .exec(&txn)
        .await?;
    Products::delete_by_id(product_id).exec(&txn).await?;

    txn.commit().await?;

    audit(state, caller, "product_delete", product_id).await;
    Ok(())
}

/// Resolve and attach each promotion id; already-attached ids are skipped.
/// The first unresolvable id fails the surrounding transaction.
async fn attach_promotions<C: ConnectionTrait>(
    conn: &C,
    product_id: i32,
    promotion_ids: &[i32],
) -> AppResult<()> {
    for &promotion_id in promotion_ids {
        if Promotions::find_by_id(promotion_id).one(conn).await?.is_none() {
            return Err(AppError::NotFound(format!(
                "Promotion {promotion_id} does not exist."
            )));
        }

        let attached = ProductPromotions::find_by_id((product_id, promotion_id))
            .one(conn)
            .await?;
        if attached.is_none() {
            product_promotions::ActiveModel {
                product_id: Set(product_id),
                promotion_id: Set(promotion_id),
            }
            .insert(conn)
            .await?;
        }
    }
    Ok(())
}

async fn audit(state: &AppState, caller: &Caller, action: &str, product_id: i32) {
    if let Err(err) = log_audit(
        &state.pool,
        Some(caller.user_id),
        action,
        Some("products"),
        Some(serde_json::json!({ "product_id": product_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }
}
