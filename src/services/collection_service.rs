use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};

use crate::{
    audit::log_audit,
    entity::{
        Collections, Products,
        collections::{self, Column},
        products,
    },
    error::{AppError, AppResult},
    middleware::auth::Caller,
    state::AppState,
};

#[derive(Debug, Default, Clone)]
pub struct CollectionFilter {
    pub id: Option<i32>,
    pub title: Option<String>,
    pub title_contains: Option<String>,
    pub title_starts_with: Option<String>,
}

fn filter_condition(filter: &CollectionFilter) -> Condition {
    let mut condition = Condition::all();
    if let Some(id) = filter.id {
        condition = condition.add(Column::Id.eq(id));
    }
    if let Some(title) = filter.title.as_ref().filter(|t| !t.is_empty()) {
        condition = condition.add(Column::Title.eq(title.clone()));
    }
    if let Some(fragment) = filter.title_contains.as_ref().filter(|t| !t.is_empty()) {
        condition = condition.add(Expr::col(Column::Title).ilike(format!("%{fragment}%")));
    }
    if let Some(prefix) = filter.title_starts_with.as_ref().filter(|t| !t.is_empty()) {
        condition = condition.add(Expr::col(Column::Title).ilike(format!("{prefix}%")));
    }
    condition
}

pub async fn count_collections(state: &AppState, filter: &CollectionFilter) -> AppResult<u64> {
    let total = Collections::find()
        .filter(filter_condition(filter))
        .count(&state.orm)
        .await?;
    Ok(total)
}

pub async fn list_collections(
    state: &AppState,
    filter: &CollectionFilter,
    offset: u64,
    limit: u64,
) -> AppResult<Vec<collections::Model>> {
    let rows = Collections::find()
        .filter(filter_condition(filter))
        .order_by_asc(Column::Id)
        .offset(offset)
        .limit(limit)
        .all(&state.orm)
        .await?;
    Ok(rows)
}

pub async fn get_collection(state: &AppState, id: i32) -> AppResult<Option<collections::Model>> {
    let collection = Collections::find_by_id(id).one(&state.orm).await?;
    Ok(collection)
}

pub async fn create_collection(
    state: &AppState,
    caller: &Caller,
    title: String,
    featured_product_id: Option<i32>,
) -> AppResult<collections::Model> {
    let txn = state.orm.begin().await?;

    let featured = match featured_product_id {
        Some(product_id) => {
            let product = Products::find_by_id(product_id).one(&txn).await?;
            match product {
                Some(p) => Some(p.id),
                None => return Err(AppError::not_found("Featured product")),
            }
        }
        None => None,
    };

    let collection = collections::ActiveModel {
        id: NotSet,
        title: Set(title),
        featured_product_id: Set(featured),
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    audit(state, caller, "collection_create", collection.id).await;
    Ok(collection)
}

pub async fn edit_collection(
    state: &AppState,
    caller: &Caller,
    collection_id: i32,
    title: String,
    featured_product_id: Option<i32>,
) -> AppResult<collections::Model> {
    let txn = state.orm.begin().await?;

    let existing = Collections::find_by_id(collection_id).one(&txn).await?;
    let existing = match existing {
        Some(c) => c,
        None => return Err(AppError::not_found("Collection")),
    };

    let mut active: collections::ActiveModel = existing.into();
    active.title = Set(title);
    if let Some(product_id) = featured_product_id {
        let product = Products::find_by_id(product_id).one(&txn).await?;
        match product {
            Some(p) => active.featured_product_id = Set(Some(p.id)),
            None => return Err(AppError::not_found("Product")),
        }
    }

    let collection = active.update(&txn).await?;
    txn.commit().await?;

    audit(state, caller, "collection_update", collection.id).await;
    Ok(collection)
}

/// Deletion is restricted while products still reference the collection;
/// callers must reassign or delete those products first.
pub async fn delete_collection(state: &AppState, caller: &Caller, collection_id: i32) -> AppResult<()> {
    let txn = state.orm.begin().await?;

    let existing = Collections::find_by_id(collection_id).one(&txn).await?;
    if existing.is_none() {
        return Err(AppError::not_found("Collection"));
    }

    let product_count = Products::find()
        .filter(products::Column::CollectionId.eq(collection_id))
        .count(&txn)
        .await?;
    if product_count > 0 {
        return Err(AppError::Validation(
            "Collection still has products assigned to it.".into(),
        ));
    }

    Collections::delete_by_id(collection_id).exec(&txn).await?;
    txn.commit().await?;

    audit(state, caller, "collection_delete", collection_id).await;
    Ok(())
}

async fn audit(state: &AppState, caller: &Caller, action: &str, collection_id: i32) {
    if let Err(err) = log_audit(
        &state.pool,
        Some(caller.user_id),
        action,
        Some("collections"),
        Some(serde_json::json!({ "collection_id": collection_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }
}
