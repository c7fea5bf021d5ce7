use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};

use super::SortOrder;
use crate::{
    audit::log_audit,
    entity::{
        ProductPromotions, Promotions,
        product_promotions,
        promotions::{self, Column},
    },
    error::{AppError, AppResult},
    middleware::auth::Caller,
    state::AppState,
};

#[derive(Debug, Default, Clone)]
pub struct PromotionFilter {
    pub description_contains: Option<String>,
}

fn filter_condition(filter: &PromotionFilter) -> Condition {
    let mut condition = Condition::all();
    if let Some(fragment) = filter
        .description_contains
        .as_ref()
        .filter(|f| !f.is_empty())
    {
        condition = condition.add(Expr::col(Column::Description).ilike(format!("%{fragment}%")));
    }
    condition
}

pub async fn count_promotions(state: &AppState, filter: &PromotionFilter) -> AppResult<u64> {
    let total = Promotions::find()
        .filter(filter_condition(filter))
        .count(&state.orm)
        .await?;
    Ok(total)
}

/// Promotions are ordered by discount; default ascending.
pub async fn list_promotions(
    state: &AppState,
    filter: &PromotionFilter,
    sort_order: Option<SortOrder>,
    offset: u64,
    limit: u64,
) -> AppResult<Vec<promotions::Model>> {
    let mut finder = Promotions::find().filter(filter_condition(filter));
    finder = match sort_order.unwrap_or(SortOrder::Asc) {
        SortOrder::Asc => finder.order_by_asc(Column::Discount),
        SortOrder::Desc => finder.order_by_desc(Column::Discount),
    };

    let rows = finder
        .offset(offset)
        .limit(limit)
        .all(&state.orm)
        .await?;
    Ok(rows)
}

pub async fn get_promotion(state: &AppState, id: i32) -> AppResult<Option<promotions::Model>> {
    let promotion = Promotions::find_by_id(id).one(&state.orm).await?;
    Ok(promotion)
}

pub async fn create_promotion(
    state: &AppState,
    caller: &Caller,
    description: String,
    discount: f64,
) -> AppResult<promotions::Model> {
    let promotion = promotions::ActiveModel {
        id: NotSet,
        description: Set(description),
        discount: Set(discount),
    }
    .insert(&state.orm)
    .await?;

    audit(state, caller, "promotion_create", promotion.id).await;
    Ok(promotion)
}

pub async fn edit_promotion(
    state: &AppState,
    caller: &Caller,
    promotion_id: i32,
    description: Option<String>,
    discount: Option<f64>,
) -> AppResult<promotions::Model> {
    let existing = Promotions::find_by_id(promotion_id).one(&state.orm).await?;
    let existing = match existing {
        Some(p) => p,
        None => return Err(AppError::not_found("Promotion")),
    };

    let mut active: promotions::ActiveModel = existing.into();
    if let Some(description) = description {
        active.description = Set(description);
    }
    if let Some(discount) = discount {
        active.discount = Set(discount);
    }

    let promotion = active.update(&state.orm).await?;

    audit(state, caller, "promotion_update", promotion.id).await;
    Ok(promotion)
}

pub async fn delete_promotion(
    state: &AppState,
    caller: &Caller,
    promotion_id: i32,
) -> AppResult<()> {
    let txn = state.orm.begin().await?;

    if Promotions::find_by_id(promotion_id)
        .one(&txn)
        .await?
        .is_none()
    {
        return Err(AppError::not_found("Promotion"));
    }

    // Either side of the association may be deleted independently; drop the
    // association rows along with the promotion.
    ProductPromotions::delete_many()
        .filter(product_promotions::Column::PromotionId.eq(promotion_id))
        .exec(&txn)
        .await?;
    Promotions::delete_by_id(promotion_id).exec(&txn).await?;

    txn.commit().await?;

    audit(state, caller, "promotion_delete", promotion_id).await;
    Ok(())
}

async fn audit(state: &AppState, caller: &Caller, action: &str, promotion_id: i32) {
    if let Err(err) = log_audit(
        &state.pool,
        Some(caller.user_id),
        action,
        Some("promotions"),
        Some(serde_json::json!({ "promotion_id": promotion_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }
}
