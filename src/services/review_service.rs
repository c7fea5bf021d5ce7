use chrono::NaiveDate;
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};

use super::SortOrder;
use crate::{
    entity::{
        Reviews,
        reviews::{self, Column},
    },
    error::AppResult,
    state::AppState,
};

#[derive(Debug, Default, Clone)]
pub struct ReviewFilter {
    pub date_gt: Option<NaiveDate>,
    pub date_lt: Option<NaiveDate>,
}

fn filter_condition(product_id: i32, filter: &ReviewFilter) -> Condition {
    let mut condition = Condition::all().add(Column::ProductId.eq(product_id));
    if let Some(after) = filter.date_gt {
        condition = condition.add(Column::Date.gt(after));
    }
    if let Some(before) = filter.date_lt {
        condition = condition.add(Column::Date.lt(before));
    }
    condition
}

pub async fn count_reviews(
    state: &AppState,
    product_id: i32,
    filter: &ReviewFilter,
) -> AppResult<u64> {
    let total = Reviews::find()
        .filter(filter_condition(product_id, filter))
        .count(&state.orm)
        .await?;
    Ok(total)
}

pub async fn list_reviews(
    state: &AppState,
    product_id: i32,
    filter: &ReviewFilter,
    sort_order: Option<SortOrder>,
    offset: u64,
    limit: u64,
) -> AppResult<Vec<reviews::Model>> {
    let mut finder = Reviews::find().filter(filter_condition(product_id, filter));
    finder = match sort_order.unwrap_or(SortOrder::Asc) {
        SortOrder::Asc => finder.order_by_asc(Column::Date),
        SortOrder::Desc => finder.order_by_desc(Column::Date),
    };

    let rows = finder
        .offset(offset)
        .limit(limit)
        .all(&state.orm)
        .await?;
    Ok(rows)
}

pub async fn get_review(state: &AppState, id: i32) -> AppResult<Option<reviews::Model>> {
    let review = Reviews::find_by_id(id).one(&state.orm).await?;
    Ok(review)
}
