pub mod mutations;

use async_graphql::connection::{Connection, Edge, OpaqueCursor, query};
use async_graphql::{Context, Object, Result};
use chrono::NaiveDate;
use uuid::Uuid;

use super::context::AuthSession;
use super::page_window;
use super::types::{
    GqlCart, GqlCollection, GqlProduct, GqlPromotion, GqlReview, OrderDirection,
    ProductOrderField,
};
use crate::middleware::auth::Capability;
use crate::services::{
    cart_service,
    collection_service::{self, CollectionFilter},
    product_service::{self, ProductFilter},
    promotion_service::{self, PromotionFilter},
    review_service::{self, ReviewFilter},
};
use crate::state::AppState;

#[derive(Default)]
pub struct StoreQuery;

#[Object]
impl StoreQuery {
    /// Collections, filterable by id and title. Open to anonymous callers.
    #[allow(clippy::too_many_arguments)]
    async fn collections(
        &self,
        ctx: &Context<'_>,
        after: Option<String>,
        before: Option<String>,
        first: Option<i32>,
        last: Option<i32>,
        id: Option<i32>,
        title: Option<String>,
        title_contains: Option<String>,
        title_starts_with: Option<String>,
    ) -> Result<Connection<OpaqueCursor<usize>, GqlCollection>> {
        let state = ctx.data_unchecked::<AppState>();
        let filter = CollectionFilter {
            id,
            title,
            title_contains,
            title_starts_with,
        };

        query(
            after,
            before,
            first,
            last,
            |after: Option<OpaqueCursor<usize>>, before, first, last| async move {
                let total = collection_service::count_collections(state, &filter).await? as usize;
                let (start, end) =
                    page_window(after.map(|c| c.0), before.map(|c| c.0), first, last, total);
                let rows = collection_service::list_collections(
                    state,
                    &filter,
                    start as u64,
                    (end - start) as u64,
                )
                .await?;

                let mut connection = Connection::new(start > 0, end < total);
                connection.edges.extend(
                    rows.into_iter().enumerate().map(|(idx, row)| {
                        Edge::new(OpaqueCursor(start + idx), GqlCollection::from(row))
                    }),
                );
                Ok::<_, async_graphql::Error>(connection)
            },
        )
        .await
    }

    /// Products, filterable by collection and unit price bounds, orderable by
    /// price, title or last update. Open to anonymous callers.
    #[allow(clippy::too_many_arguments)]
    async fn all_products(
        &self,
        ctx: &Context<'_>,
        after: Option<String>,
        before: Option<String>,
        first: Option<i32>,
        last: Option<i32>,
        collection_id: Option<i32>,
        unit_price_gt: Option<rust_decimal::Decimal>,
        unit_price_lt: Option<rust_decimal::Decimal>,
        order_by: Option<ProductOrderField>,
        order_direction: Option<OrderDirection>,
    ) -> Result<Connection<OpaqueCursor<usize>, GqlProduct>> {
        let state = ctx.data_unchecked::<AppState>();
        let filter = ProductFilter {
            collection_id,
            unit_price_gt,
            unit_price_lt,
        };

        query(
            after,
            before,
            first,
            last,
            |after: Option<OpaqueCursor<usize>>, before, first, last| async move {
                let total = product_service::count_products(state, &filter).await? as usize;
                let (start, end) =
                    page_window(after.map(|c| c.0), before.map(|c| c.0), first, last, total);
                let rows = product_service::list_products(
                    state,
                    &filter,
                    order_by.map(ProductOrderField::to_sort),
                    order_direction.map(OrderDirection::to_sort),
                    start as u64,
                    (end - start) as u64,
                )
                .await?;

                let mut connection = Connection::new(start > 0, end < total);
                connection.edges.extend(
                    rows.into_iter()
                        .enumerate()
                        .map(|(idx, row)| Edge::new(OpaqueCursor(start + idx), GqlProduct::from(row))),
                );
                Ok::<_, async_graphql::Error>(connection)
            },
        )
        .await
    }

    /// A single product, or null when the id does not resolve.
    async fn product(&self, ctx: &Context<'_>, product_id: i32) -> Result<Option<GqlProduct>> {
        let state = ctx.data_unchecked::<AppState>();
        let product = product_service::get_product(state, product_id).await?;
        Ok(product.map(GqlProduct::from))
    }

    /// Promotions, filterable by description substring and ordered by
    /// discount. Staff only.
    #[allow(clippy::too_many_arguments)]
    async fn all_promotions(
        &self,
        ctx: &Context<'_>,
        after: Option<String>,
        before: Option<String>,
        first: Option<i32>,
        last: Option<i32>,
        description_contains: Option<String>,
        order_direction: Option<OrderDirection>,
    ) -> Result<Connection<OpaqueCursor<usize>, GqlPromotion>> {
        let session = ctx.data_unchecked::<AuthSession>();
        session.require(Capability::Staff)?;

        let state = ctx.data_unchecked::<AppState>();
        let filter = PromotionFilter {
            description_contains,
        };

        query(
            after,
            before,
            first,
            last,
            |after: Option<OpaqueCursor<usize>>, before, first, last| async move {
                let total = promotion_service::count_promotions(state, &filter).await? as usize;
                let (start, end) =
                    page_window(after.map(|c| c.0), before.map(|c| c.0), first, last, total);
                let rows = promotion_service::list_promotions(
                    state,
                    &filter,
                    order_direction.map(OrderDirection::to_sort),
                    start as u64,
                    (end - start) as u64,
                )
                .await?;

                let mut connection = Connection::new(start > 0, end < total);
                connection.edges.extend(
                    rows.into_iter().enumerate().map(|(idx, row)| {
                        Edge::new(OpaqueCursor(start + idx), GqlPromotion::from(row))
                    }),
                );
                Ok::<_, async_graphql::Error>(connection)
            },
        )
        .await
    }

    /// A single promotion, or null when the id does not resolve. Staff only.
    async fn promotion(
        &self,
        ctx: &Context<'_>,
        promotion_id: i32,
    ) -> Result<Option<GqlPromotion>> {
        let session = ctx.data_unchecked::<AuthSession>();
        session.require(Capability::Staff)?;

        let state = ctx.data_unchecked::<AppState>();
        let promotion = promotion_service::get_promotion(state, promotion_id).await?;
        Ok(promotion.map(GqlPromotion::from))
    }

    /// Reviews of one product, ordered by date. Open to anonymous callers.
    #[allow(clippy::too_many_arguments)]
    async fn reviews_of_product(
        &self,
        ctx: &Context<'_>,
        product_id: i32,
        after: Option<String>,
        before: Option<String>,
        first: Option<i32>,
        last: Option<i32>,
        date_gt: Option<NaiveDate>,
        date_lt: Option<NaiveDate>,
        order_direction: Option<OrderDirection>,
    ) -> Result<Connection<OpaqueCursor<usize>, GqlReview>> {
        let state = ctx.data_unchecked::<AppState>();
        let filter = ReviewFilter { date_gt, date_lt };

        query(
            after,
            before,
            first,
            last,
            |after: Option<OpaqueCursor<usize>>, before, first, last| async move {
                let total =
                    review_service::count_reviews(state, product_id, &filter).await? as usize;
                let (start, end) =
                    page_window(after.map(|c| c.0), before.map(|c| c.0), first, last, total);
                let rows = review_service::list_reviews(
                    state,
                    product_id,
                    &filter,
                    order_direction.map(OrderDirection::to_sort),
                    start as u64,
                    (end - start) as u64,
                )
                .await?;

                let mut connection = Connection::new(start > 0, end < total);
                connection.edges.extend(
                    rows.into_iter()
                        .enumerate()
                        .map(|(idx, row)| Edge::new(OpaqueCursor(start + idx), GqlReview::from(row))),
                );
                Ok::<_, async_graphql::Error>(connection)
            },
        )
        .await
    }

    /// A single review, or null when the id does not resolve.
    async fn review(&self, ctx: &Context<'_>, review_id: i32) -> Result<Option<GqlReview>> {
        let state = ctx.data_unchecked::<AppState>();
        let review = review_service::get_review(state, review_id).await?;
        Ok(review.map(GqlReview::from))
    }

    /// A cart by id. Requires an authenticated caller.
    async fn cart(&self, ctx: &Context<'_>, cart_id: Uuid) -> Result<Option<GqlCart>> {
        let session = ctx.data_unchecked::<AuthSession>();
        session.require(Capability::Authenticated)?;

        let state = ctx.data_unchecked::<AppState>();
        let cart = cart_service::get_cart(state, cart_id).await?;
        Ok(cart.map(GqlCart::from))
    }
}
