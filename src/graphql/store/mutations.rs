use async_graphql::{Context, Object, Result};
use rust_decimal::Decimal;

use crate::graphql::context::AuthSession;
use crate::graphql::types::{CollectionPayload, DeleteResult, ProductPayload, PromotionPayload};
use crate::middleware::auth::Capability;
use crate::services::{
    collection_service,
    product_service::{self, NewProduct, ProductChanges},
    promotion_service,
};
use crate::state::AppState;

#[derive(Default)]
pub struct StoreMutation;

#[Object]
impl StoreMutation {
    /// Create a collection, optionally featuring an existing product.
    async fn create_collection(
        &self,
        ctx: &Context<'_>,
        title: String,
        featured_product_id: Option<i32>,
    ) -> Result<CollectionPayload> {
        let session = ctx.data_unchecked::<AuthSession>();
        let caller = session.require(Capability::Staff)?;

        let state = ctx.data_unchecked::<AppState>();
        match collection_service::create_collection(state, caller, title, featured_product_id)
            .await
        {
            Ok(collection) => Ok(CollectionPayload::ok(collection.into())),
            Err(err) => match err.failure_reason() {
                Some(reason) => Ok(CollectionPayload::failure(reason)),
                None => Err(err.into()),
            },
        }
    }

    /// Update a collection's title, and its featured product when supplied.
    async fn edit_collection(
        &self,
        ctx: &Context<'_>,
        collection_id: i32,
        title: String,
        featured_product_id: Option<i32>,
    ) -> Result<CollectionPayload> {
        let session = ctx.data_unchecked::<AuthSession>();
        let caller = session.require(Capability::Staff)?;

        let state = ctx.data_unchecked::<AppState>();
        match collection_service::edit_collection(
            state,
            caller,
            collection_id,
            title,
            featured_product_id,
        )
        .await
        {
            Ok(collection) => Ok(CollectionPayload::ok(collection.into())),
            Err(err) => match err.failure_reason() {
                Some(reason) => Ok(CollectionPayload::failure(reason)),
                None => Err(err.into()),
            },
        }
    }

    /// Delete a collection. Refused while products still reference it.
    async fn delete_collection(
        &self,
        ctx: &Context<'_>,
        collection_id: i32,
    ) -> Result<DeleteResult> {
        let session = ctx.data_unchecked::<AuthSession>();
        let caller = session.require(Capability::Staff)?;

        let state = ctx.data_unchecked::<AppState>();
        match collection_service::delete_collection(state, caller, collection_id).await {
            Ok(()) => Ok(DeleteResult::ok()),
            Err(err) => match err.failure_reason() {
                Some(reason) => Ok(DeleteResult::failure(reason)),
                None => Err(err.into()),
            },
        }
    }

    /// Create a product inside a collection and attach any listed promotions.
    /// The whole operation commits or rolls back as one unit.
    #[allow(clippy::too_many_arguments)]
    async fn create_product(
        &self,
        ctx: &Context<'_>,
        title: String,
        slug: String,
        description: Option<String>,
        unit_price: Decimal,
        inventory: i32,
        collection_id: i32,
        promotions: Option<Vec<i32>>,
    ) -> Result<ProductPayload> {
        let session = ctx.data_unchecked::<AuthSession>();
        let caller = session.require(Capability::Staff)?;

        let state = ctx.data_unchecked::<AppState>();
        let input = NewProduct {
            title,
            slug,
            description,
            unit_price,
            inventory,
            collection_id,
            promotions,
        };
        match product_service::create_product(state, caller, input).await {
            Ok(product) => Ok(ProductPayload::ok(product.into())),
            Err(err) => match err.failure_reason() {
                Some(reason) => Ok(ProductPayload::failure(reason)),
                None => Err(err.into()),
            },
        }
    }

    /// Partial product update. Supplied promotion ids are added to the
    /// existing associations; use `deleteProductPromotions` to clear them.
    #[allow(clippy::too_many_arguments)]
    async fn edit_product(
        &self,
        ctx: &Context<'_>,
        product_id: i32,
        title: Option<String>,
        slug: Option<String>,
        description: Option<String>,
        unit_price: Option<Decimal>,
        inventory: Option<i32>,
        collection_id: Option<i32>,
        promotions: Option<Vec<i32>>,
    ) -> Result<ProductPayload> {
        let session = ctx.data_unchecked::<AuthSession>();
        let caller = session.require(Capability::Staff)?;

        let state = ctx.data_unchecked::<AppState>();
        let changes = ProductChanges {
            title,
            slug,
            description,
            unit_price,
            inventory,
            collection_id,
            promotions,
        };
        match product_service::edit_product(state, caller, product_id, changes).await {
            Ok(product) => Ok(ProductPayload::ok(product.into())),
            Err(err) => match err.failure_reason() {
                Some(reason) => Ok(ProductPayload::failure(reason)),
                None => Err(err.into()),
            },
        }
    }

    /// Clear every promotion association of a product.
    async fn delete_product_promotions(
        &self,
        ctx: &Context<'_>,
        product_id: i32,
    ) -> Result<DeleteResult> {
        let session = ctx.data_unchecked::<AuthSession>();
        let caller = session.require(Capability::Staff)?;

        let state = ctx.data_unchecked::<AppState>();
        match product_service::delete_product_promotions(state, caller, product_id).await {
            Ok(()) => Ok(DeleteResult::ok()),
            Err(err) => match err.failure_reason() {
                Some(reason) => Ok(DeleteResult::failure(reason)),
                None => Err(err.into()),
            },
        }
    }

    /// Delete a product along with its promotion associations.
    async fn delete_product(&self, ctx: &Context<'_>, product_id: i32) -> Result<DeleteResult> {
        let session = ctx.data_unchecked::<AuthSession>();
        let caller = session.require(Capability::Staff)?;

        let state = ctx.data_unchecked::<AppState>();
        match product_service::delete_product(state, caller, product_id).await {
            Ok(()) => Ok(DeleteResult::ok()),
            Err(err) => match err.failure_reason() {
                Some(reason) => Ok(DeleteResult::failure(reason)),
                None => Err(err.into()),
            },
        }
    }

    /// Create a promotion.
    async fn create_promotion(
        &self,
        ctx: &Context<'_>,
        description: String,
        discount: f64,
    ) -> Result<PromotionPayload> {
        let session = ctx.data_unchecked::<AuthSession>();
        let caller = session.require(Capability::Staff)?;

        let state = ctx.data_unchecked::<AppState>();
        match promotion_service::create_promotion(state, caller, description, discount).await {
            Ok(promotion) => Ok(PromotionPayload::ok(promotion.into())),
            Err(err) => match err.failure_reason() {
                Some(reason) => Ok(PromotionPayload::failure(reason)),
                None => Err(err.into()),
            },
        }
    }

    /// Partial promotion update.
    async fn edit_promotion(
        &self,
        ctx: &Context<'_>,
        promotion_id: i32,
        description: Option<String>,
        discount: Option<f64>,
    ) -> Result<PromotionPayload> {
        let session = ctx.data_unchecked::<AuthSession>();
        let caller = session.require(Capability::Staff)?;

        let state = ctx.data_unchecked::<AppState>();
        match promotion_service::edit_promotion(state, caller, promotion_id, description, discount)
            .await
        {
            Ok(promotion) => Ok(PromotionPayload::ok(promotion.into())),
            Err(err) => match err.failure_reason() {
                Some(reason) => Ok(PromotionPayload::failure(reason)),
                None => Err(err.into()),
            },
        }
    }

    /// Delete a promotion and its product associations.
    async fn delete_promotion(
        &self,
        ctx: &Context<'_>,
        promotion_id: i32,
    ) -> Result<DeleteResult> {
        let session = ctx.data_unchecked::<AuthSession>();
        let caller = session.require(Capability::Staff)?;

        let state = ctx.data_unchecked::<AppState>();
        match promotion_service::delete_promotion(state, caller, promotion_id).await {
            Ok(()) => Ok(DeleteResult::ok()),
            Err(err) => match err.failure_reason() {
                Some(reason) => Ok(DeleteResult::failure(reason)),
                None => Err(err.into()),
            },
        }
    }
}
