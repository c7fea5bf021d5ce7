use async_graphql::dataloader::DataLoader;
use async_graphql::{Context, Object, Result, SimpleObject};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::loaders::{
    CollectionByIdLoader, ProductByIdLoader, ProductsByCollectionLoader,
    PromotionsByProductLoader,
};
use crate::entity::{carts, collections, products, promotions, reviews, users};
use crate::services::{SortOrder, product_service::ProductSortBy};

// --- GraphQL enums ---

#[derive(async_graphql::Enum, Copy, Clone, Eq, PartialEq)]
pub enum ProductOrderField {
    UnitPrice,
    Title,
    LastUpdate,
}

impl ProductOrderField {
    pub fn to_sort(self) -> ProductSortBy {
        match self {
            ProductOrderField::UnitPrice => ProductSortBy::UnitPrice,
            ProductOrderField::Title => ProductSortBy::Title,
            ProductOrderField::LastUpdate => ProductSortBy::LastUpdate,
        }
    }
}

#[derive(async_graphql::Enum, Copy, Clone, Eq, PartialEq)]
pub enum OrderDirection {
    Asc,
    Desc,
}

impl OrderDirection {
    pub fn to_sort(self) -> SortOrder {
        match self {
            OrderDirection::Asc => SortOrder::Asc,
            OrderDirection::Desc => SortOrder::Desc,
        }
    }
}

// --- Object types ---

/// A user, with the password hash deliberately absent from the shape.
#[derive(SimpleObject)]
pub struct GqlUser {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
}

impl From<users::Model> for GqlUser {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            first_name: model.first_name,
            last_name: model.last_name,
            is_staff: model.is_staff,
            is_superuser: model.is_superuser,
            is_active: model.is_active,
            date_joined: model.date_joined.with_timezone(&Utc),
        }
    }
}

pub struct GqlCollection {
    row: collections::Model,
}

#[Object]
impl GqlCollection {
    async fn id(&self) -> i32 {
        self.row.id
    }

    async fn title(&self) -> &str {
        &self.row.title
    }

    async fn featured_product(&self, ctx: &Context<'_>) -> Result<Option<GqlProduct>> {
        let Some(product_id) = self.row.featured_product_id else {
            return Ok(None);
        };
        let loader = ctx.data_unchecked::<DataLoader<ProductByIdLoader>>();
        Ok(loader.load_one(product_id).await?.map(GqlProduct::from))
    }

    async fn products(&self, ctx: &Context<'_>) -> Result<Vec<GqlProduct>> {
        let loader = ctx.data_unchecked::<DataLoader<ProductsByCollectionLoader>>();
        let products = loader.load_one(self.row.id).await?.unwrap_or_default();
        Ok(products.into_iter().map(GqlProduct::from).collect())
    }
}

impl From<collections::Model> for GqlCollection {
    fn from(row: collections::Model) -> Self {
        Self { row }
    }
}

pub struct GqlProduct {
    row: products::Model,
}

#[Object]
impl GqlProduct {
    async fn id(&self) -> i32 {
        self.row.id
    }

    async fn title(&self) -> &str {
        &self.row.title
    }

    async fn slug(&self) -> &str {
        &self.row.slug
    }

    async fn description(&self) -> Option<&str> {
        self.row.description.as_deref()
    }

    async fn unit_price(&self) -> Decimal {
        self.row.unit_price
    }

    async fn inventory(&self) -> i32 {
        self.row.inventory
    }

    async fn last_update(&self) -> DateTime<Utc> {
        self.row.last_update.with_timezone(&Utc)
    }

    async fn collection(&self, ctx: &Context<'_>) -> Result<Option<GqlCollection>> {
        let loader = ctx.data_unchecked::<DataLoader<CollectionByIdLoader>>();
        Ok(loader
            .load_one(self.row.collection_id)
            .await?
            .map(GqlCollection::from))
    }

    async fn promotions(&self, ctx: &Context<'_>) -> Result<Vec<GqlPromotion>> {
        let loader = ctx.data_unchecked::<DataLoader<PromotionsByProductLoader>>();
        let promotions = loader.load_one(self.row.id).await?.unwrap_or_default();
        Ok(promotions.into_iter().map(GqlPromotion::from).collect())
    }
}

impl From<products::Model> for GqlProduct {
    fn from(row: products::Model) -> Self {
        Self { row }
    }
}

#[derive(SimpleObject)]
pub struct GqlPromotion {
    pub id: i32,
    pub description: String,
    pub discount: f64,
}

impl From<promotions::Model> for GqlPromotion {
    fn from(model: promotions::Model) -> Self {
        Self {
            id: model.id,
            description: model.description,
            discount: model.discount,
        }
    }
}

pub struct GqlReview {
    row: reviews::Model,
}

#[Object]
impl GqlReview {
    async fn id(&self) -> i32 {
        self.row.id
    }

    async fn name(&self) -> &str {
        &self.row.name
    }

    async fn description(&self) -> &str {
        &self.row.description
    }

    async fn date(&self) -> NaiveDate {
        self.row.date
    }

    async fn product(&self, ctx: &Context<'_>) -> Result<Option<GqlProduct>> {
        let loader = ctx.data_unchecked::<DataLoader<ProductByIdLoader>>();
        Ok(loader
            .load_one(self.row.product_id)
            .await?
            .map(GqlProduct::from))
    }
}

impl From<reviews::Model> for GqlReview {
    fn from(row: reviews::Model) -> Self {
        Self { row }
    }
}

#[derive(SimpleObject)]
pub struct GqlCart {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<carts::Model> for GqlCart {
    fn from(model: carts::Model) -> Self {
        Self {
            id: model.id,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

// --- Mutation payloads ---
//
// Expected domain failures land in the payload's `error` field; only
// authorization denials and infrastructure faults abort the request.

#[derive(SimpleObject)]
pub struct CollectionPayload {
    pub collection: Option<GqlCollection>,
    pub error: Option<String>,
}

impl CollectionPayload {
    pub fn ok(collection: GqlCollection) -> Self {
        Self {
            collection: Some(collection),
            error: None,
        }
    }

    pub fn failure(reason: impl Into<String>) -> Self {
        Self {
            collection: None,
            error: Some(reason.into()),
        }
    }
}

#[derive(SimpleObject)]
pub struct ProductPayload {
    pub product: Option<GqlProduct>,
    pub error: Option<String>,
}

impl ProductPayload {
    pub fn ok(product: GqlProduct) -> Self {
        Self {
            product: Some(product),
            error: None,
        }
    }

    pub fn failure(reason: impl Into<String>) -> Self {
        Self {
            product: None,
            error: Some(reason.into()),
        }
    }
}

#[derive(SimpleObject)]
pub struct PromotionPayload {
    pub promotion: Option<GqlPromotion>,
    pub error: Option<String>,
}

impl PromotionPayload {
    pub fn ok(promotion: GqlPromotion) -> Self {
        Self {
            promotion: Some(promotion),
            error: None,
        }
    }

    pub fn failure(reason: impl Into<String>) -> Self {
        Self {
            promotion: None,
            error: Some(reason.into()),
        }
    }
}

#[derive(SimpleObject)]
pub struct UserPayload {
    pub user: Option<GqlUser>,
    pub error: Option<String>,
}

impl UserPayload {
    pub fn ok(user: GqlUser) -> Self {
        Self {
            user: Some(user),
            error: None,
        }
    }

    pub fn failure(reason: impl Into<String>) -> Self {
        Self {
            user: None,
            error: Some(reason.into()),
        }
    }
}

#[derive(SimpleObject)]
pub struct DeleteResult {
    pub success: bool,
    pub message: Option<String>,
}

impl DeleteResult {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    pub fn failure(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(reason.into()),
        }
    }
}

#[derive(SimpleObject)]
pub struct TokenPayload {
    pub token: Option<String>,
    pub error: Option<String>,
}

impl TokenPayload {
    pub fn ok(token: String) -> Self {
        Self {
            token: Some(token),
            error: None,
        }
    }

    pub fn failure(reason: impl Into<String>) -> Self {
        Self {
            token: None,
            error: Some(reason.into()),
        }
    }
}

#[derive(SimpleObject)]
pub struct VerifyTokenPayload {
    pub valid: bool,
    pub username: Option<String>,
    pub error: Option<String>,
}

impl VerifyTokenPayload {
    pub fn ok(username: String) -> Self {
        Self {
            valid: true,
            username: Some(username),
            error: None,
        }
    }

    pub fn failure(reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            username: None,
            error: Some(reason.into()),
        }
    }
}
