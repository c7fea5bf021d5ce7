use std::collections::HashMap;
use std::sync::Arc;

use async_graphql::dataloader::Loader;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

use crate::db::OrmConn;
use crate::entity::{
    Collections, ProductPromotions, Products, Promotions, collections, product_promotions,
    products, promotions,
};

// --- CollectionByIdLoader ---

pub struct CollectionByIdLoader {
    pub orm: OrmConn,
}

impl Loader<i32> for CollectionByIdLoader {
    type Value = collections::Model;
    type Error = Arc<sea_orm::DbErr>;

    async fn load(&self, keys: &[i32]) -> Result<HashMap<i32, Self::Value>, Self::Error> {
        let rows = Collections::find()
            .filter(collections::Column::Id.is_in(keys.iter().copied()))
            .all(&self.orm)
            .await
            .map_err(Arc::new)?;
        Ok(rows.into_iter().map(|c| (c.id, c)).collect())
    }
}

// --- ProductByIdLoader ---

pub struct ProductByIdLoader {
    pub orm: OrmConn,
}

impl Loader<i32> for ProductByIdLoader {
    type Value = products::Model;
    type Error = Arc<sea_orm::DbErr>;

    async fn load(&self, keys: &[i32]) -> Result<HashMap<i32, Self::Value>, Self::Error> {
        let rows = Products::find()
            .filter(products::Column::Id.is_in(keys.iter().copied()))
            .all(&self.orm)
            .await
            .map_err(Arc::new)?;
        Ok(rows.into_iter().map(|p| (p.id, p)).collect())
    }
}

// --- ProductsByCollectionLoader ---

pub struct ProductsByCollectionLoader {
    pub orm: OrmConn,
}

impl Loader<i32> for ProductsByCollectionLoader {
    type Value = Vec<products::Model>;
    type Error = Arc<sea_orm::DbErr>;

    async fn load(&self, keys: &[i32]) -> Result<HashMap<i32, Self::Value>, Self::Error> {
        let rows = Products::find()
            .filter(products::Column::CollectionId.is_in(keys.iter().copied()))
            .all(&self.orm)
            .await
            .map_err(Arc::new)?;

        let mut grouped: HashMap<i32, Self::Value> = HashMap::new();
        for product in rows {
            grouped.entry(product.collection_id).or_default().push(product);
        }
        Ok(grouped)
    }
}

// --- PromotionsByProductLoader ---

pub struct PromotionsByProductLoader {
    pub orm: OrmConn,
}

impl Loader<i32> for PromotionsByProductLoader {
    type Value = Vec<promotions::Model>;
    type Error = Arc<sea_orm::DbErr>;

    async fn load(&self, keys: &[i32]) -> Result<HashMap<i32, Self::Value>, Self::Error> {
        let links = ProductPromotions::find()
            .filter(product_promotions::Column::ProductId.is_in(keys.iter().copied()))
            .all(&self.orm)
            .await
            .map_err(Arc::new)?;

        let promotion_ids: Vec<i32> = links.iter().map(|l| l.promotion_id).collect();
        let promotions: HashMap<i32, promotions::Model> = Promotions::find()
            .filter(promotions::Column::Id.is_in(promotion_ids))
            .all(&self.orm)
            .await
            .map_err(Arc::new)?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let mut grouped: HashMap<i32, Self::Value> = HashMap::new();
        for link in links {
            if let Some(promotion) = promotions.get(&link.promotion_id) {
                grouped
                    .entry(link.product_id)
                    .or_default()
                    .push(promotion.clone());
            }
        }
        Ok(grouped)
    }
}
