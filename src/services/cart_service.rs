use sea_orm::EntityTrait;
use uuid::Uuid;

use crate::{
    entity::{Carts, carts},
    error::AppResult,
    state::AppState,
};

pub async fn get_cart(state: &AppState, id: Uuid) -> AppResult<Option<carts::Model>> {
    let cart = Carts::find_by_id(id).one(&state.orm).await?;
    Ok(cart)
}
