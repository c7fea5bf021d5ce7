pub mod carts;
pub mod collections;
pub mod product_promotions;
pub mod products;
pub mod promotions;
pub mod reviews;
pub mod revoked_tokens;
pub mod users;

pub use carts::Entity as Carts;
pub use collections::Entity as Collections;
pub use product_promotions::Entity as ProductPromotions;
pub use products::Entity as Products;
pub use promotions::Entity as Promotions;
pub use reviews::Entity as Reviews;
pub use revoked_tokens::Entity as RevokedTokens;
pub use users::Entity as Users;
