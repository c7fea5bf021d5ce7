pub mod auth_service;
pub mod cart_service;
pub mod collection_service;
pub mod product_service;
pub mod promotion_service;
pub mod review_service;
pub mod user_service;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}
