pub mod context;
pub mod customer;
pub mod loaders;
pub mod store;
pub mod types;

use async_graphql::dataloader::DataLoader;
use async_graphql::{EmptySubscription, MergedObject, Schema};

use crate::state::AppState;
use loaders::{
    CollectionByIdLoader, ProductByIdLoader, ProductsByCollectionLoader,
    PromotionsByProductLoader,
};

/// Merged query root composing the store and customer domains.
#[derive(MergedObject, Default)]
pub struct QueryRoot(store::StoreQuery, customer::CustomerQuery);

/// Merged mutation root composing store writes, user administration and the
/// token pass-throughs.
#[derive(MergedObject, Default)]
pub struct MutationRoot(
    store::mutations::StoreMutation,
    customer::mutations::CustomerMutation,
    customer::mutations::AuthMutation,
);

pub type ApiSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

pub fn build_schema(state: AppState) -> ApiSchema {
    let orm = state.orm.clone();

    Schema::build(
        QueryRoot::default(),
        MutationRoot::default(),
        EmptySubscription,
    )
    .data(state)
    .data(DataLoader::new(
        CollectionByIdLoader { orm: orm.clone() },
        tokio::spawn,
    ))
    .data(DataLoader::new(
        ProductByIdLoader { orm: orm.clone() },
        tokio::spawn,
    ))
    .data(DataLoader::new(
        ProductsByCollectionLoader { orm: orm.clone() },
        tokio::spawn,
    ))
    .data(DataLoader::new(
        PromotionsByProductLoader { orm },
        tokio::spawn,
    ))
    .limit_depth(10)
    .limit_complexity(1000)
    .finish()
}

/// Offset window `[start, end)` for a relay connection over a counted result
/// set. With no page arguments the whole set is returned.
pub(crate) fn page_window(
    after: Option<usize>,
    before: Option<usize>,
    first: Option<usize>,
    last: Option<usize>,
    total: usize,
) -> (usize, usize) {
    let start = after.map(|a| a + 1).unwrap_or(0).min(total);
    let mut end = before.unwrap_or(total).min(total).max(start);
    if let Some(first) = first {
        end = end.min(start + first);
    }
    let start = match last {
        Some(last) => end.saturating_sub(last).max(start),
        None => start,
    };
    (start, end)
}

#[cfg(test)]
mod tests {
    use super::page_window;

    #[test]
    fn no_arguments_returns_the_whole_set() {
        assert_eq!(page_window(None, None, None, None, 10), (0, 10));
    }

    #[test]
    fn first_limits_from_the_start() {
        assert_eq!(page_window(None, None, Some(3), None, 10), (0, 3));
    }

    #[test]
    fn after_moves_the_window_past_the_cursor() {
        assert_eq!(page_window(Some(2), None, Some(3), None, 10), (3, 6));
    }

    #[test]
    fn last_takes_the_tail_of_the_window() {
        assert_eq!(page_window(None, None, None, Some(2), 10), (8, 10));
        assert_eq!(page_window(None, Some(5), None, Some(2), 10), (3, 5));
    }

    #[test]
    fn out_of_range_cursors_clamp_to_the_set() {
        assert_eq!(page_window(Some(50), None, Some(3), None, 10), (10, 10));
        assert_eq!(page_window(None, Some(50), None, None, 10), (0, 10));
    }
}
