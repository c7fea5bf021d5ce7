#![allow(dead_code)]

use chrono::NaiveDate;
use graphql_storefront_api::{
    db::{create_orm_conn, create_pool, run_migrations},
    entity::{carts, collections, products, promotions, reviews, users},
    graphql::{ApiSchema, build_schema, context::AuthSession},
    middleware::auth::Caller,
    state::AppState,
};
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set, Statement};
use uuid::Uuid;

/// Connect, migrate and wipe the test database, then build a schema over it.
/// Returns `None` (and the test passes vacuously) when no database is
/// configured in the environment.
pub async fn setup() -> anyhow::Result<Option<(AppState, ApiSchema)>> {
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration tests."
            );
            return Ok(None);
        }
    };

    let orm = create_orm_conn(&database_url).await?;
    run_migrations(&orm).await?;

    // Clean tables between runs
    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE product_promotions, reviews, products, collections, promotions, carts, revoked_tokens, audit_logs, users RESTART IDENTITY CASCADE",
    ))
    .await?;

    let pool = create_pool(&database_url).await?;
    let state = AppState {
        pool,
        orm,
        jwt_secret: "test-secret".into(),
    };
    let schema = build_schema(state.clone());
    Ok(Some((state, schema)))
}

pub async fn create_user(
    state: &AppState,
    username: &str,
    email: &str,
    is_staff: bool,
    is_superuser: bool,
) -> anyhow::Result<users::Model> {
    let user = users::ActiveModel {
        id: NotSet,
        username: Set(username.to_string()),
        email: Set(email.to_string()),
        password_hash: Set("dummy".into()),
        first_name: NotSet,
        last_name: NotSet,
        is_staff: Set(is_staff),
        is_superuser: Set(is_superuser),
        is_active: Set(true),
        date_joined: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(user)
}

pub async fn create_collection(state: &AppState, title: &str) -> anyhow::Result<collections::Model> {
    let collection = collections::ActiveModel {
        id: NotSet,
        title: Set(title.to_string()),
        featured_product_id: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(collection)
}

pub async fn create_product(
    state: &AppState,
    collection_id: i32,
    title: &str,
    slug: &str,
    unit_price: &str,
) -> anyhow::Result<products::Model> {
    let product = products::ActiveModel {
        id: NotSet,
        title: Set(title.to_string()),
        slug: Set(slug.to_string()),
        description: NotSet,
        unit_price: Set(unit_price.parse::<Decimal>()?),
        inventory: Set(10),
        collection_id: Set(collection_id),
        last_update: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(product)
}

pub async fn create_promotion(
    state: &AppState,
    description: &str,
    discount: f64,
) -> anyhow::Result<promotions::Model> {
    let promotion = promotions::ActiveModel {
        id: NotSet,
        description: Set(description.to_string()),
        discount: Set(discount),
    }
    .insert(&state.orm)
    .await?;

    Ok(promotion)
}

pub async fn create_review(
    state: &AppState,
    product_id: i32,
    name: &str,
    date: NaiveDate,
) -> anyhow::Result<reviews::Model> {
    let review = reviews::ActiveModel {
        id: NotSet,
        product_id: Set(product_id),
        name: Set(name.to_string()),
        description: Set("A review".into()),
        date: Set(date),
    }
    .insert(&state.orm)
    .await?;

    Ok(review)
}

pub async fn create_cart(state: &AppState) -> anyhow::Result<carts::Model> {
    let cart = carts::ActiveModel {
        id: Set(Uuid::new_v4()),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(cart)
}

pub fn session_for(user: &users::Model) -> AuthSession {
    AuthSession(Some(Caller {
        user_id: user.id,
        username: user.username.clone(),
        is_staff: user.is_staff,
        is_superuser: user.is_superuser,
    }))
}

pub async fn exec_as(
    schema: &ApiSchema,
    user: &users::Model,
    operation: &str,
) -> async_graphql::Response {
    schema
        .execute(async_graphql::Request::new(operation).data(session_for(user)))
        .await
}

pub async fn exec_anon(schema: &ApiSchema, operation: &str) -> async_graphql::Response {
    schema
        .execute(async_graphql::Request::new(operation).data(AuthSession(None)))
        .await
}

/// Unwrap a response that is expected to have produced data.
pub fn json_data(resp: async_graphql::Response) -> anyhow::Result<serde_json::Value> {
    anyhow::ensure!(resp.errors.is_empty(), "unexpected errors: {:?}", resp.errors);
    Ok(resp.data.into_json()?)
}
