mod common;

use common::*;
use graphql_storefront_api::entity::{Collections, Products, Users};
use graphql_storefront_api::error::PERMISSION_DENIED;
use sea_orm::{EntityTrait, PaginatorTrait};

fn assert_denied(resp: &async_graphql::Response) {
    assert_eq!(resp.errors.len(), 1, "expected a single error: {:?}", resp.errors);
    assert_eq!(resp.errors[0].message, PERMISSION_DENIED);
}

// Under-privileged callers get the uniform denial and the store stays
// untouched.
#[tokio::test]
async fn gated_operations_reject_underprivileged_callers() -> anyhow::Result<()> {
    let Some((state, schema)) = setup().await? else {
        return Ok(());
    };

    let customer = create_user(&state, "customer", "customer@example.com", false, false).await?;
    let staff = create_user(&state, "staff", "staff@example.com", true, false).await?;
    let collection = create_collection(&state, "Catalog").await?;
    let users_before = Users::find().count(&state.orm).await?;

    // Anonymous caller cannot create a collection
    let resp = exec_anon(
        &schema,
        r#"mutation { createCollection(title: "Nope") { collection { id } error } }"#,
    )
    .await;
    assert_denied(&resp);
    assert_eq!(Collections::find().count(&state.orm).await?, 1);

    // Authenticated non-staff caller cannot create a product
    let mutation = format!(
        r#"mutation {{
            createProduct(title: "Nope", slug: "nope", unitPrice: "1.00", inventory: 1, collectionId: {}) {{
                product {{ id }}
                error
            }}
        }}"#,
        collection.id
    );
    let resp = exec_as(&schema, &customer, &mutation).await;
    assert_denied(&resp);
    assert_eq!(Products::find().count(&state.orm).await?, 0);

    // Staff caller cannot administer users; that gate is superuser-only
    let resp = exec_as(
        &schema,
        &staff,
        r#"mutation { createUser(username: "nope", email: "nope@example.com", password: "pw") { user { id } error } }"#,
    )
    .await;
    assert_denied(&resp);
    assert_eq!(Users::find().count(&state.orm).await?, users_before);

    // Promotion reads are staff-gated
    let resp = exec_anon(&schema, r#"{ allPromotions { edges { node { id } } } }"#).await;
    assert_denied(&resp);
    let resp = exec_as(&schema, &customer, r#"{ promotion(promotionId: 1) { id } }"#).await;
    assert_denied(&resp);

    // Carts require authentication, `me` as well
    let resp = exec_anon(
        &schema,
        r#"{ cart(cartId: "7b28ae57-7447-4b4c-a0c4-6ae8b3d5a48f") { id } }"#,
    )
    .await;
    assert_denied(&resp);
    let resp = exec_anon(&schema, r#"{ me { id } }"#).await;
    assert_denied(&resp);

    // The same operations pass for a caller holding the capability
    let resp = exec_as(&schema, &staff, r#"{ allPromotions { edges { node { id } } } }"#).await;
    assert!(resp.errors.is_empty(), "{:?}", resp.errors);
    let resp = exec_as(&schema, &customer, r#"{ me { username } }"#).await;
    assert!(resp.errors.is_empty(), "{:?}", resp.errors);

    Ok(())
}
