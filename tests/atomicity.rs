mod common;

use common::*;
use graphql_storefront_api::entity::{ProductPromotions, Products};
use sea_orm::{EntityTrait, PaginatorTrait};

// Multi-step product creation either fully commits or leaves nothing behind.
#[tokio::test]
async fn create_product_rolls_back_on_bad_references() -> anyhow::Result<()> {
    let Some((state, schema)) = setup().await? else {
        return Ok(());
    };

    let staff = create_user(&state, "staff", "staff@example.com", true, false).await?;
    let collection = create_collection(&state, "Catalog").await?;
    let promotion = create_promotion(&state, "Nowruz", 10.0).await?;

    // Unresolvable collection: no product row may survive
    let mutation = r#"mutation {
        createProduct(title: "Ghost", slug: "ghost", unitPrice: "10.00", inventory: 1, collectionId: 9999) {
            product { id }
            error
        }
    }"#;
    let data = json_data(exec_as(&schema, &staff, mutation).await)?;
    assert!(data["createProduct"]["product"].is_null());
    assert_eq!(data["createProduct"]["error"], "Collection does not exist.");
    assert_eq!(Products::find().count(&state.orm).await?, 0);

    // One valid and one unresolvable promotion id: neither the product row
    // nor the valid association may survive
    let mutation = format!(
        r#"mutation {{
            createProduct(
                title: "Ghost", slug: "ghost", unitPrice: "10.00", inventory: 1,
                collectionId: {}, promotions: [{}, 9999]
            ) {{
                product {{ id }}
                error
            }}
        }}"#,
        collection.id, promotion.id
    );
    let data = json_data(exec_as(&schema, &staff, &mutation).await)?;
    assert!(data["createProduct"]["product"].is_null());
    assert_eq!(data["createProduct"]["error"], "Promotion 9999 does not exist.");
    assert_eq!(Products::find().count(&state.orm).await?, 0);
    assert_eq!(ProductPromotions::find().count(&state.orm).await?, 0);

    // Editing a product against a bad promotion id keeps its scalar fields
    // untouched as well
    let product = create_product(&state, collection.id, "Widget", "widget", "25.00").await?;
    let mutation = format!(
        r#"mutation {{
            editProduct(productId: {}, inventory: 99, promotions: [9999]) {{
                product {{ id }}
                error
            }}
        }}"#,
        product.id
    );
    let data = json_data(exec_as(&schema, &staff, &mutation).await)?;
    assert!(data["editProduct"]["product"].is_null());
    assert_eq!(data["editProduct"]["error"], "Promotion 9999 does not exist.");

    let unchanged = Products::find_by_id(product.id)
        .one(&state.orm)
        .await?
        .expect("product still present");
    assert_eq!(unchanged.inventory, 10);

    Ok(())
}
