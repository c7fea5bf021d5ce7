mod common;

use chrono::NaiveDate;
use common::*;

// Read side: filters, ordering, cursor pagination, review scoping and the
// authenticated cart lookup.
#[tokio::test]
async fn filtered_and_paginated_reads() -> anyhow::Result<()> {
    let Some((state, schema)) = setup().await? else {
        return Ok(());
    };

    let customer = create_user(&state, "customer", "customer@example.com", false, false).await?;

    let summer = create_collection(&state, "Summer sale").await?;
    let winter = create_collection(&state, "Winter sale").await?;
    let gear = create_collection(&state, "Gear").await?;

    let cheap = create_product(&state, summer.id, "Cap", "cap", "8.00").await?;
    let mid = create_product(&state, summer.id, "Shirt", "shirt", "25.00").await?;
    let pricey = create_product(&state, gear.id, "Tent", "tent", "120.00").await?;

    // Title filters: exact, contains, starts-with
    let data = json_data(
        exec_anon(&schema, r#"{ collections(title: "Gear") { edges { node { title } } } }"#).await,
    )?;
    assert_eq!(data["collections"]["edges"].as_array().unwrap().len(), 1);

    let data = json_data(
        exec_anon(
            &schema,
            r#"{ collections(titleContains: "sale") { edges { node { title } } } }"#,
        )
        .await,
    )?;
    assert_eq!(data["collections"]["edges"].as_array().unwrap().len(), 2);

    let data = json_data(
        exec_anon(
            &schema,
            r#"{ collections(titleStartsWith: "win") { edges { node { id } } } }"#,
        )
        .await,
    )?;
    let edges = data["collections"]["edges"].as_array().unwrap();
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0]["node"]["id"].as_i64(), Some(winter.id as i64));

    // Price bounds and collection filter
    let query = format!(
        r#"{{ allProducts(collectionId: {}) {{ edges {{ node {{ slug }} }} }} }}"#,
        summer.id
    );
    let data = json_data(exec_anon(&schema, &query).await)?;
    assert_eq!(data["allProducts"]["edges"].as_array().unwrap().len(), 2);

    let data = json_data(
        exec_anon(
            &schema,
            r#"{ allProducts(unitPriceGt: "10.00", unitPriceLt: "100.00") { edges { node { slug } } } }"#,
        )
        .await,
    )?;
    let edges = data["allProducts"]["edges"].as_array().unwrap();
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0]["node"]["slug"], "shirt");

    // Ordering by unit price, descending
    let data = json_data(
        exec_anon(
            &schema,
            r#"{ allProducts(orderBy: UNIT_PRICE, orderDirection: DESC) { edges { node { slug } } } }"#,
        )
        .await,
    )?;
    let slugs: Vec<&str> = data["allProducts"]["edges"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["node"]["slug"].as_str().unwrap())
        .collect();
    assert_eq!(slugs, vec!["tent", "shirt", "cap"]);

    // Cursor pagination walks the full set without overlap
    let data = json_data(
        exec_anon(
            &schema,
            r#"{ allProducts(first: 2, orderBy: UNIT_PRICE) {
                edges { cursor node { slug } }
                pageInfo { hasNextPage endCursor }
            } }"#,
        )
        .await,
    )?;
    let page = &data["allProducts"];
    assert_eq!(page["edges"].as_array().unwrap().len(), 2);
    assert_eq!(page["pageInfo"]["hasNextPage"], true);
    let end_cursor = page["pageInfo"]["endCursor"].as_str().unwrap().to_string();

    let query = format!(
        r#"{{ allProducts(first: 2, after: "{end_cursor}", orderBy: UNIT_PRICE) {{
            edges {{ node {{ slug }} }}
            pageInfo {{ hasNextPage }}
        }} }}"#
    );
    let data = json_data(exec_anon(&schema, &query).await)?;
    let page = &data["allProducts"];
    let slugs: Vec<&str> = page["edges"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["node"]["slug"].as_str().unwrap())
        .collect();
    assert_eq!(slugs, vec!["tent"]);
    assert_eq!(page["pageInfo"]["hasNextPage"], false);

    // Reviews are scoped to one product and date-filterable
    create_review(&state, cheap.id, "early", NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()).await?;
    create_review(&state, cheap.id, "late", NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()).await?;
    create_review(&state, mid.id, "other", NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()).await?;

    let query = format!(
        r#"{{ reviewsOfProduct(productId: {}) {{ edges {{ node {{ name product {{ id }} }} }} }} }}"#,
        cheap.id
    );
    let data = json_data(exec_anon(&schema, &query).await)?;
    let edges = data["reviewsOfProduct"]["edges"].as_array().unwrap();
    assert_eq!(edges.len(), 2);
    assert_eq!(edges[0]["node"]["product"]["id"].as_i64(), Some(cheap.id as i64));

    let query = format!(
        r#"{{ reviewsOfProduct(productId: {}, dateGt: "2024-02-01") {{ edges {{ node {{ name }} }} }} }}"#,
        cheap.id
    );
    let data = json_data(exec_anon(&schema, &query).await)?;
    let edges = data["reviewsOfProduct"]["edges"].as_array().unwrap();
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0]["node"]["name"], "late");

    // Single lookups: present and absent
    let query = format!(r#"{{ product(productId: {}) {{ slug }} }}"#, pricey.id);
    let data = json_data(exec_anon(&schema, &query).await)?;
    assert_eq!(data["product"]["slug"], "tent");

    let data = json_data(exec_anon(&schema, r#"{ product(productId: 9999) { slug } }"#).await)?;
    assert!(data["product"].is_null());

    // Cart lookup needs authentication; present and absent ids
    let cart = create_cart(&state).await?;
    let query = format!(r#"{{ cart(cartId: "{}") {{ id }} }}"#, cart.id);
    let data = json_data(exec_as(&schema, &customer, &query).await)?;
    assert_eq!(data["cart"]["id"], cart.id.to_string());

    let query = format!(r#"{{ cart(cartId: "{}") {{ id }} }}"#, uuid::Uuid::new_v4());
    let data = json_data(exec_as(&schema, &customer, &query).await)?;
    assert!(data["cart"].is_null());

    Ok(())
}
