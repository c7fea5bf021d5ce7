use graphql_storefront_api::{db::create_pool, services::auth_service::hash_password};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL")?;

    let pool = create_pool(&database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    let admin_id = ensure_user(&pool, "admin", "admin@example.com", "admin123", true, true).await?;
    let staff_id = ensure_user(&pool, "staff", "staff@example.com", "staff123", true, false).await?;
    seed_catalog(&pool).await?;

    println!("Seed completed. Superuser ID: {admin_id}, Staff ID: {staff_id}");
    Ok(())
}

async fn ensure_user(
    pool: &sqlx::PgPool,
    username: &str,
    email: &str,
    password: &str,
    is_staff: bool,
    is_superuser: bool,
) -> anyhow::Result<i32> {
    let password_hash = hash_password(password).map_err(|e| anyhow::anyhow!(e.to_string()))?;

    let row: (i32,) = sqlx::query_as(
        r#"
        INSERT INTO users (username, email, password_hash, is_staff, is_superuser)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (username) DO UPDATE
            SET is_staff = EXCLUDED.is_staff, is_superuser = EXCLUDED.is_superuser
        RETURNING id
        "#,
    )
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .bind(is_staff)
    .bind(is_superuser)
    .fetch_one(pool)
    .await?;

    println!("Ensured user {username} (staff={is_staff}, superuser={is_superuser})");
    Ok(row.0)
}

async fn seed_catalog(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let collection_id: i32 = match sqlx::query_as::<_, (i32,)>(
        "SELECT id FROM collections WHERE title = $1",
    )
    .bind("Apparel")
    .fetch_optional(pool)
    .await?
    {
        Some((id,)) => id,
        None => {
            let row: (i32,) =
                sqlx::query_as("INSERT INTO collections (title) VALUES ($1) RETURNING id")
                    .bind("Apparel")
                    .fetch_one(pool)
                    .await?;
            row.0
        }
    };

    let products = vec![
        ("Crab Hoodie", "crab-hoodie", "Warm hoodie for Rustaceans", "55.00", 50),
        ("Ferris Mug", "ferris-mug", "Coffee tastes better with Ferris", "12.50", 100),
        ("Sticker Pack", "sticker-pack", "Decorate your laptop", "5.00", 200),
    ];

    for (title, slug, description, unit_price, inventory) in products {
        sqlx::query(
            r#"
            INSERT INTO products (title, slug, description, unit_price, inventory, collection_id)
            VALUES ($1, $2, $3, $4::numeric, $5, $6)
            ON CONFLICT (slug) DO NOTHING
            "#,
        )
        .bind(title)
        .bind(slug)
        .bind(description)
        .bind(unit_price)
        .bind(inventory)
        .bind(collection_id)
        .execute(pool)
        .await?;
    }

    sqlx::query(
        r#"
        INSERT INTO promotions (description, discount)
        SELECT $1, $2
        WHERE NOT EXISTS (SELECT 1 FROM promotions WHERE description = $1)
        "#,
    )
    .bind("Launch week")
    .bind(10.0)
    .execute(pool)
    .await?;

    println!("Seeded catalog");
    Ok(())
}
