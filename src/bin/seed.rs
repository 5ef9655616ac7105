use sqlx::PgPool;
use storefront_catalog_api::{
    config::AppConfig,
    db::create_pool,
    pricing::{DiscountType, PriceLine, compute_pricing},
    validation::{attribute_handle_from_name, handle_from_name},
};
use uuid::Uuid;

// Demo skincare catalog: two categories, a category-linked "Skin Concerns"
// attribute, base devices plus booster add-ons tagged by concern, and one
// priced bundle.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url, config.db_max_connections).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    let face = ensure_category(&pool, "Face").await?;
    let eye = ensure_category(&pool, "Eye").await?;

    let device_type = ensure_product_type(&pool, "Device", false).await?;
    let booster_type = ensure_product_type(&pool, "Booster", true).await?;

    let concerns = ensure_attribute(&pool, "Skin Concerns", true).await?;
    let acne = ensure_option(&pool, concerns, "Acne", Some(face)).await?;
    let dryness = ensure_option(&pool, concerns, "Dryness", Some(face)).await?;
    let wrinkles = ensure_option(&pool, concerns, "Wrinkles", Some(face)).await?;
    let dark_circles = ensure_option(&pool, concerns, "Dark Circles", Some(eye)).await?;

    let device = ensure_product(&pool, "Micro-Infusion Device", 24900, Some(face), device_type).await?;
    let eye_device = ensure_product(&pool, "Eye Renewal Device", 19900, Some(eye), device_type).await?;
    let clarifying = ensure_product(&pool, "Clarifying Booster", 4900, None, booster_type).await?;
    let hydration = ensure_product(&pool, "Hydration Booster", 4900, None, booster_type).await?;
    let collagen = ensure_product(&pool, "Collagen Booster", 5900, None, booster_type).await?;

    ensure_tag(&pool, clarifying, concerns, acne).await?;
    ensure_tag(&pool, hydration, concerns, dryness).await?;
    ensure_tag(&pool, collagen, concerns, wrinkles).await?;
    ensure_tag(&pool, collagen, concerns, dark_circles).await?;

    seed_bundle(
        &pool,
        "Glow Starter Kit",
        &[(device, 1, 24900), (hydration, 2, 4900)],
    )
    .await?;
    seed_bundle(&pool, "Eye Revival Kit", &[(eye_device, 1, 19900), (collagen, 1, 5900)]).await?;

    println!("Seed completed");
    Ok(())
}

async fn ensure_category(pool: &PgPool, name: &str) -> anyhow::Result<Uuid> {
    let handle = handle_from_name(name);
    if let Some((id,)) = sqlx::query_as::<_, (Uuid,)>(
        "SELECT id FROM product_categories WHERE handle = $1",
    )
    .bind(&handle)
    .fetch_optional(pool)
    .await?
    {
        return Ok(id);
    }

    let (id,): (Uuid,) = sqlx::query_as(
        "INSERT INTO product_categories (id, name, handle) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(&handle)
    .fetch_one(pool)
    .await?;
    println!("Seeded category {name}");
    Ok(id)
}

async fn ensure_product_type(pool: &PgPool, name: &str, is_addon: bool) -> anyhow::Result<Uuid> {
    if let Some((id,)) =
        sqlx::query_as::<_, (Uuid,)>("SELECT id FROM product_types WHERE name = $1")
            .bind(name)
            .fetch_optional(pool)
            .await?
    {
        return Ok(id);
    }

    let (id,): (Uuid,) = sqlx::query_as(
        "INSERT INTO product_types (id, name, is_addon) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(is_addon)
    .fetch_one(pool)
    .await?;
    println!("Seeded product type {name}");
    Ok(id)
}

async fn ensure_attribute(
    pool: &PgPool,
    name: &str,
    is_category_linked: bool,
) -> anyhow::Result<Uuid> {
    let handle = attribute_handle_from_name(name);
    if let Some((id,)) =
        sqlx::query_as::<_, (Uuid,)>("SELECT id FROM product_attributes WHERE handle = $1")
            .bind(&handle)
            .fetch_optional(pool)
            .await?
    {
        return Ok(id);
    }

    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO product_attributes (id, name, handle, is_category_linked, is_filterable, display_order)
        VALUES ($1, $2, $3, $4, TRUE, 0)
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(&handle)
    .bind(is_category_linked)
    .fetch_one(pool)
    .await?;
    println!("Seeded attribute {name}");
    Ok(id)
}

async fn ensure_option(
    pool: &PgPool,
    attribute_id: Uuid,
    name: &str,
    category_id: Option<Uuid>,
) -> anyhow::Result<Uuid> {
    let handle = attribute_handle_from_name(name);
    if let Some((id,)) = sqlx::query_as::<_, (Uuid,)>(
        "SELECT id FROM product_attribute_options WHERE attribute_id = $1 AND handle = $2",
    )
    .bind(attribute_id)
    .bind(&handle)
    .fetch_optional(pool)
    .await?
    {
        return Ok(id);
    }

    let (max_order,): (Option<i32>,) = sqlx::query_as(
        "SELECT MAX(display_order) FROM product_attribute_options WHERE attribute_id = $1",
    )
    .bind(attribute_id)
    .fetch_one(pool)
    .await?;

    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO product_attribute_options (id, attribute_id, name, handle, category_id, display_order)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(attribute_id)
    .bind(name)
    .bind(&handle)
    .bind(category_id)
    .bind(max_order.unwrap_or(-1) + 1)
    .fetch_one(pool)
    .await?;
    println!("Seeded option {name}");
    Ok(id)
}

async fn ensure_product(
    pool: &PgPool,
    title: &str,
    price: i64,
    category_id: Option<Uuid>,
    product_type_id: Uuid,
) -> anyhow::Result<Uuid> {
    if let Some((id,)) = sqlx::query_as::<_, (Uuid,)>("SELECT id FROM products WHERE title = $1")
        .bind(title)
        .fetch_optional(pool)
        .await?
    {
        return Ok(id);
    }

    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO products (id, title, price, category_id, product_type_id)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(title)
    .bind(price)
    .bind(category_id)
    .bind(product_type_id)
    .fetch_one(pool)
    .await?;
    println!("Seeded product {title}");
    Ok(id)
}

async fn ensure_tag(
    pool: &PgPool,
    product_id: Uuid,
    attribute_id: Uuid,
    option_id: Uuid,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO product_attribute_values (id, product_id, attribute_id, option_id)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (product_id, option_id) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(product_id)
    .bind(attribute_id)
    .bind(option_id)
    .execute(pool)
    .await?;
    Ok(())
}

async fn seed_bundle(
    pool: &PgPool,
    name: &str,
    lines: &[(Uuid, i32, i64)],
) -> anyhow::Result<()> {
    let handle = handle_from_name(name);
    if sqlx::query_as::<_, (Uuid,)>("SELECT id FROM product_bundles WHERE handle = $1")
        .bind(&handle)
        .fetch_optional(pool)
        .await?
        .is_some()
    {
        return Ok(());
    }

    let price_lines: Vec<PriceLine> = lines
        .iter()
        .map(|(product_id, quantity, price)| PriceLine {
            product_id: *product_id,
            quantity: *quantity,
            unit_price: Some(*price),
        })
        .collect();
    let pricing = compute_pricing(&price_lines, DiscountType::Percentage, 10);

    let bundle_id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO product_bundles
            (id, name, handle, bundle_type, discount_type, discount_value,
             original_price, savings, final_price, is_active)
        VALUES ($1, $2, $3, 'fixed', 'percentage', 10, $4, $5, $6, TRUE)
        "#,
    )
    .bind(bundle_id)
    .bind(name)
    .bind(&handle)
    .bind(pricing.original_price)
    .bind(pricing.savings)
    .bind(pricing.final_price)
    .execute(pool)
    .await?;

    for (product_id, quantity, _) in lines {
        sqlx::query(
            r#"
            INSERT INTO product_bundle_lines (id, bundle_id, product_id, quantity)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(bundle_id)
        .bind(product_id)
        .bind(quantity)
        .execute(pool)
        .await?;
    }

    println!("Seeded bundle {name}");
    Ok(())
}
