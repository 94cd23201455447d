use refill_shop_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let orm = create_orm_conn(&config.database_url).await?;
    // Ensure migrations are applied.
    run_migrations(&orm).await?;
    let pool = orm.get_postgres_connection_pool().clone();

    seed_verification_codes(&pool).await?;
    seed_products(&pool).await?;

    println!("Seed completed");
    Ok(())
}

async fn seed_verification_codes(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let codes = [
        ("STAFF-0001", "staff"),
        ("A-1001", "customer"),
        ("A-1002", "customer"),
        ("A-1003", "customer"),
        ("A-1004", "customer"),
    ];

    for (code, role) in codes {
        sqlx::query(
            r#"
            INSERT INTO verification_codes (code, role)
            VALUES ($1, $2)
            ON CONFLICT (code) DO NOTHING
            "#,
        )
        .bind(code)
        .bind(role)
        .execute(pool)
        .await?;
    }

    println!("Seeded {} verification codes", codes.len());
    Ok(())
}

async fn seed_products(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    // (id, name, category1, category2, unit, supplier, price_per_unit, min_qty, order_unit, price_per_min_order)
    let products = vec![
        ("GR-RI-001", "Brown Rice", "GR", "RI", "kg", "Haenam Farm", 6000, 0.5, "kg", 3000),
        ("GR-OA-001", "Rolled Oats", "GR", "OA", "kg", "Green Mill", 9000, 0.5, "kg", 4500),
        ("LQ-OL-001", "Olive Oil", "LQ", "OL", "L", "Sol Press", 24000, 0.25, "L", 6000),
        ("LQ-SO-001", "Soy Sauce", "LQ", "SO", "L", "Jang House", 8000, 0.5, "L", 4000),
        ("HH-DT-001", "Dish Soap Refill", "HH", "DT", "L", "Clean Loop", 5000, 1.0, "L", 5000),
        ("HH-LD-001", "Laundry Liquid", "HH", "LD", "L", "Clean Loop", 7000, 1.0, "L", 7000),
    ];

    for (id, name, c1, c2, unit, supplier, ppu, min_qty, order_unit, ppmo) in products {
        sqlx::query(
            r#"
            INSERT INTO products (id, name, category1_id, category2_id, unit, supplier,
                                  price_per_unit, order_min_quantity, order_unit, price_per_min_order)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(c1)
        .bind(c2)
        .bind(unit)
        .bind(supplier)
        .bind(ppu as i64)
        .bind(min_qty)
        .bind(order_unit)
        .bind(ppmo as i64)
        .execute(pool)
        .await?;
    }

    println!("Seeded products");
    Ok(())
}
