use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use sensations_api::{config::AppConfig, db::create_pool};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    let admin_id = ensure_user(&pool, "admin@sensations.example", "admin123", "admin").await?;
    seed_products(&pool).await?;

    println!("Seed completed. Admin ID: {admin_id}");
    Ok(())
}

async fn ensure_user(
    pool: &sqlx::PgPool,
    email: &str,
    password: &str,
    role: &str,
) -> anyhow::Result<Uuid> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, password_hash, role)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .fetch_optional(pool)
    .await?;

    row.map(|(id,)| id)
        .ok_or_else(|| anyhow::anyhow!("failed to upsert user {email}"))
}

async fn seed_products(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let catalog: &[(&str, &str, &str, i64, i32)] = &[
        (
            "Nuit d'Ambre",
            "men",
            "Ambre chaud, notes de cuir et de vanille fumée.",
            25_000,
            12,
        ),
        (
            "Fleur de Saison",
            "women",
            "Bouquet floral, jasmin et pivoine sur fond musqué.",
            22_000,
            8,
        ),
        (
            "Essence de Minuit",
            "unisex",
            "Oud discret, bergamote et poivre noir.",
            30_000,
            5,
        ),
        (
            "Brise d'Okoumé",
            "unisex",
            "Boisé vert, sève fraîche et agrumes.",
            18_000,
            20,
        ),
    ];

    for (name, category, description, price, stock) in catalog {
        sqlx::query(
            r#"
            INSERT INTO products (id, name, category, description, price, stock)
            SELECT $1, $2, $3, $4, $5, $6
            WHERE NOT EXISTS (SELECT 1 FROM products WHERE name = $2)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(category)
        .bind(description)
        .bind(price)
        .bind(stock)
        .execute(pool)
        .await?;
    }

    println!("Seeded {} catalog products", catalog.len());
    Ok(())
}
