use chrono::Utc;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, Set};
use storefront::{
    config::AppConfig,
    db::{OrmConn, create_orm_conn, run_migrations},
    entity::{Products, categories, products, users},
    models::Role,
    repository::{CategoryRepository, ProductRepository, UserRepository},
    services::user_service::hash_password,
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let orm = create_orm_conn(&config.database_url, config.max_connections).await?;
    // Ensure migrations are applied.
    run_migrations(&orm).await?;

    let admin_id = ensure_user(&orm, "Admin", "admin@example.com", "admin123", Role::Admin).await?;
    let seller_id =
        ensure_user(&orm, "Seller", "seller@example.com", "seller123", Role::Seller).await?;
    seed_catalog(&orm).await?;

    println!("Seed completed. Admin ID: {admin_id}, Seller ID: {seller_id}");
    Ok(())
}

async fn ensure_user(
    orm: &OrmConn,
    name: &str,
    email: &str,
    password: &str,
    role: Role,
) -> anyhow::Result<Uuid> {
    let users = UserRepository::new(orm);
    if let Some(existing) = users.find_by_email(email).await? {
        println!("User {email} already present");
        return Ok(existing.id);
    }

    let user = users
        .insert(users::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            email: Set(email.to_string()),
            password_hash: Set(hash_password(password)?),
            phone: Set(None),
            role: Set(role),
            address: Set(None),
            created_at: Set(Utc::now().into()),
        })
        .await?;

    println!("Created user {email} ({role:?})");
    Ok(user.id)
}

async fn ensure_category(orm: &OrmConn, name: &str) -> anyhow::Result<Uuid> {
    let categories = CategoryRepository::new(orm);
    if let Some(existing) = categories.find_by_name(name).await? {
        return Ok(existing.id);
    }
    let category = categories
        .insert(categories::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
        })
        .await?;
    Ok(category.id)
}

async fn seed_catalog(orm: &OrmConn) -> anyhow::Result<()> {
    let catalog = [
        ("Apparel", "Axum Hoodie", "Warm hoodie for Rustaceans", 550_000, 50),
        ("Apparel", "Crab Socks", "Two pairs, one per claw", 80_000, 120),
        ("Accessories", "Ferris Mug", "Coffee tastes better with Ferris", 120_000, 100),
        ("Accessories", "Rust Sticker Pack", "Decorate your laptop", 50_000, 200),
        ("Books", "E-book: Async Rust", "Learn async Rust patterns", 250_000, 75),
    ];

    let repo = ProductRepository::new(orm);
    let mut created = 0;
    for (category, name, description, price, stock) in catalog {
        let category_id = ensure_category(orm, category).await?;

        let exists = Products::find()
            .filter(products::Column::Name.eq(name))
            .one(orm)
            .await?
            .is_some();
        if exists {
            continue;
        }

        repo.insert(products::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            description: Set(Some(description.to_string())),
            category_id: Set(category_id),
            price: Set(price),
            stock: Set(stock),
            image_url: Set(None),
            rating: Set(0.0),
            created_at: Set(Utc::now().into()),
        })
        .await?;
        created += 1;
    }

    println!("Seeded {created} products");
    Ok(())
}
